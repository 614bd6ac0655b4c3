//! Relational storage for the knowledge graph.
//!
//! [`KnowledgeStore`] owns the redb database holding four logical tables
//! (triples, predicate pairs and the two generation ledgers). Every multi-row
//! write runs inside one [`GraphWriter`], so a triple never exists without its
//! mirror, and neither exists without its ledger entry.
//!
//! The graph-level operations live next to their data types:
//! [`crate::graph::triples`], [`crate::graph::predicates`] and
//! [`crate::provenance`] add `impl` blocks to these two types.

pub mod durable;

pub use durable::{GraphWriter, KnowledgeStore};

use crate::error::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub triples: u64,
    pub predicates: u64,
    pub triple_generations: u64,
    pub predicate_generations: u64,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "knowgen store info")?;
        writeln!(f, "  triples:                {}", self.triples)?;
        writeln!(f, "  predicate rows:         {}", self.predicates)?;
        writeln!(f, "  triple generations:     {}", self.triple_generations)?;
        writeln!(f, "  predicate generations:  {}", self.predicate_generations)?;
        Ok(())
    }
}
