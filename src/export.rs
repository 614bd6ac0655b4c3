//! Export types for serializing the generation ledgers.
//!
//! Ledger rows keep their `details` as opaque JSON text. The export types
//! parse it back into a JSON value so an exported ledger reads as one
//! document, and resolve triple ids to the triples they name.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::graph::Triple;
use crate::provenance::{GenerationId, PredicateGeneration, TripleGeneration};
use crate::store::{KnowledgeStore, StoreResult};

/// Exported triple generation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripleGenerationExport {
    /// Ledger row id.
    pub id: GenerationId,
    pub algorithm: String,
    pub subject: String,
    pub predicate: String,
    /// Parsed details; `null` when the stored text is not valid JSON.
    pub details: serde_json::Value,
    /// Forward triple ids, in generation order.
    pub triple_ids: Vec<u64>,
    /// The triples behind `triple_ids`.
    pub triples: Vec<Triple>,
}

/// Exported predicate generation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateGenerationExport {
    /// Ledger row id.
    pub id: GenerationId,
    pub algorithm: String,
    pub predicate: String,
    /// Inverse recorded in the referenced predicate row.
    pub inverse: Option<String>,
    pub details: serde_json::Value,
    pub predicate_id: u64,
}

fn parsed_details(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or(serde_json::Value::Null)
}

impl TripleGenerationExport {
    fn build(store: &KnowledgeStore, id: GenerationId, entry: TripleGeneration) -> StoreResult<Self> {
        let triples = entry
            .triple_ids
            .iter()
            .map(|&triple_id| {
                store.triple(triple_id)?.ok_or_else(|| StoreError::Dangling {
                    table: "triples".into(),
                    id: triple_id,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Self {
            id,
            details: parsed_details(&entry.details),
            algorithm: entry.algorithm,
            subject: entry.subject,
            predicate: entry.predicate,
            triple_ids: entry.triple_ids,
            triples,
        })
    }
}

impl PredicateGenerationExport {
    fn build(store: &KnowledgeStore, id: GenerationId, entry: PredicateGeneration) -> StoreResult<Self> {
        let inverse = store.predicate_pair(entry.predicate_id)?.map(|pair| pair.inverse);
        Ok(Self {
            id,
            details: parsed_details(&entry.details),
            algorithm: entry.algorithm,
            predicate: entry.predicate,
            inverse,
            predicate_id: entry.predicate_id,
        })
    }
}

/// Every triple generation entry, oldest first.
pub fn export_triple_generations(store: &KnowledgeStore) -> StoreResult<Vec<TripleGenerationExport>> {
    store
        .triple_generations()?
        .into_iter()
        .map(|(id, entry)| TripleGenerationExport::build(store, id, entry))
        .collect()
}

/// Every predicate generation entry, oldest first.
pub fn export_predicate_generations(store: &KnowledgeStore) -> StoreResult<Vec<PredicateGenerationExport>> {
    store
        .predicate_generations()?
        .into_iter()
        .map(|(id, entry)| PredicateGenerationExport::build(store, id, entry))
        .collect()
}
