// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # knowgen
//!
//! An interactive knowledge-graph navigator that grows its graph from
//! language-model completions.
//!
//! ## Architecture
//!
//! - **Storage** (`store`): redb tables for triples, predicate pairs and the
//!   generation ledgers, written through one transaction per logical write
//! - **Graph** (`graph`): symmetric triple pairs, the predicate registry and
//!   the subtopic outline export
//! - **Provenance** (`provenance`, `export`): the append-only generation ledger
//! - **Completion** (`llm`): the gateway trait and an OpenAI-compatible client
//! - **Navigator** (`navigator`): the browse / generate / goto loop with
//!   session-scoped term numbers (`term_index`)
//!
//! ## Library usage
//!
//! ```no_run
//! use knowgen::llm::ScriptedCompletion;
//! use knowgen::navigator::terminal::StdTerminal;
//! use knowgen::navigator::{NavigationContext, Navigator, SessionSettings};
//! use knowgen::store::KnowledgeStore;
//!
//! let store = KnowledgeStore::open(std::path::Path::new(".knowgen")).unwrap();
//! let mut gateway = ScriptedCompletion::new([r#"["Mechanics", "Optics"]"#]);
//! let mut terminal = StdTerminal::new();
//! let ctx = NavigationContext::new(&store, &mut gateway, &mut terminal, &SessionSettings::default());
//! Navigator::new(ctx).run().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod llm;
pub mod navigator;
pub mod provenance;
pub mod store;
pub mod term_index;
