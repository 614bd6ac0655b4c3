//! Generation ledger: records how predicates and triples came to exist.
//!
//! Every act that creates predicate pairs or triples, by hand or through the
//! completion gateway, appends one ledger row. The ledger is append-only and
//! each row is committed in the same write unit as the rows it describes.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::graph::{GraphResult, PredicateId, Term, TripleId};
use crate::store::durable::{PREDICATE_GENERATION, TRIPLE_GENERATION};
use crate::store::{GraphWriter, KnowledgeStore, StoreResult};

/// Algorithm name for predicate pairs entered by the user.
pub const MANUAL_ALGORITHM: &str = "manual";
/// Algorithm name for triples produced by one list-style completion request.
pub const COMPLETION_ALGORITHM: &str = "alg1";

/// Row id of a ledger entry.
pub type GenerationId = u64;

/// Gateway metadata attached to an automated episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionDetails {
    /// Model identifier reported by the gateway.
    pub model: String,
    /// Seed sent with the request.
    pub seed: u64,
    /// Response fingerprint, when the service returns one.
    pub fingerprint: Option<String>,
}

/// One triple generation episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripleGeneration {
    pub algorithm: Term,
    pub subject: Term,
    pub predicate: Term,
    /// Opaque JSON text.
    pub details: String,
    /// Forward triple ids, in the order they were generated.
    pub triple_ids: Vec<TripleId>,
}

impl TripleGeneration {
    /// The details parsed as JSON.
    pub fn details_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.details)
    }

    /// Triple ids as a comma-joined list, e.g. `"1,3,5"`.
    pub fn joined_ids(&self) -> String {
        self.triple_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One predicate pair generation episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateGeneration {
    pub algorithm: Term,
    pub predicate: Term,
    /// Opaque JSON text.
    pub details: String,
    /// Row id of the `(predicate, inverse)` registry row.
    pub predicate_id: PredicateId,
}

impl PredicateGeneration {
    /// The details parsed as JSON.
    pub fn details_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.details)
    }
}

/// What a committed completion episode wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReceipt {
    pub generation_id: GenerationId,
    pub triple_ids: Vec<TripleId>,
}

fn json_text<T: Serialize>(details: &T) -> StoreResult<String> {
    serde_json::to_string(details).map_err(|e| StoreError::Serialization {
        message: format!("failed to encode generation details: {e}"),
    })
}

impl GraphWriter {
    /// Append a triple generation entry.
    pub fn record_triple_generation<D: Serialize>(
        &self,
        algorithm: &str,
        subject: &str,
        predicate: &str,
        details: &D,
        triple_ids: &[TripleId],
    ) -> StoreResult<GenerationId> {
        let row = TripleGeneration {
            algorithm: algorithm.to_string(),
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            details: json_text(details)?,
            triple_ids: triple_ids.to_vec(),
        };
        self.append(TRIPLE_GENERATION, &row)
    }

    /// Append a predicate generation entry.
    pub fn record_predicate_generation<D: Serialize>(
        &self,
        algorithm: &str,
        predicate: &str,
        details: &D,
        predicate_id: PredicateId,
    ) -> StoreResult<GenerationId> {
        let row = PredicateGeneration {
            algorithm: algorithm.to_string(),
            predicate: predicate.to_string(),
            details: json_text(details)?,
            predicate_id,
        };
        self.append(PREDICATE_GENERATION, &row)
    }
}

impl KnowledgeStore {
    /// Register a user-supplied predicate pair and its ledger entry atomically.
    pub fn register_manual_predicate(&self, predicate: &str, inverse: &str) -> GraphResult<PredicateId> {
        let writer = self.begin_write()?;
        let predicate_id = writer.register_pair(predicate, inverse)?;
        writer.record_predicate_generation(
            MANUAL_ALGORITHM,
            predicate,
            &serde_json::json!({}),
            predicate_id,
        )?;
        writer.commit()?;
        tracing::info!(predicate, inverse, predicate_id, "registered predicate pair");
        Ok(predicate_id)
    }

    /// Write one symmetric triple pair per concept plus one ledger entry, atomically.
    pub fn record_completion_episode(
        &self,
        subject: &str,
        predicate: &str,
        inverse: &str,
        concepts: &[String],
        details: &CompletionDetails,
    ) -> StoreResult<GenerationReceipt> {
        let writer = self.begin_write()?;
        let triple_ids = concepts
            .iter()
            .map(|concept| writer.insert_pair(subject, predicate, concept, inverse))
            .collect::<StoreResult<Vec<_>>>()?;
        let generation_id = writer.record_triple_generation(
            COMPLETION_ALGORITHM,
            subject,
            predicate,
            details,
            &triple_ids,
        )?;
        writer.commit()?;
        tracing::info!(
            subject,
            predicate,
            generation_id,
            triples = triple_ids.len(),
            "recorded completion episode"
        );
        Ok(GenerationReceipt {
            generation_id,
            triple_ids,
        })
    }

    /// All triple generation entries, oldest first.
    pub fn triple_generations(&self) -> StoreResult<Vec<(GenerationId, TripleGeneration)>> {
        self.all_rows(TRIPLE_GENERATION)
    }

    /// All predicate generation entries, oldest first.
    pub fn predicate_generations(&self) -> StoreResult<Vec<(GenerationId, PredicateGeneration)>> {
        self.all_rows(PREDICATE_GENERATION)
    }
}
