//! Predicate registry: predicate ↔ inverse-predicate pairs.
//!
//! A pair `(P, P⁻¹)` is stored as two independent rows, `(P, P⁻¹)` and
//! `(P⁻¹, P)`, so the inverse of either direction is a single indexed lookup.
//! The ordered pair is unique; registering it again is a
//! [`GraphError::DuplicateRegistration`]. A self-inverse predicate (`P == P⁻¹`)
//! is its own mirror and takes a single row.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::store::durable::{PREDICATE_NAMES, PREDICATES};
use crate::store::{GraphWriter, KnowledgeStore, StoreResult};

use super::{GraphResult, PredicateId, Term};

/// One registry row: a predicate and its inverse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredicatePair {
    pub predicate: Term,
    pub inverse: Term,
}

impl PredicatePair {
    pub fn new(predicate: impl Into<Term>, inverse: impl Into<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            inverse: inverse.into(),
        }
    }

    /// The same pair read from the other direction.
    pub fn mirrored(&self) -> Self {
        Self {
            predicate: self.inverse.clone(),
            inverse: self.predicate.clone(),
        }
    }
}

/// First registered inverse among the rows for one predicate.
fn first_inverse(predicate: &str, rows: Vec<(PredicateId, PredicatePair)>) -> Option<Term> {
    if rows.len() > 1 {
        tracing::warn!(
            predicate,
            count = rows.len(),
            "predicate has more than one registered inverse, using the oldest"
        );
    }
    rows.into_iter().next().map(|(_, pair)| pair.inverse)
}

impl KnowledgeStore {
    /// The registered inverse of `predicate`, if any.
    pub fn inverse_of(&self, predicate: &str) -> StoreResult<Option<Term>> {
        let rows = self.indexed_rows(PREDICATE_NAMES, PREDICATES, predicate)?;
        Ok(first_inverse(predicate, rows))
    }

    /// Look up a registry row by id.
    pub fn predicate_pair(&self, id: PredicateId) -> StoreResult<Option<PredicatePair>> {
        self.row(PREDICATES, id)
    }

    /// Every registry row, in insertion order.
    pub fn all_predicate_pairs(&self) -> StoreResult<Vec<(PredicateId, PredicatePair)>> {
        self.all_rows(PREDICATES)
    }

    /// Register a predicate pair in its own write unit.
    pub fn register_pair(&self, predicate: &str, inverse: &str) -> GraphResult<PredicateId> {
        let writer = self.begin_write()?;
        let id = writer.register_pair(predicate, inverse)?;
        writer.commit()?;
        Ok(id)
    }
}

impl GraphWriter {
    /// Like [`KnowledgeStore::inverse_of`], including this writer's uncommitted rows.
    pub fn inverse_of(&self, predicate: &str) -> StoreResult<Option<Term>> {
        let rows = self.indexed_rows(PREDICATE_NAMES, PREDICATES, predicate)?;
        Ok(first_inverse(predicate, rows))
    }

    /// Insert `(predicate, inverse)` and its mirror.
    ///
    /// Fails when the pair is already on file, or when either term is already
    /// paired with something else. Returns the row id of `(predicate, inverse)`.
    pub fn register_pair(&self, predicate: &str, inverse: &str) -> GraphResult<PredicateId> {
        let pair = PredicatePair::new(predicate, inverse);
        let mirror = pair.mirrored();
        if self.has_pair(&pair)? || self.has_pair(&mirror)? {
            return Err(GraphError::DuplicateRegistration {
                predicate: predicate.to_string(),
                inverse: inverse.to_string(),
            });
        }
        self.ensure_unpaired(predicate, inverse)?;
        self.ensure_unpaired(inverse, predicate)?;

        let id = self.insert_predicate_row(&pair)?;
        if mirror != pair {
            self.insert_predicate_row(&mirror)?;
        }
        Ok(id)
    }

    fn ensure_unpaired(&self, term: &str, requested: &str) -> GraphResult<()> {
        match self.inverse_of(term)? {
            Some(existing) if existing != requested => Err(GraphError::ConflictingInverse {
                term: term.to_string(),
                existing,
                requested: requested.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn has_pair(&self, pair: &PredicatePair) -> StoreResult<bool> {
        let rows: Vec<(PredicateId, PredicatePair)> =
            self.indexed_rows(PREDICATE_NAMES, PREDICATES, &pair.predicate)?;
        Ok(rows.iter().any(|(_, row)| row == pair))
    }

    fn insert_predicate_row(&self, pair: &PredicatePair) -> StoreResult<PredicateId> {
        let id = self.append(PREDICATES, pair)?;
        self.index(PREDICATE_NAMES, &pair.predicate, id)?;
        Ok(id)
    }
}
