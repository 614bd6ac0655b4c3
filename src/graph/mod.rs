//! Knowledge graph: concepts connected by inverse-paired predicates.
//!
//! The graph stores triples (subject, predicate, object) of plain string
//! terms. Concepts and predicates share one namespace; a term used as an
//! object in one triple may be the subject of another.
//!
//! - **Triples** ([`triples`]): always written as symmetric pairs
//! - **Predicate registry** ([`predicates`]): predicate ↔ inverse pairs
//! - **Traversal** ([`traverse`]): cycle-guarded subtopic outline export

pub mod predicates;
pub mod traverse;
pub mod triples;

use serde::{Deserialize, Serialize};

pub use predicates::PredicatePair;

/// A term naming either a concept or a predicate.
pub type Term = String;

/// Row id of a stored triple.
pub type TripleId = u64;

/// Row id of a stored predicate pair.
pub type PredicateId = u64;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, crate::error::GraphError>;

/// A directed fact (subject, predicate, object).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// The subject of the triple.
    pub subject: Term,
    /// The predicate (relation) of the triple.
    pub predicate: Term,
    /// The object of the triple.
    pub object: Term,
}

impl Triple {
    /// Create a new triple.
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// The mirror fact read from the object's side, using `inverse` as predicate.
    pub fn mirrored(&self, inverse: impl Into<Term>) -> Self {
        Self {
            subject: self.object.clone(),
            predicate: inverse.into(),
            object: self.subject.clone(),
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" \"{}\" \"{}\"",
            self.subject, self.predicate, self.object
        )
    }
}
