//! Triple store operations.
//!
//! Facts are only ever written in symmetric pairs: `(s, p, o)` together with
//! `(o, p⁻¹, s)`, inside one write unit. There is no deduplication; writing
//! the same fact twice yields two rows.

use crate::store::durable::{TRIPLE_SUBJECTS, TRIPLES};
use crate::store::{GraphWriter, KnowledgeStore, StoreResult};

use super::{Triple, TripleId};

impl KnowledgeStore {
    /// All facts with `subject` as subject, in insertion order.
    ///
    /// Callers that display these must impose their own ordering.
    pub fn triples_with_subject(&self, subject: &str) -> StoreResult<Vec<(TripleId, Triple)>> {
        self.indexed_rows(TRIPLE_SUBJECTS, TRIPLES, subject)
    }

    /// Look up a single triple by row id.
    pub fn triple(&self, id: TripleId) -> StoreResult<Option<Triple>> {
        self.row(TRIPLES, id)
    }

    /// Every stored triple, in insertion order.
    pub fn all_triples(&self) -> StoreResult<Vec<(TripleId, Triple)>> {
        self.all_rows(TRIPLES)
    }

    /// Insert a symmetric fact pair in its own write unit.
    ///
    /// Returns the id of the forward triple.
    pub fn insert_pair(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        inverse: &str,
    ) -> StoreResult<TripleId> {
        let writer = self.begin_write()?;
        let id = writer.insert_pair(subject, predicate, object, inverse)?;
        writer.commit()?;
        Ok(id)
    }
}

impl GraphWriter {
    /// Insert `(subject, predicate, object)` and `(object, inverse, subject)`.
    ///
    /// Only the forward row id is returned; provenance tracks the forward direction.
    pub fn insert_pair(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        inverse: &str,
    ) -> StoreResult<TripleId> {
        let forward = Triple::new(subject, predicate, object);
        let forward_id = self.insert_triple(&forward)?;
        self.insert_triple(&forward.mirrored(inverse))?;
        Ok(forward_id)
    }

    fn insert_triple(&self, triple: &Triple) -> StoreResult<TripleId> {
        let id = self.append(TRIPLES, triple)?;
        self.index(TRIPLE_SUBJECTS, &triple.subject, id)?;
        Ok(id)
    }
}
