//! ACID-durable relational store backed by redb.
//!
//! Every table the graph needs is declared here and created when the database
//! is opened. Rows are bincode-encoded and keyed by a per-table `u64` row id;
//! secondary lookups go through multimap index tables.

use std::path::{Path, PathBuf};

use redb::backends::InMemoryBackend;
use redb::{
    Database, MultimapTableDefinition, ReadTransaction, ReadableMultimapTable, ReadableTable,
    ReadableTableMetadata, TableDefinition, TableHandle, WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::store::{StoreResult, StoreStats};

/// File name of the database inside the data directory.
pub const DB_FILE: &str = "knowgen.redb";

pub(crate) type RowTable = TableDefinition<'static, u64, &'static [u8]>;
pub(crate) type IndexTable = MultimapTableDefinition<'static, &'static str, u64>;

/// Triple rows: id → `(subject, predicate, object)`.
pub(crate) const TRIPLES: RowTable = TableDefinition::new("triples");
/// Subject → triple ids.
pub(crate) const TRIPLE_SUBJECTS: IndexTable = MultimapTableDefinition::new("triple_subjects");
/// Predicate pair rows: id → `(predicate, inverse)`.
pub(crate) const PREDICATES: RowTable = TableDefinition::new("predicates");
/// Predicate → predicate pair ids.
pub(crate) const PREDICATE_NAMES: IndexTable = MultimapTableDefinition::new("predicate_names");
/// Triple generation ledger.
pub(crate) const TRIPLE_GENERATION: RowTable = TableDefinition::new("triple_generation");
/// Predicate generation ledger.
pub(crate) const PREDICATE_GENERATION: RowTable = TableDefinition::new("predicate_generation");

const ROW_TABLES: [RowTable; 4] = [TRIPLES, PREDICATES, TRIPLE_GENERATION, PREDICATE_GENERATION];
const INDEX_TABLES: [IndexTable; 2] = [TRIPLE_SUBJECTS, PREDICATE_NAMES];

/// The knowledge graph's relational store.
///
/// Reads use MVCC snapshots; all writes go through a [`GraphWriter`].
pub struct KnowledgeStore {
    db: Database,
    path: Option<PathBuf>,
}

impl KnowledgeStore {
    /// Open or create the store in the given directory.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Io { source: e })?;
        let db_path = data_dir.join(DB_FILE);
        let db = Database::create(&db_path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", db_path.display()),
        })?;
        tracing::info!(path = %db_path.display(), "opened knowledge store");
        Self::init(db, Some(db_path))
    }

    /// Create a store that lives only as long as this value.
    pub fn in_memory() -> StoreResult<Self> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(StoreError::redb("create in-memory database"))?;
        Self::init(db, None)
    }

    fn init(db: Database, path: Option<PathBuf>) -> StoreResult<Self> {
        let txn = db.begin_write().map_err(StoreError::redb("begin_write"))?;
        {
            for def in ROW_TABLES {
                txn.open_table(def).map_err(StoreError::redb("open_table"))?;
            }
            for def in INDEX_TABLES {
                txn.open_multimap_table(def)
                    .map_err(StoreError::redb("open_multimap_table"))?;
            }
        }
        txn.commit().map_err(StoreError::redb("commit"))?;
        Ok(Self { db, path })
    }

    /// Path of the database file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Start an atomic write. Nothing is visible to readers until
    /// [`GraphWriter::commit`] succeeds.
    pub fn begin_write(&self) -> StoreResult<GraphWriter> {
        let txn = self.db.begin_write().map_err(StoreError::redb("begin_write"))?;
        Ok(GraphWriter { txn })
    }

    fn begin_read(&self) -> StoreResult<ReadTransaction> {
        self.db.begin_read().map_err(StoreError::redb("begin_read"))
    }

    /// Fetch a single row by id.
    pub(crate) fn row<T: DeserializeOwned>(&self, def: RowTable, id: u64) -> StoreResult<Option<T>> {
        let txn = self.begin_read()?;
        let table = txn.open_table(def).map_err(StoreError::redb("open_table"))?;
        read_row(&table, id)
    }

    /// Fetch every row whose id is listed under `key` in `index`, in id order.
    pub(crate) fn indexed_rows<T: DeserializeOwned>(
        &self,
        index: IndexTable,
        def: RowTable,
        key: &str,
    ) -> StoreResult<Vec<(u64, T)>> {
        let txn = self.begin_read()?;
        let index = txn
            .open_multimap_table(index)
            .map_err(StoreError::redb("open_multimap_table"))?;
        let table = txn.open_table(def).map_err(StoreError::redb("open_table"))?;
        read_indexed(&index, &table, def, key)
    }

    /// Fetch all rows of a table in id order.
    pub(crate) fn all_rows<T: DeserializeOwned>(&self, def: RowTable) -> StoreResult<Vec<(u64, T)>> {
        let txn = self.begin_read()?;
        let table = txn.open_table(def).map_err(StoreError::redb("open_table"))?;
        let mut rows = Vec::new();
        for entry in table.iter().map_err(StoreError::redb("iter"))? {
            let (key, value) = entry.map_err(StoreError::redb("iter"))?;
            let row = bincode::deserialize(value.value()).map_err(StoreError::decode)?;
            rows.push((key.value(), row));
        }
        Ok(rows)
    }

    /// Row counts for every table.
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let txn = self.begin_read()?;
        let len = |def: RowTable| -> StoreResult<u64> {
            txn.open_table(def)
                .map_err(StoreError::redb("open_table"))?
                .len()
                .map_err(StoreError::redb("len"))
        };
        Ok(StoreStats {
            triples: len(TRIPLES)?,
            predicates: len(PREDICATES)?,
            triple_generations: len(TRIPLE_GENERATION)?,
            predicate_generations: len(PREDICATE_GENERATION)?,
        })
    }
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("path", &self.path)
            .finish()
    }
}

/// One atomic unit of writes against the store.
///
/// Dropping a writer without calling [`commit`](Self::commit) discards
/// everything written through it.
pub struct GraphWriter {
    txn: WriteTransaction,
}

impl GraphWriter {
    /// Append a row, allocating the next id of its table (starting at 1).
    pub(crate) fn append<T: Serialize>(&self, def: RowTable, row: &T) -> StoreResult<u64> {
        let encoded = bincode::serialize(row).map_err(StoreError::encode)?;
        let mut table = self.txn.open_table(def).map_err(StoreError::redb("open_table"))?;
        let id = {
            let last = table.last().map_err(StoreError::redb("last"))?;
            last.map(|(key, _)| key.value() + 1).unwrap_or(1)
        };
        table
            .insert(id, encoded.as_slice())
            .map_err(StoreError::redb("insert"))?;
        Ok(id)
    }

    /// Record `id` under `key` in a secondary index.
    pub(crate) fn index(&self, index: IndexTable, key: &str, id: u64) -> StoreResult<()> {
        let mut table = self
            .txn
            .open_multimap_table(index)
            .map_err(StoreError::redb("open_multimap_table"))?;
        table.insert(key, id).map_err(StoreError::redb("multimap insert"))?;
        Ok(())
    }

    /// Like [`KnowledgeStore::indexed_rows`], but sees this writer's uncommitted rows.
    pub(crate) fn indexed_rows<T: DeserializeOwned>(
        &self,
        index: IndexTable,
        def: RowTable,
        key: &str,
    ) -> StoreResult<Vec<(u64, T)>> {
        let index = self
            .txn
            .open_multimap_table(index)
            .map_err(StoreError::redb("open_multimap_table"))?;
        let table = self.txn.open_table(def).map_err(StoreError::redb("open_table"))?;
        read_indexed(&index, &table, def, key)
    }

    /// Make every write in this unit visible at once.
    pub fn commit(self) -> StoreResult<()> {
        self.txn.commit().map_err(StoreError::redb("commit"))
    }

    /// Discard every write in this unit.
    pub fn abort(self) -> StoreResult<()> {
        self.txn.abort().map_err(StoreError::redb("abort"))
    }
}

fn read_row<T: DeserializeOwned>(
    table: &impl ReadableTable<u64, &'static [u8]>,
    id: u64,
) -> StoreResult<Option<T>> {
    let guard = table.get(id).map_err(StoreError::redb("get"))?;
    guard
        .map(|g| bincode::deserialize(g.value()).map_err(StoreError::decode))
        .transpose()
}

fn read_indexed<T: DeserializeOwned>(
    index: &impl ReadableMultimapTable<&'static str, u64>,
    table: &impl ReadableTable<u64, &'static [u8]>,
    def: RowTable,
    key: &str,
) -> StoreResult<Vec<(u64, T)>> {
    let mut rows = Vec::new();
    for id in index.get(key).map_err(StoreError::redb("multimap get"))? {
        let id = id.map_err(StoreError::redb("multimap read"))?.value();
        let row = read_row(table, id)?.ok_or(StoreError::Dangling {
            table: def.name().to_string(),
            id,
        })?;
        rows.push((id, row));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn append_allocates_ids_from_one() {
        let store = KnowledgeStore::in_memory().unwrap();
        let writer = store.begin_write().unwrap();
        assert_eq!(writer.append(TRIPLES, &"first").unwrap(), 1);
        assert_eq!(writer.append(TRIPLES, &"second").unwrap(), 2);
        // Each table has its own id sequence.
        assert_eq!(writer.append(PREDICATES, &"other").unwrap(), 1);
        writer.commit().unwrap();

        let row: Option<String> = store.row(TRIPLES, 2).unwrap();
        assert_eq!(row.as_deref(), Some("second"));
        assert!(store.row::<String>(TRIPLES, 3).unwrap().is_none());
    }

    #[test]
    fn dropped_writer_is_not_visible() {
        let store = KnowledgeStore::in_memory().unwrap();
        {
            let writer = store.begin_write().unwrap();
            writer.append(TRIPLES, &"lost").unwrap();
        }
        let writer = store.begin_write().unwrap();
        writer.append(TRIPLES, &"kept").unwrap();
        writer.abort().unwrap();

        assert_eq!(store.stats().unwrap().triples, 0);
    }

    #[test]
    fn index_lists_rows_in_id_order() {
        let store = KnowledgeStore::in_memory().unwrap();
        let writer = store.begin_write().unwrap();
        for label in ["a", "b", "c"] {
            let id = writer.append(TRIPLES, &label.to_string()).unwrap();
            if label != "b" {
                writer.index(TRIPLE_SUBJECTS, "key", id).unwrap();
            }
        }
        let pending: Vec<(u64, String)> =
            writer.indexed_rows(TRIPLE_SUBJECTS, TRIPLES, "key").unwrap();
        assert_eq!(pending.len(), 2);
        writer.commit().unwrap();

        let rows: Vec<(u64, String)> = store.indexed_rows(TRIPLE_SUBJECTS, TRIPLES, "key").unwrap();
        assert_eq!(rows, vec![(1, "a".to_string()), (3, "c".to_string())]);
        let none: Vec<(u64, String)> = store.indexed_rows(TRIPLE_SUBJECTS, TRIPLES, "nope").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn persistence_across_reopens() {
        let dir = TempDir::new().unwrap();
        {
            let store = KnowledgeStore::open(dir.path()).unwrap();
            let writer = store.begin_write().unwrap();
            writer.append(TRIPLE_GENERATION, &vec![1u64, 2, 3]).unwrap();
            writer.commit().unwrap();
        }

        let store = KnowledgeStore::open(dir.path()).unwrap();
        assert_eq!(store.path(), Some(dir.path().join(DB_FILE).as_path()));
        let rows: Vec<(u64, Vec<u64>)> = store.all_rows(TRIPLE_GENERATION).unwrap();
        assert_eq!(rows, vec![(1, vec![1, 2, 3])]);
    }

    #[test]
    fn open_creates_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("xdg/share/knowgen");
        let store = KnowledgeStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.path(), Some(nested.join(DB_FILE).as_path()));
    }
}
