//! redb-based storage layer for the order collections
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `collections` | `butcher-shop-orders` | `Vec<Order>` (JSON) | Active collection |
//! | `collections` | `butcher-shop-completed-orders` | `Vec<Order>` (JSON) | Completed archive |
//! | `sequence_counter` | `order_count` | `u64` | Orders issued so far |
//!
//! # Durability
//!
//! Every save overwrites both collections and the counter in a single write
//! transaction. redb commits are durable once `commit()` returns and the file
//! is never observed half-written, so the two collections cannot drift apart
//! across a power loss.

use redb::{Database, ReadOnlyTable, ReadableDatabase, ReadableTable, TableDefinition};
use shared::order::Order;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for the serialized collections: key = collection name, value = JSON array
const COLLECTIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");

/// Table for the order counter: key = "order_count", value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

pub const ACTIVE_ORDERS_KEY: &str = "butcher-shop-orders";
pub const COMPLETED_ORDERS_KEY: &str = "butcher-shop-completed-orders";
const ORDER_COUNT_KEY: &str = "order_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Everything the store keeps durably
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedOrders {
    pub active: Vec<Order>,
    pub completed: Vec<Order>,
    /// Orders issued so far; `None` when the counter key was never written
    pub order_count: Option<u64>,
}

/// Durable key-value backing for the store
///
/// The store is the only caller. `save` is a full overwrite, never an
/// incremental update.
pub trait OrderPersistence: Send + Sync {
    /// Load both collections and the counter; missing or undecodable keys are empty
    fn load(&self) -> StorageResult<PersistedOrders>;

    /// Overwrite both collections and the counter in one durable write
    fn save(&self, active: &[Order], completed: &[Order], order_count: u64) -> StorageResult<()>;
}

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").field("db", &"<redb::Database>").finish()
    }
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and previews)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(COLLECTIONS_TABLE)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Overwrite one collection key with raw bytes
    #[cfg(test)]
    pub(crate) fn put_raw(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut collections = txn.open_table(COLLECTIONS_TABLE)?;
            collections.insert(key, bytes)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Read one collection
    ///
    /// A missing key is an empty collection. So is a value that no longer
    /// decodes: it is logged and the other keys still load.
    fn read_collection(
        table: &ReadOnlyTable<&'static str, &'static [u8]>,
        key: &str,
    ) -> StorageResult<Vec<Order>> {
        let Some(value) = table.get(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice(value.value()) {
            Ok(orders) => Ok(orders),
            Err(e) => {
                tracing::error!(key, error = %e, "Unreadable order collection, loading it as empty");
                Ok(Vec::new())
            }
        }
    }
}

impl OrderPersistence for OrderStorage {
    fn load(&self) -> StorageResult<PersistedOrders> {
        let read_txn = self.db.begin_read()?;
        let collections = read_txn.open_table(COLLECTIONS_TABLE)?;
        let active = Self::read_collection(&collections, ACTIVE_ORDERS_KEY)?;
        let completed = Self::read_collection(&collections, COMPLETED_ORDERS_KEY)?;

        let sequence = read_txn.open_table(SEQUENCE_TABLE)?;
        let order_count = sequence.get(ORDER_COUNT_KEY)?.map(|guard| guard.value());

        tracing::debug!(
            active = active.len(),
            completed = completed.len(),
            order_count = ?order_count,
            "Loaded order collections"
        );

        Ok(PersistedOrders {
            active,
            completed,
            order_count,
        })
    }

    fn save(&self, active: &[Order], completed: &[Order], order_count: u64) -> StorageResult<()> {
        // Serialize before opening the transaction
        let active_json = serde_json::to_vec(active)?;
        let completed_json = serde_json::to_vec(completed)?;

        let txn = self.db.begin_write()?;
        {
            let mut collections = txn.open_table(COLLECTIONS_TABLE)?;
            collections.insert(ACTIVE_ORDERS_KEY, active_json.as_slice())?;
            collections.insert(COMPLETED_ORDERS_KEY, completed_json.as_slice())?;

            let mut sequence = txn.open_table(SEQUENCE_TABLE)?;
            sequence.insert(ORDER_COUNT_KEY, order_count)?;
        }
        txn.commit()?;

        tracing::trace!(
            active = active.len(),
            completed = completed.len(),
            order_count,
            "Saved order collections"
        );
        Ok(())
    }
}
