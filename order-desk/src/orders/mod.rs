//! Order lifecycle module for the shop workstation
//!
//! - **ids**: `ORD-###` sequence and item id generation
//! - **completion**: the weight completion rule
//! - **store**: OrderStore, the single owner of the active collection and archive
//! - **storage**: redb-based persistence for both collections and the counter
//! - **customers**: customer directory collaborator
//!
//! # Architecture
//!
//! ```text
//! Operator action → OrderStore → mutate in memory → Storage (redb)
//!                        ↓
//!                    Broadcast
//!                        ↓
//!            Workspace / urgency board re-query
//! ```
//!
//! # Data Flow
//!
//! 1. The workspace calls a store mutation (create, status, weight, reset)
//! 2. OrderStore validates against the current in-memory state
//! 3. The change is applied to the active collection (and archive on completion)
//! 4. An OrderEvent is broadcast to subscribers
//! 5. Both collections and the counter are written in one redb transaction
//! 6. The result (or the storage error) is returned to the caller

pub mod completion;
pub mod customers;
pub mod ids;
pub mod storage;
pub mod store;

// Re-exports
pub use customers::{Customer, CustomerDirectory, DirectoryError, InMemoryCustomerDirectory};
pub use storage::{OrderPersistence, OrderStorage, PersistedOrders, StorageError};
pub use store::{BoardEntry, ErrorKind, OrderStore, StoreError, StoreResult, WeightOutcome};

// Re-export shared types for convenience
pub use shared::order::{
    DeliveryMethod, EventPayload, NewOrder, Order, OrderEvent, OrderItem, OrderItemInput,
    OrderStatus,
};
