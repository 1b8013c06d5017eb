//! Order Module
//!
//! This module provides the order data model shared by the engine and its
//! collaborators:
//! - Types: line items, units, storage and delivery options
//! - Snapshots: the order record kept active and copied into the archive
//! - Events: change notifications fired by the store

pub mod event;
pub mod snapshot;
pub mod types;

// Re-exports
pub use event::{EventPayload, OrderEvent};
pub use snapshot::{NewOrder, Order, OrderStatus};
pub use types::*;
