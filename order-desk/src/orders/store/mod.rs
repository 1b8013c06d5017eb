//! OrderStore - owner of the active collection and the completed archive
//!
//! This module handles:
//! - Order creation with validated input and monotonic ids
//! - The status state machine, with archive snapshots on completion
//! - Weight recording and the weight completion rule
//! - Persistence of both collections after every mutation
//! - Change notification (via broadcast)
//!
//! # Mutation Flow
//!
//! ```text
//! create / set_status / record_weight / reset_all
//!     ├─ 1. Validate input and look up order/item (no state touched on error)
//!     ├─ 2. Apply to in-memory collections
//!     ├─ 3. Broadcast event(s)
//!     ├─ 4. Save both collections + counter (one durable write)
//!     └─ 5. Return result (storage error surfaces here)
//! ```
//!
//! Every mutating method takes `&mut self` and finishes its durable write
//! before returning, so a read that follows always sees in-memory and durable
//! state in agreement. Share the store behind a mutex if several components
//! need it; it never calls back into its callers while mutating.

mod error;
pub use error::*;

use super::completion::{is_valid_weight, should_auto_complete};
use super::customers::CustomerDirectory;
use super::ids::OrderSequence;
use super::storage::{OrderPersistence, OrderStorage, PersistedOrders};
use crate::core::Config;
use crate::utils::time::{Urgency, remaining_minutes};
use chrono::{NaiveDate, NaiveDateTime};
use shared::order::{EventPayload, NewOrder, Order, OrderEvent, OrderStatus};
use shared::util::item_id;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Result of a successful weight write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightOutcome {
    /// The write completed the order
    pub auto_completed: bool,
}

/// A pending order with its pickup urgency
#[derive(Debug, Clone, PartialEq)]
pub struct BoardEntry<'a> {
    pub order: &'a Order,
    pub remaining_minutes: i64,
    pub urgency: Urgency,
}

/// Order store
pub struct OrderStore {
    storage: Box<dyn OrderPersistence>,
    orders: Vec<Order>,
    completed_orders: Vec<Order>,
    sequence: OrderSequence,
    event_tx: broadcast::Sender<OrderEvent>,
    event_sequence: u64,
    customer_directory: Option<Arc<dyn CustomerDirectory>>,
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore")
            .field("storage", &"<OrderPersistence>")
            .field("orders", &self.orders.len())
            .field("completed_orders", &self.completed_orders.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl OrderStore {
    /// Open the redb database named by `config` and load from it
    pub fn open(config: &Config) -> StoreResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(super::storage::StorageError::from)?;
        let path = config.db_path();
        let storage = OrderStorage::open(&path)?;
        tracing::info!(path = %path.display(), "Order database opened");
        Ok(Self::new(storage))
    }

    /// Create a store over the given persistence and load its collections
    ///
    /// A failed load is logged and the store starts empty.
    pub fn new(storage: impl OrderPersistence + 'static) -> Self {
        let loaded = match storage.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load orders, starting with empty collections");
                PersistedOrders::default()
            }
        };

        let completed_orders = sanitize_archive(loaded.completed);
        let sequence = OrderSequence::recover(
            loaded.order_count,
            loaded
                .active
                .iter()
                .chain(completed_orders.iter())
                .map(|order| order.id.as_str()),
        );
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            active = loaded.active.len(),
            completed = completed_orders.len(),
            next_id = %sequence.peek(),
            "OrderStore ready"
        );

        Self {
            storage: Box::new(storage),
            orders: loaded.active,
            completed_orders,
            sequence,
            event_tx,
            event_sequence: 0,
            customer_directory: None,
        }
    }

    /// Set the customer directory consulted on order creation
    pub fn set_customer_directory(&mut self, directory: Arc<dyn CustomerDirectory>) {
        self.customer_directory = Some(directory);
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    // ========== Queries ==========

    /// Active collection, in creation order
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Completed archive, in completion order
    pub fn completed_orders(&self) -> &[Order] {
        &self.completed_orders
    }

    pub fn get_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == order_id)
    }

    /// Active orders still being worked on (neither completed nor cancelled)
    pub fn pending_orders(&self) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|order| !order.status.is_terminal())
            .collect()
    }

    /// Archive entries for one fulfilment date
    pub fn completed_orders_on(&self, date: NaiveDate) -> Vec<&Order> {
        self.completed_orders
            .iter()
            .filter(|order| order.date == date)
            .collect()
    }

    /// Pending orders with their urgency at `now`, most pressing first
    pub fn urgency_board(&self, now: NaiveDateTime) -> Vec<BoardEntry<'_>> {
        let mut board: Vec<BoardEntry<'_>> = self
            .pending_orders()
            .into_iter()
            .map(|order| {
                let minutes = remaining_minutes(&order.pickup_time, now);
                BoardEntry {
                    order,
                    remaining_minutes: minutes,
                    urgency: Urgency::classify(minutes),
                }
            })
            .collect();
        // Stable sort keeps creation order among equal deadlines
        board.sort_by_key(|entry| entry.remaining_minutes);
        board
    }

    /// Id the next created order will receive
    pub fn next_order_id(&self) -> String {
        self.sequence.peek()
    }

    // ========== Mutations ==========

    /// Create an order in `received` status
    pub fn create(&mut self, new_order: NewOrder) -> StoreResult<Order> {
        validate_new_order(&new_order)?;

        let id = self.sequence.advance();
        let items = new_order
            .items
            .into_iter()
            .enumerate()
            .map(|(index, input)| input.into_item(item_id(index)))
            .collect();

        let order = Order {
            id: id.clone(),
            customer: new_order.customer.trim().to_string(),
            phone: new_order.phone.trim().to_string(),
            items,
            status: OrderStatus::Received,
            date: new_order.date,
            pickup_time: new_order.pickup_time,
            delivery_method: new_order.delivery_method,
            notes: new_order.notes.filter(|notes| !notes.trim().is_empty()),
        };
        self.orders.push(order.clone());

        tracing::info!(
            order_id = %id,
            customer = %order.customer,
            items = order.items.len(),
            pickup_time = %order.pickup_time,
            "Order created"
        );
        self.emit(
            Some(id),
            EventPayload::OrderCreated {
                customer: order.customer.clone(),
                item_count: order.items.len(),
            },
        );

        self.register_customer(&order.customer, &order.phone);
        self.persist()?;
        Ok(order)
    }

    /// Operator-requested status change
    ///
    /// Requesting the current status is a no-op. Terminal orders reject any
    /// other status.
    pub fn set_status(&mut self, order_id: &str, status: OrderStatus) -> StoreResult<()> {
        let index = self.index_of(order_id)?;
        let current = self.orders[index].status;

        if current == status {
            // Repair a completed order whose archive entry went missing
            if status == OrderStatus::Completed && self.archive_snapshot(index) {
                self.persist()?;
            } else {
                tracing::debug!(order_id, status = %status, "Status unchanged");
            }
            return Ok(());
        }

        if current.is_terminal() {
            tracing::warn!(order_id, from = %current, to = %status, "Rejected transition out of terminal status");
            return Err(StoreError::InvalidTransition {
                order_id: order_id.to_string(),
                from: current,
                to: status,
            });
        }

        self.apply_status(index, status, false);
        self.persist()
    }

    /// Record the measured weight of one item
    ///
    /// When the weight completes the order (see
    /// [`should_auto_complete`](super::completion::should_auto_complete)) the
    /// order moves to `completed` and is archived in the same call; both
    /// changes go out in a single durable write.
    pub fn record_weight(
        &mut self,
        order_id: &str,
        item_id: &str,
        weight: f64,
    ) -> StoreResult<WeightOutcome> {
        if !is_valid_weight(weight) {
            return Err(StoreError::Validation(format!(
                "Weight must be a finite number >= 0, got {}",
                weight
            )));
        }

        let index = self.index_of(order_id)?;
        let order = &self.orders[index];
        if order.status.is_terminal() {
            tracing::warn!(order_id, status = %order.status, "Rejected weight for finished order");
            return Err(StoreError::terminal(order_id, order.status));
        }
        let item_index = order
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| StoreError::ItemNotFound {
                order_id: order_id.to_string(),
                item_id: item_id.to_string(),
            })?;

        let auto_completed = should_auto_complete(order, item_id, weight);

        self.orders[index].items[item_index].actual_weight = Some(weight);
        tracing::info!(order_id, item_id, weight, "Weight recorded");
        self.emit(
            Some(order_id.to_string()),
            EventPayload::WeightRecorded {
                item_id: item_id.to_string(),
                weight,
            },
        );

        if auto_completed {
            tracing::info!(order_id, "All items weighed, completing order");
            self.apply_status(index, OrderStatus::Completed, true);
        }

        self.persist()?;
        Ok(WeightOutcome { auto_completed })
    }

    /// Clear the active collection and the archive together
    ///
    /// The order counter is kept, so ids issued after a reset never repeat
    /// earlier ones.
    pub fn reset_all(&mut self) -> StoreResult<()> {
        let active_cleared = self.orders.len();
        let archived_cleared = self.completed_orders.len();
        self.orders.clear();
        self.completed_orders.clear();

        tracing::warn!(active_cleared, archived_cleared, "All order data reset");
        self.emit(
            None,
            EventPayload::OrdersReset {
                active_cleared,
                archived_cleared,
            },
        );
        self.persist()
    }

    // ========== Internals ==========

    fn index_of(&self, order_id: &str) -> StoreResult<usize> {
        self.orders
            .iter()
            .position(|order| order.id == order_id)
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))
    }

    /// Move an order to `status`, archiving it when it becomes completed
    fn apply_status(&mut self, index: usize, status: OrderStatus, automatic: bool) {
        let order = &mut self.orders[index];
        let from = order.status;
        order.status = status;
        let order_id = order.id.clone();

        if status == OrderStatus::Completed {
            self.archive_snapshot(index);
        }

        tracing::info!(order_id = %order_id, from = %from, to = %status, automatic, "Order status changed");
        self.emit(
            Some(order_id),
            EventPayload::StatusChanged {
                from,
                to: status,
                automatic,
            },
        );
    }

    /// Append a snapshot of a completed order unless already archived
    fn archive_snapshot(&mut self, index: usize) -> bool {
        let order = &self.orders[index];
        if self.completed_orders.iter().any(|done| done.id == order.id) {
            return false;
        }
        self.completed_orders.push(order.clone());
        tracing::debug!(order_id = %order.id, "Order archived");
        true
    }

    fn emit(&mut self, order_id: Option<String>, payload: EventPayload) {
        self.event_sequence += 1;
        let event = OrderEvent::new(self.event_sequence, order_id, payload);
        if self.event_tx.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }

    /// Best effort; never fails the order
    fn register_customer(&self, name: &str, phone: &str) {
        let Some(directory) = &self.customer_directory else {
            return;
        };
        if let Err(e) = directory.create(name, phone) {
            tracing::warn!(phone, error = %e, "Customer registration failed, order kept");
        }
    }

    fn persist(&self) -> StoreResult<()> {
        self.storage
            .save(&self.orders, &self.completed_orders, self.sequence.issued())
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to persist orders, change may not survive restart");
                StoreError::Storage(e)
            })
    }
}

fn validate_new_order(new_order: &NewOrder) -> StoreResult<()> {
    if new_order.customer.trim().is_empty() {
        return Err(StoreError::Validation("Customer name is required".into()));
    }
    if new_order.phone.trim().is_empty() {
        return Err(StoreError::Validation("Phone number is required".into()));
    }
    if new_order.items.is_empty() {
        return Err(StoreError::Validation("Order must contain at least one item".into()));
    }
    for (index, item) in new_order.items.iter().enumerate() {
        if item.name.trim().is_empty() {
            return Err(StoreError::Validation(format!("Item {} has no name", index + 1)));
        }
        if item.quantity == 0 {
            return Err(StoreError::Validation(format!(
                "Item {} ({}) must have a positive quantity",
                index + 1,
                item.name
            )));
        }
    }
    Ok(())
}

/// Drop archive entries that break the archive invariants
fn sanitize_archive(completed: Vec<Order>) -> Vec<Order> {
    let before = completed.len();
    let mut seen = HashSet::new();
    let archive: Vec<Order> = completed
        .into_iter()
        .filter(|order| order.status == OrderStatus::Completed && seen.insert(order.id.clone()))
        .collect();
    if archive.len() != before {
        tracing::warn!(dropped = before - archive.len(), "Dropped invalid archive entries on load");
    }
    archive
}

#[cfg(test)]
mod tests;
