//! Order events - change notifications fired by the store after each mutation

use super::snapshot::OrderStatus;
use crate::util::now_millis;
use serde::{Deserialize, Serialize};

/// Change notification
///
/// Consumers hold no cached copy of the collections: they subscribe to these
/// and re-query the store when one arrives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderEvent {
    /// Per-store sequence, increases by one per event
    pub sequence: u64,
    /// Order this event belongs to (`None` for store-wide events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Unix milliseconds when the event was produced
    pub timestamp: i64,
    pub payload: EventPayload,
}

/// Event payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderCreated {
        customer: String,
        item_count: usize,
    },
    StatusChanged {
        from: OrderStatus,
        to: OrderStatus,
        /// Set when the weight completion rule caused the change
        automatic: bool,
    },
    WeightRecorded {
        item_id: String,
        weight: f64,
    },
    OrdersReset {
        active_cleared: usize,
        archived_cleared: usize,
    },
}

impl OrderEvent {
    pub fn new(sequence: u64, order_id: Option<String>, payload: EventPayload) -> Self {
        Self {
            sequence,
            order_id,
            timestamp: now_millis(),
            payload,
        }
    }

    /// Whether this event moved an order into `completed`
    pub fn is_completion(&self) -> bool {
        matches!(
            self.payload,
            EventPayload::StatusChanged {
                to: OrderStatus::Completed,
                ..
            }
        )
    }
}
