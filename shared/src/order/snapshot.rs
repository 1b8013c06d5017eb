//! Order record - the state the store keeps and archives
//!
//! The same struct serves for the active collection and for archive entries.
//! An archive entry is a copy taken the moment the order became `completed`
//! and is never updated afterwards.

use super::types::{DeliveryMethod, OrderItem, OrderItemInput};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
///
/// ```text
/// received ──► preparing ──► completed
///     │            │
///     └────────────┴──────► cancelled
/// ```
///
/// `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Received,
    Preparing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in the order the status menu lists them
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Received,
        OrderStatus::Preparing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// No further status change is accepted once terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "received",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A customer order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `ORD-###`, assigned by the store
    pub id: String,
    pub customer: String,
    pub phone: String,
    /// Never empty; insertion order is display order
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    /// Fulfilment date (`yyyy-mm-dd`)
    pub date: NaiveDate,
    /// Pickup time of day (`HH:mm`)
    pub pickup_time: String,
    pub delivery_method: DeliveryMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Order {
    /// Look up an item by id
    pub fn item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Number of items that already carry a measured weight
    pub fn weighed_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_weighed()).count()
    }
}

/// Payload for creating a new order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer: String,
    pub phone: String,
    pub items: Vec<OrderItemInput>,
    pub date: NaiveDate,
    pub pickup_time: String,
    pub delivery_method: DeliveryMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
