//! Shared types for order line items and fulfilment options

use serde::{Deserialize, Serialize};

// ============================================================================
// Enumerations
// ============================================================================

/// Unit an item is ordered in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemUnit {
    /// Ordered by weight
    #[default]
    Gram,
    /// Ordered by slice count
    Sheet,
}

/// How the item must be kept until pickup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Refrigerated,
    Frozen,
}

/// How the finished order leaves the shop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMethod {
    /// Shop's own local delivery round
    Local,
    RegionalCourierA,
    RegionalCourierB,
    NationwideCourier,
    /// Customer collects at the counter
    #[default]
    Pickup,
}

impl DeliveryMethod {
    /// All delivery methods, in menu order
    pub const ALL: [DeliveryMethod; 5] = [
        DeliveryMethod::Local,
        DeliveryMethod::RegionalCourierA,
        DeliveryMethod::RegionalCourierB,
        DeliveryMethod::NationwideCourier,
        DeliveryMethod::Pickup,
    ];

    /// Wire value, as stored in the persisted collections
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Local => "local",
            DeliveryMethod::RegionalCourierA => "regional-courier-a",
            DeliveryMethod::RegionalCourierB => "regional-courier-b",
            DeliveryMethod::NationwideCourier => "nationwide-courier",
            DeliveryMethod::Pickup => "pickup",
        }
    }
}

// ============================================================================
// Item Types
// ============================================================================

/// Order line item as stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Generated at creation, join key for weight updates
    pub id: String,
    /// Product name
    pub name: String,
    /// Ordered quantity (grams or sheets, see `unit`)
    pub quantity: u32,
    pub unit: ItemUnit,
    /// Cut description, empty when the customer has no preference
    #[serde(default)]
    pub cut_type: String,
    pub storage_type: StorageType,
    /// Free-form part classifier (loin, belly, tongue, ...)
    #[serde(default)]
    pub part: String,
    /// Weight measured at fulfilment, absent until weighed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_weight: Option<f64>,
}

impl OrderItem {
    /// Whether this item carries a usable measured weight
    pub fn is_weighed(&self) -> bool {
        self.actual_weight
            .is_some_and(|w| w.is_finite() && w >= 0.0)
    }
}

/// Order item input - for creating orders (without id)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub name: String,
    pub quantity: u32,
    pub unit: ItemUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut_type: Option<String>,
    pub storage_type: StorageType,
    #[serde(default)]
    pub part: String,
}

impl OrderItemInput {
    /// Convenience constructor for a refrigerated item sold by weight
    pub fn grams(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: ItemUnit::Gram,
            cut_type: None,
            storage_type: StorageType::Refrigerated,
            part: String::new(),
        }
    }

    pub fn with_cut(mut self, cut_type: impl Into<String>) -> Self {
        self.cut_type = Some(cut_type.into());
        self
    }

    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.part = part.into();
        self
    }

    pub fn frozen(mut self) -> Self {
        self.storage_type = StorageType::Frozen;
        self
    }

    /// Materialise into a stored item, normalising a missing cut to `""`
    pub fn into_item(self, id: String) -> OrderItem {
        OrderItem {
            id,
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            cut_type: self.cut_type.unwrap_or_default(),
            storage_type: self.storage_type,
            part: self.part,
            actual_weight: None,
        }
    }
}
