//! Customer directory collaborator
//!
//! Consulted when an order is created. The store never depends on it
//! succeeding: a failed registration is logged and the order stands.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Maximum results returned by a name search
pub const SEARCH_LIMIT: usize = 10;

/// A known customer, keyed by phone number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Name and phone are required")]
    MissingField,

    #[error("Customer directory unavailable: {0}")]
    Unavailable(String),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Customer lookup and registration
pub trait CustomerDirectory: Send + Sync {
    fn find_by_phone(&self, phone: &str) -> DirectoryResult<Option<Customer>>;

    /// Register a customer
    ///
    /// Idempotent: a phone that already exists returns the existing record
    /// unchanged instead of failing.
    fn create(&self, name: &str, phone: &str) -> DirectoryResult<Customer>;

    /// Case-insensitive substring match on the name, at most [`SEARCH_LIMIT`]
    /// results. An empty query matches nothing.
    fn search_by_name(&self, query: &str) -> DirectoryResult<Vec<Customer>>;
}

/// Process-local directory
#[derive(Debug, Default)]
pub struct InMemoryCustomerDirectory {
    customers: RwLock<HashMap<String, Customer>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.customers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.read().is_empty()
    }
}

impl CustomerDirectory for InMemoryCustomerDirectory {
    fn find_by_phone(&self, phone: &str) -> DirectoryResult<Option<Customer>> {
        Ok(self.customers.read().get(phone).cloned())
    }

    fn create(&self, name: &str, phone: &str) -> DirectoryResult<Customer> {
        let (name, phone) = (name.trim(), phone.trim());
        if name.is_empty() || phone.is_empty() {
            return Err(DirectoryError::MissingField);
        }

        let mut customers = self.customers.write();
        let customer = customers
            .entry(phone.to_string())
            .or_insert_with(|| {
                tracing::debug!(phone, "Registered new customer");
                Customer {
                    name: name.to_string(),
                    phone: phone.to_string(),
                }
            })
            .clone();
        Ok(customer)
    }

    fn search_by_name(&self, query: &str) -> DirectoryResult<Vec<Customer>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let customers = self.customers.read();
        let mut matches: Vec<Customer> = customers
            .values()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.phone.cmp(&b.phone)));
        matches.truncate(SEARCH_LIMIT);
        Ok(matches)
    }
}
