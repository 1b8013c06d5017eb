//! Order identifiers
//!
//! Order ids are `ORD-` followed by a sequence number zero-padded to at least
//! three digits. The sequence comes from a counter persisted next to the
//! collections, never from a collection length.

const ORDER_ID_PREFIX: &str = "ORD-";

/// Format the order id for a sequence number
pub fn format_order_id(sequence: u64) -> String {
    format!("{}{:03}", ORDER_ID_PREFIX, sequence)
}

/// Id for the next order given the number of orders issued so far
pub fn next_order_id(issued: u64) -> String {
    format_order_id(issued + 1)
}

/// Sequence number of an `ORD-###` id
pub fn parse_order_sequence(order_id: &str) -> Option<u64> {
    order_id.strip_prefix(ORDER_ID_PREFIX)?.parse().ok()
}

/// Monotonic order counter
///
/// Holds the number of orders issued so far. Seeded from durable storage at
/// startup and only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderSequence {
    issued: u64,
}

impl OrderSequence {
    pub fn new(issued: u64) -> Self {
        Self { issued }
    }

    /// Seed from a stored counter, never below the largest id already in use
    pub fn recover<'a>(stored: Option<u64>, existing_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let highest = existing_ids
            .into_iter()
            .filter_map(parse_order_sequence)
            .max()
            .unwrap_or(0);
        Self::new(stored.unwrap_or(0).max(highest))
    }

    /// Number of ids issued so far
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Id the next call to [`advance`](Self::advance) will return
    pub fn peek(&self) -> String {
        next_order_id(self.issued)
    }

    /// Issue the next id
    pub fn advance(&mut self) -> String {
        let id = self.peek();
        self.issued += 1;
        id
    }
}
