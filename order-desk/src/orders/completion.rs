//! Weight completion rule
//!
//! An order completes itself the moment every item carries a measured weight.
//! The rule is evaluated against the weight about to be written, before the
//! write, so one evaluation answers "does this weight finish the order".

use shared::order::Order;

/// A weight is usable when finite and non-negative
pub fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight >= 0.0
}

/// Decide whether recording `proposed_weight` on `updated_item_id` completes `order`
///
/// Each item's effective weight is `proposed_weight` for the updated item and
/// its stored `actual_weight` otherwise; a missing weight is unsatisfied.
/// Returns `true` iff every effective weight is valid.
///
/// Callers validate `proposed_weight` and the order's status first. Pure:
/// the same arguments always give the same answer.
pub fn should_auto_complete(order: &Order, updated_item_id: &str, proposed_weight: f64) -> bool {
    order.items.iter().all(|item| {
        let effective = if item.id == updated_item_id {
            Some(proposed_weight)
        } else {
            item.actual_weight
        };
        effective.is_some_and(is_valid_weight)
    })
}
