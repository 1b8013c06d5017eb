//! Shared types for the order desk
//!
//! Data model used by the lifecycle engine and by every collaborator that
//! reads its collections (list views, export, customer directory).

pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
