//! Order Desk - order lifecycle engine for a butcher shop workstation
//!
//! # Overview
//!
//! Counter staff take orders (customer, phone, cut items, pickup time); the
//! back room weighs each item; an order completes once every item carries a
//! measured weight. This crate owns that lifecycle:
//!
//! - **Orders** (`orders`): OrderStore, status machine, weight completion, archive
//! - **Storage** (`orders::storage`): embedded redb file, one write per change
//! - **Urgency** (`utils::time`): minutes until pickup and urgency classes
//!
//! # Module layout
//!
//! ```text
//! order-desk/src/
//! ├── core/          # configuration
//! ├── orders/        # store, ids, completion rule, storage, customers
//! └── utils/         # logging, pickup time arithmetic
//! ```

pub mod core;
pub mod orders;
pub mod utils;

// Re-export public types
pub use core::Config;
pub use orders::{ErrorKind, OrderStorage, OrderStore, StoreError, StoreResult};
pub use utils::{Urgency, format_remaining};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Prepare the process: create the working directory and install logging
pub fn setup_environment(config: &Config) -> std::io::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;
    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    tracing::debug!(work_dir = %config.work_dir, environment = %config.environment, "Environment ready");
    Ok(())
}
