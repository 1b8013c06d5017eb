//! Core module - configuration
//!
//! - [`Config`] - workstation configuration

pub mod config;

pub use config::Config;
