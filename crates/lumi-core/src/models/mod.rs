//! Data models: bill records and configuration.

pub mod config;
pub mod invoice;
