//! Configuration for the sync layer.

pub mod defaults;
mod sync_config;

pub use sync_config::SyncConfig;
