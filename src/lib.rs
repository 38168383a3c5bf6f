pub mod config;
pub mod db;
pub mod error;

// Search and storage helpers
pub mod import;
pub mod media;
pub mod search;

// HTTP surface
pub mod api;
pub mod auth;

pub mod cli;

// Utilities
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
