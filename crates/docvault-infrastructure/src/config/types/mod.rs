//! Configuration types module

pub mod app;
pub mod cache;
pub mod compression;
pub mod crypto;
pub mod logging;
pub mod metrics;
pub mod repository;
pub mod resilience;
pub mod search;
pub mod tasks;

// Re-export main types
pub use app::*;
