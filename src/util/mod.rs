//! Utility types for integrating the shuffle into a server.
//!
//! Configuration of the precomputation store lives here.
//!

/// Configuration of the precomputation store.
pub mod config;

// Re-export
pub use self::config::PrecomputeConfig;
