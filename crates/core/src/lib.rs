//! Core types for the cycle arbitrage scanner
//!
//! This crate provides shared types used across all components:
//! - Token and pool definitions
//! - Exact decimal helpers
//! - Quote and opportunity types
//! - Scan configuration and errors

pub mod types;
pub mod tokens;
pub mod pools;
pub mod quotes;
pub mod opportunities;
pub mod config;
pub mod errors;

pub use types::*;
pub use tokens::*;
pub use pools::*;
pub use quotes::*;
pub use opportunities::*;
pub use config::*;
pub use errors::*;
