//! Common types and utilities for Monitor AR
//!
//! This crate provides shared types, helpers, and the common error type used
//! across the Monitor AR crates.
//!
//! # Modules
//!
//! - [`error`] - Common error types
//! - [`types`] - Shared domain types (Symbol)
//! - [`num`] - Null-safe numeric helpers (rounding, division, locale parsing)

pub mod error;
pub mod num;
pub mod types;

pub use error::{Error, Result};
pub use num::{finite, parse_ar_number, round2, round_to, safe_div};
pub use types::*;
