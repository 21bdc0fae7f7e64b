//! Centralized error handling for the food scan gateway
//!
//! This module unifies error types across the application layers so that
//! the web layer can map every failure to a stable HTTP status and code.
//!
//! # Error Categories
//!
//! - **Database Errors**: SeaORM operations, migrations, connection issues
//! - **Repository Errors**: Data access layer failures
//! - **AI Gateway Errors**: rate limiting, exhausted credits, unusable completions
//! - **Budget Errors**: monthly spending cap reached
//! - **Validation Errors**: malformed or missing request input
//!
//! # Usage
//!
//! ```rust
//! use food_scan_gateway::errors::{AppError, AppResult};
//!
//! async fn example_function() -> AppResult<String> {
//!     // Function can return any error type that converts to AppError
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;
