//! Shared types for the Studio domain
//!
//! Models, the unified error system and small utilities used by the stores
//! and by any front end that consumes them.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
