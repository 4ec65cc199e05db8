//! Utilities - logging and input validation

pub mod logger;
pub mod validation;

pub use shared::{AppError, AppResult, ErrorCategory, ErrorCode};
