//! Unified error codes for the Studio domain
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Subscriber errors
//! - 5xxx: Casting / project errors
//! - 6xxx: Sales catalog and sale lifecycle errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so they serialize as plain
/// numbers for any consumer of the domain layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource already exists
    AlreadyExists = 4,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Subscriber ====================
    /// Subscriber not found
    SubscriberNotFound = 4001,
    /// Subscriber is already inactive
    SubscriberAlreadyInactive = 4002,
    /// Subscriber is inactive
    SubscriberInactive = 4003,
    /// Subscriber is still active
    SubscriberStillActive = 4004,
    /// Tag not found
    TagNotFound = 4101,
    /// Recovery note not found
    RecoveryNoteNotFound = 4201,
    /// Attachment not found
    AttachmentNotFound = 4301,

    // ==================== 5xxx: Casting ====================
    /// Casting not found
    CastingNotFound = 5001,
    /// Subscriber is not interested in casting
    CastingNotInterested = 5002,
    /// Casting requires an associated project
    CastingProjectRequired = 5003,
    /// Project not found
    ProjectNotFound = 5101,

    // ==================== 6xxx: Sales ====================
    /// Sale not found
    SaleNotFound = 6001,
    /// Sale has not been paid
    SaleNotPaid = 6002,
    /// Sale has not been sent
    SaleNotSent = 6003,
    /// Payment status transition not allowed
    PaymentTransitionInvalid = 6004,
    /// Delivery status transition not allowed
    DeliveryTransitionInvalid = 6005,
    /// Plan not found
    PlanNotFound = 6101,
    /// Promotion not found
    PromotionNotFound = 6201,
    /// Video not found
    VideoNotFound = 6301,
    /// Sales webhook URL is not configured
    WebhookNotConfigured = 6401,
    /// Sales webhook call failed
    WebhookFailed = 6402,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Subscriber
            ErrorCode::SubscriberNotFound => "Subscriber not found",
            ErrorCode::SubscriberAlreadyInactive => "Subscriber is already inactive",
            ErrorCode::SubscriberInactive => "Subscriber is inactive",
            ErrorCode::SubscriberStillActive => "Subscriber is still active",
            ErrorCode::TagNotFound => "Tag not found",
            ErrorCode::RecoveryNoteNotFound => "Recovery note not found",
            ErrorCode::AttachmentNotFound => "Attachment not found",

            // Casting
            ErrorCode::CastingNotFound => "Casting not found",
            ErrorCode::CastingNotInterested => "Subscriber is not interested in casting",
            ErrorCode::CastingProjectRequired => "Casting requires a project",
            ErrorCode::ProjectNotFound => "Project not found",

            // Sales
            ErrorCode::SaleNotFound => "Sale not found",
            ErrorCode::SaleNotPaid => "Sale has not been paid",
            ErrorCode::SaleNotSent => "Sale has not been sent",
            ErrorCode::PaymentTransitionInvalid => "Payment status transition not allowed",
            ErrorCode::DeliveryTransitionInvalid => "Delivery status transition not allowed",
            ErrorCode::PlanNotFound => "Plan not found",
            ErrorCode::PromotionNotFound => "Promotion not found",
            ErrorCode::VideoNotFound => "Video not found",
            ErrorCode::WebhookNotConfigured => "Sales webhook URL is not configured",
            ErrorCode::WebhookFailed => "Sales webhook call failed",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            4 => Ok(ErrorCode::AlreadyExists),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Subscriber
            4001 => Ok(ErrorCode::SubscriberNotFound),
            4002 => Ok(ErrorCode::SubscriberAlreadyInactive),
            4003 => Ok(ErrorCode::SubscriberInactive),
            4004 => Ok(ErrorCode::SubscriberStillActive),
            4101 => Ok(ErrorCode::TagNotFound),
            4201 => Ok(ErrorCode::RecoveryNoteNotFound),
            4301 => Ok(ErrorCode::AttachmentNotFound),

            // Casting
            5001 => Ok(ErrorCode::CastingNotFound),
            5002 => Ok(ErrorCode::CastingNotInterested),
            5003 => Ok(ErrorCode::CastingProjectRequired),
            5101 => Ok(ErrorCode::ProjectNotFound),

            // Sales
            6001 => Ok(ErrorCode::SaleNotFound),
            6002 => Ok(ErrorCode::SaleNotPaid),
            6003 => Ok(ErrorCode::SaleNotSent),
            6004 => Ok(ErrorCode::PaymentTransitionInvalid),
            6005 => Ok(ErrorCode::DeliveryTransitionInvalid),
            6101 => Ok(ErrorCode::PlanNotFound),
            6201 => Ok(ErrorCode::PromotionNotFound),
            6301 => Ok(ErrorCode::VideoNotFound),
            6401 => Ok(ErrorCode::WebhookNotConfigured),
            6402 => Ok(ErrorCode::WebhookFailed),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::SubscriberNotFound.code(), 4001);
        assert_eq!(ErrorCode::CastingNotInterested.code(), 5002);
        assert_eq!(ErrorCode::SaleNotSent.code(), 6003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_roundtrips_known_codes() {
        for code in [
            ErrorCode::AlreadyExists,
            ErrorCode::TagNotFound,
            ErrorCode::ProjectNotFound,
            ErrorCode::DeliveryTransitionInvalid,
            ErrorCode::WebhookFailed,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        // 0, 3, 9001 are not part of the domain code table
        for retired in [0, 3, 9001] {
            assert!(ErrorCode::try_from(retired).is_err());
        }
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ErrorCode::SaleNotPaid.to_string(), "E6002");
        assert_eq!(ErrorCode::ValidationFailed.to_string(), "E0002");
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::SaleNotSent).unwrap();
        assert_eq!(json, "6003");
        let code: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(code, ErrorCode::SubscriberNotFound);
        assert!(serde_json::from_str::<ErrorCode>("1234").is_err());
    }
}
