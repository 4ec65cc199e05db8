//! Input validation helpers
//!
//! Centralized text length constants and required-field checks. Every
//! failure is an [`AppError`] carrying the offending `field` in its details,
//! so a form can highlight it inline.

use shared::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: subscriber, tag, plan, video title, casting theme, project
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, recovery notes
pub const MAX_NOTE_LEN: usize = 2000;

/// Short identifiers: phone, color codes, mime types
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// URLs
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::field(field, format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", value.len()),
        ));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", v.len()),
        ));
    }
    Ok(())
}

/// Loose email shape check: one `@` with text on both sides.
pub fn validate_optional_email(value: &Option<String>, field: &str) -> Result<(), AppError> {
    validate_optional_text(value, field, MAX_EMAIL_LEN)?;
    if let Some(v) = value {
        let mut parts = v.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && domain.contains('.')
        );
        if !well_formed {
            return Err(AppError::field(field, format!("{field} is not a valid email")));
        }
    }
    Ok(())
}

/// Validate a percentage in `0..=100`.
pub fn validate_percentage(value: f64, field: &str) -> Result<(), AppError> {
    if !(0.0..=100.0).contains(&value) || value.is_nan() {
        return Err(AppError::with_message(
            shared::ErrorCode::ValueOutOfRange,
            format!("{field} must be between 0 and 100"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that a money amount is not negative.
pub fn validate_price(value: rust_decimal::Decimal, field: &str) -> Result<(), AppError> {
    if value.is_sign_negative() {
        return Err(AppError::with_message(
            shared::ErrorCode::ValueOutOfRange,
            format!("{field} must not be negative"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn required_text_rejects_blank() {
        let err = validate_required_text("   ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.detail("field").unwrap(), "name");
        assert!(validate_required_text("Ana", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn required_text_rejects_too_long() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_optional_email(&None, "email").is_ok());
        assert!(validate_optional_email(&Some("a@b.co".into()), "email").is_ok());
        assert!(validate_optional_email(&Some("nope".into()), "email").is_err());
        assert!(validate_optional_email(&Some("@b.co".into()), "email").is_err());
        assert!(validate_optional_email(&Some("a@b@c.co".into()), "email").is_err());
    }

    #[test]
    fn percentage_bounds() {
        assert!(validate_percentage(0.0, "discount").is_ok());
        assert!(validate_percentage(100.0, "discount").is_ok());
        assert!(validate_percentage(100.5, "discount").is_err());
        assert!(validate_percentage(-1.0, "discount").is_err());
        assert!(validate_percentage(f64::NAN, "discount").is_err());
    }

    #[test]
    fn price_not_negative() {
        assert!(validate_price(Decimal::ZERO, "price").is_ok());
        assert!(validate_price(Decimal::new(-1, 0), "price").is_err());
    }
}
