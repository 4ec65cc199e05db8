//! Sale status transitions
//!
//! Payment and delivery move independently, except that a sale can only be
//! delivered once it is paid and has been sent. Re-applying the current
//! status is accepted and changes nothing.

use shared::models::{DeliveryStatus, PaymentStatus, Sale};
use shared::{AppError, AppResult, ErrorCode};

/// Check that `sale` may move to payment status `next`
pub fn check_payment_transition(sale: &Sale, next: PaymentStatus) -> AppResult<()> {
    let current = sale.payment_status;
    if current == next || current.can_transition_to(next) {
        return Ok(());
    }
    Err(AppError::with_message(
        ErrorCode::PaymentTransitionInvalid,
        format!("Payment cannot move from {} to {}", current, next),
    )
    .with_detail("id", sale.id)
    .with_detail("from", current.as_str())
    .with_detail("to", next.as_str()))
}

/// Check that `sale` may move to delivery status `next`
pub fn check_delivery_transition(sale: &Sale, next: DeliveryStatus) -> AppResult<()> {
    let current = sale.delivery_status;
    if current == next {
        return Ok(());
    }
    if !current.can_transition_to(next) {
        return Err(AppError::with_message(
            ErrorCode::DeliveryTransitionInvalid,
            format!("Delivery cannot move from {} to {}", current, next),
        )
        .with_detail("id", sale.id)
        .with_detail("from", current.as_str())
        .with_detail("to", next.as_str()));
    }
    if next == DeliveryStatus::Delivered {
        if sale.payment_status != PaymentStatus::Paid {
            return Err(AppError::missing(ErrorCode::SaleNotPaid, sale.id));
        }
        if !sale.is_sent() {
            return Err(AppError::missing(ErrorCode::SaleNotSent, sale.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::SaleSource;

    fn sale(payment: PaymentStatus, delivery: DeliveryStatus, sent_at: Option<i64>) -> Sale {
        Sale {
            id: 1,
            video_id: 10,
            subscriber_id: 20,
            quantity: 1,
            price: Decimal::new(1500, 2),
            payment_status: payment,
            delivery_status: delivery,
            sent_at,
            source: SaleSource::Manual,
            notes: None,
            created_at: 0,
        }
    }

    #[test]
    fn deliver_requires_paid_and_sent() {
        let s = sale(PaymentStatus::Pending, DeliveryStatus::Pending, None);
        let err = check_delivery_transition(&s, DeliveryStatus::Delivered).unwrap_err();
        assert_eq!(err.code, ErrorCode::SaleNotPaid);

        let s = sale(PaymentStatus::Paid, DeliveryStatus::Pending, None);
        let err = check_delivery_transition(&s, DeliveryStatus::Delivered).unwrap_err();
        assert_eq!(err.code, ErrorCode::SaleNotSent);

        let s = sale(PaymentStatus::Paid, DeliveryStatus::Pending, Some(1_700_000_000_000));
        assert!(check_delivery_transition(&s, DeliveryStatus::Delivered).is_ok());
    }

    #[test]
    fn delivery_failure_needs_no_guard() {
        let s = sale(PaymentStatus::Pending, DeliveryStatus::Pending, None);
        assert!(check_delivery_transition(&s, DeliveryStatus::Failed).is_ok());
    }

    #[test]
    fn delivery_terminal_states() {
        let s = sale(PaymentStatus::Paid, DeliveryStatus::Failed, Some(1));
        let err = check_delivery_transition(&s, DeliveryStatus::Delivered).unwrap_err();
        assert_eq!(err.code, ErrorCode::DeliveryTransitionInvalid);

        let s = sale(PaymentStatus::Paid, DeliveryStatus::Delivered, Some(1));
        assert!(check_delivery_transition(&s, DeliveryStatus::Pending).is_err());
        assert!(check_delivery_transition(&s, DeliveryStatus::Delivered).is_ok());
    }

    #[test]
    fn payment_transitions() {
        let pending = sale(PaymentStatus::Pending, DeliveryStatus::Pending, None);
        assert!(check_payment_transition(&pending, PaymentStatus::Paid).is_ok());
        assert!(check_payment_transition(&pending, PaymentStatus::Failed).is_ok());
        assert!(check_payment_transition(&pending, PaymentStatus::Pending).is_ok());
        let err = check_payment_transition(&pending, PaymentStatus::Refunded).unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentTransitionInvalid);
        assert_eq!(err.detail("to").unwrap(), "refunded");

        let refunded = sale(PaymentStatus::Refunded, DeliveryStatus::Pending, None);
        assert!(check_payment_transition(&refunded, PaymentStatus::Paid).is_err());
    }
}
