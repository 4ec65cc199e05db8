//! Sale notifications
//!
//! The dashboard pushes a short text about a sale to an outside channel.
//! [`SaleNotifier`] is the seam; [`WebhookNotifier`] is the HTTP transport.

mod webhook;

pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::AppResult;
use shared::models::Sale;

/// Body posted for one sale: `{ message, timestamp }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleNotice {
    pub message: String,
    /// RFC 3339 / ISO 8601, UTC
    pub timestamp: String,
}

impl SaleNotice {
    pub fn for_sale(sale: &Sale, video_title: &str, subscriber_name: &str) -> Self {
        let message = format!(
            "New sale: \"{}\" for {} | quantity: {} | total: {} | payment: {}",
            video_title,
            subscriber_name,
            sale.quantity.max(1),
            sale.total().round_dp(2),
            sale.payment_status,
        );
        Self {
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Outbound channel for sale notices
#[async_trait]
pub trait SaleNotifier: Send + Sync {
    /// Deliver one notice; an error means it did not leave this process
    async fn notify(&self, notice: &SaleNotice) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{DeliveryStatus, PaymentStatus, SaleSource};

    #[test]
    fn notice_describes_the_sale() {
        let sale = Sale {
            id: 1,
            video_id: 2,
            subscriber_id: 3,
            quantity: 2,
            price: Decimal::new(1250, 2),
            payment_status: PaymentStatus::Paid,
            delivery_status: DeliveryStatus::Pending,
            sent_at: None,
            source: SaleSource::Telegram,
            notes: None,
            created_at: 0,
        };
        let notice = SaleNotice::for_sale(&sale, "Beach day", "Ana");
        assert!(notice.message.contains("\"Beach day\""));
        assert!(notice.message.contains("Ana"));
        assert!(notice.message.contains("quantity: 2"));
        assert!(notice.message.contains("total: 25.00"));
        assert!(notice.message.contains("payment: paid"));
        assert!(chrono::DateTime::parse_from_rfc3339(&notice.timestamp).is_ok());
    }
}
