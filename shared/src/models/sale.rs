//! Sale Model
//!
//! A sale links one video to one subscriber and tracks two independent
//! status tracks: payment and delivery.
//!
//! ```text
//! payment:   PENDING ──► PAID ──► REFUNDED
//!               └──────► FAILED
//!
//! delivery:  PENDING ──► DELIVERED   (requires PAID and sent_at)
//!               └──────► FAILED
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment track
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Whether `self -> next` is a legal payment transition
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Failed) | (Paid, Refunded)
        )
    }

    /// No transition leaves this state
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Failed | PaymentStatus::Refunded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery track
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    /// Whether `self -> next` is a legal delivery transition (ignoring the
    /// payment/sent guard, which needs the whole sale)
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        matches!((self, next), (Pending, Delivered) | (Pending, Failed))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the sale was recorded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SaleSource {
    #[default]
    Manual,
    Telegram,
}

/// Sale entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub video_id: i64,
    pub subscriber_id: i64,
    pub quantity: u32,
    /// Unit price
    pub price: Decimal,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    /// Last time the sale was pushed to the notification channel
    pub sent_at: Option<i64>,
    pub source: SaleSource,
    pub notes: Option<String>,
    pub created_at: i64,
}

impl Sale {
    /// `price * max(quantity, 1)`
    pub fn total(&self) -> Decimal {
        sale_total(self.price, self.quantity)
    }

    pub fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }
}

/// Line total with the quantity floor applied
pub fn sale_total(price: Decimal, quantity: u32) -> Decimal {
    price * Decimal::from(quantity.max(1))
}

/// Create sale payload
///
/// No `source` field: provenance is set by the entry point
/// (`add_sale` vs `add_telegram_sale`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleCreate {
    pub video_id: i64,
    pub subscriber_id: i64,
    /// `None` or `0` means 1
    pub quantity: Option<u32>,
    pub price: Decimal,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

/// Update sale payload
///
/// Status tracks move through the store's transition methods, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleUpdate {
    pub video_id: Option<i64>,
    pub subscriber_id: Option<i64>,
    pub quantity: Option<u32>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
}
