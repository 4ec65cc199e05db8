//! Plan Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Subscription plan (tier)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    /// Duration in months
    pub duration: u32,
    #[serde(default)]
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create plan payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Update plan payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub duration: Option<u32>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
