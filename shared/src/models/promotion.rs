//! Promotion Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Time-bounded discount on a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: i64,
    pub plan_id: i64,
    pub name: String,
    /// 0-100
    pub discount_percentage: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: i64,
}

impl Promotion {
    /// Enabled and not yet expired on `today`
    pub fn is_applicable(&self, today: NaiveDate) -> bool {
        self.is_active && self.end_date >= today
    }
}

/// Create promotion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCreate {
    pub plan_id: i64,
    pub name: String,
    pub discount_percentage: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: Option<bool>,
}

/// Update promotion payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionUpdate {
    pub plan_id: Option<i64>,
    pub name: Option<String>,
    pub discount_percentage: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}
