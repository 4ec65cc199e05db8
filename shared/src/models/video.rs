//! Video Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Video product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    /// Duration in seconds
    pub duration: u32,
    pub url: String,
    #[serde(default)]
    pub participants: Vec<String>,
    pub created_at: i64,
}

/// Create video payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoCreate {
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration: u32,
    pub url: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Update video payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub duration: Option<u32>,
    pub url: Option<String>,
    pub participants: Option<Vec<String>>,
}
