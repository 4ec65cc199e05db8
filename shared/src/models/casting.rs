//! Casting Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Casting entity (a time-boxed call for subscribers to take part in a production)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Casting {
    pub id: i64,
    pub theme: String,
    pub description: Option<String>,
    pub number_of_people: u32,
    pub opening_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub recording_date: NaiveDate,
    pub posting_date: NaiveDate,
    /// Subscriber ids; mirrors `Subscriber.casting_participations`
    #[serde(default)]
    pub selected_subscribers: Vec<i64>,
    pub created_at: i64,
}

impl Casting {
    pub fn has_subscriber(&self, subscriber_id: i64) -> bool {
        self.selected_subscribers.contains(&subscriber_id)
    }
}

/// Create casting payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastingCreate {
    pub theme: String,
    pub description: Option<String>,
    pub number_of_people: u32,
    pub opening_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub recording_date: NaiveDate,
    pub posting_date: NaiveDate,
}

/// Update casting payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastingUpdate {
    pub theme: Option<String>,
    pub description: Option<String>,
    pub number_of_people: Option<u32>,
    pub opening_date: Option<NaiveDate>,
    pub closing_date: Option<NaiveDate>,
    pub recording_date: Option<NaiveDate>,
    pub posting_date: Option<NaiveDate>,
}
