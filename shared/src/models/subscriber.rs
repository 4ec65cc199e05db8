//! Subscriber Model

use super::tag::Tag;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Subscriber lifecycle status
///
/// `Active -> Inactive` is the only transition; there is no reactivate path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberStatus {
    #[default]
    Active,
    Inactive,
}

/// Subscriber entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: SubscriberStatus,
    /// Plan reference (Plan.id in the sales store)
    pub plan_id: Option<i64>,
    /// Contracted duration in months
    pub plan_duration: u32,
    pub start_subscription_date: NaiveDate,
    pub end_subscription_date: Option<NaiveDate>,
    pub interested_in_casting: bool,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Most recent first
    #[serde(default)]
    pub recovery_notes: Vec<RecoveryNote>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Casting ids; mirrors `Casting.selected_subscribers`
    #[serde(default)]
    pub casting_participations: Vec<i64>,
    pub created_at: i64,
}

impl Subscriber {
    pub fn is_active(&self) -> bool {
        self.status == SubscriberStatus::Active
    }

    /// Active and opted in to casting calls
    pub fn is_casting_candidate(&self) -> bool {
        self.is_active() && self.interested_in_casting
    }

    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }
}

/// Create subscriber payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriberCreate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_id: Option<i64>,
    pub plan_duration: Option<u32>,
    /// Defaults to today
    pub start_subscription_date: Option<NaiveDate>,
    pub interested_in_casting: Option<bool>,
    pub notes: Option<String>,
}

/// Update subscriber payload (shallow merge, status is not updatable)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriberUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_id: Option<i64>,
    pub plan_duration: Option<u32>,
    pub start_subscription_date: Option<NaiveDate>,
    pub interested_in_casting: Option<bool>,
    pub notes: Option<String>,
}

/// Note recorded while trying to win back an inactive subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryNote {
    pub id: i64,
    pub content: String,
    pub created_at: i64,
}

/// File metadata attached to a subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub name: String,
    pub mime_type: String,
    pub url: String,
    pub size: u64,
    pub created_at: i64,
}

/// Create attachment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentCreate {
    pub name: String,
    pub mime_type: String,
    pub url: String,
    pub size: u64,
}
