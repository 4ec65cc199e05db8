//! Subscriber Store
//!
//! Single source of truth for subscribers, tags and castings.
//!
//! # Relationship rules
//!
//! | Operation | Also touches |
//! |-----------|--------------|
//! | `delete_subscriber` | every casting's `selected_subscribers` |
//! | `delete_casting` (crate only) | every subscriber's `casting_participations` |
//! | `update_tag` / `delete_tag` | every subscriber's `tags` |
//! | `add/remove_subscriber_to/from_casting` | both sides, one transition |

use super::StateCell;
use crate::events::{ChangeAction, EntityKind, EventBus, StoreEvent};
use crate::storage::SnapshotStorage;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_email,
    validate_optional_text, validate_required_text,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::models::{
    Attachment, AttachmentCreate, Casting, CastingCreate, CastingUpdate, DEFAULT_TAG_COLOR,
    RecoveryNote, Subscriber, SubscriberCreate, SubscriberStatus, SubscriberUpdate, Tag,
    TagCreate, TagUpdate,
};
use shared::util::{now_millis, snowflake_id, today};
use shared::{AppError, AppResult, ErrorCode};
use tokio::sync::broadcast;

const STORE_KEY: &str = "subscribers";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SubscriberState {
    subscribers: Vec<Subscriber>,
    tags: Vec<Tag>,
    castings: Vec<Casting>,
}

impl SubscriberState {
    fn subscriber_mut(&mut self, id: i64) -> AppResult<&mut Subscriber> {
        self.subscribers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::missing(ErrorCode::SubscriberNotFound, id))
    }

    fn casting_mut(&mut self, id: i64) -> AppResult<&mut Casting> {
        self.castings
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::missing(ErrorCode::CastingNotFound, id))
    }

    fn tag_mut(&mut self, id: i64) -> AppResult<&mut Tag> {
        self.tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::missing(ErrorCode::TagNotFound, id))
    }

    fn ensure_tag_name_free(&self, name: &str, except: Option<i64>) -> AppResult<()> {
        let taken = self
            .tags
            .iter()
            .any(|t| Some(t.id) != except && t.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(AppError::already_exists(format!("Tag '{}'", name)));
        }
        Ok(())
    }
}

fn validate_casting_dates(
    opening: NaiveDate,
    closing: NaiveDate,
    recording: NaiveDate,
    posting: NaiveDate,
) -> AppResult<()> {
    if closing < opening {
        return Err(AppError::field(
            "closing_date",
            "closing_date must not be before opening_date",
        ));
    }
    if posting < recording {
        return Err(AppError::field(
            "posting_date",
            "posting_date must not be before recording_date",
        ));
    }
    Ok(())
}

/// Subscriber store
pub struct SubscriberStore {
    cell: StateCell<SubscriberState>,
    events: EventBus,
}

impl std::fmt::Debug for SubscriberStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberStore")
            .field("subscribers", &self.cell.read(|s| s.subscribers.len()))
            .field("castings", &self.cell.read(|s| s.castings.len()))
            .finish()
    }
}

impl Default for SubscriberStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberStore {
    /// Memory-only store
    pub fn new() -> Self {
        Self {
            cell: StateCell::in_memory(STORE_KEY),
            events: EventBus::new(),
        }
    }

    /// Store backed by a snapshot database
    pub fn open(storage: SnapshotStorage) -> AppResult<Self> {
        Ok(Self {
            cell: StateCell::open(STORE_KEY, storage)?,
            events: EventBus::new(),
        })
    }

    /// Change notifications for this store
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ========== Subscribers ==========

    pub fn list_subscribers(&self) -> Vec<Subscriber> {
        self.cell.read(|s| s.subscribers.clone())
    }

    pub fn get_subscriber(&self, id: i64) -> Option<Subscriber> {
        self.cell
            .read(|s| s.subscribers.iter().find(|x| x.id == id).cloned())
    }

    pub fn active_subscribers(&self) -> Vec<Subscriber> {
        self.filter_subscribers(Subscriber::is_active)
    }

    pub fn inactive_subscribers(&self) -> Vec<Subscriber> {
        self.filter_subscribers(|s| !s.is_active())
    }

    /// Subscribers that may be selected for a casting
    pub fn casting_candidates(&self) -> Vec<Subscriber> {
        self.filter_subscribers(Subscriber::is_casting_candidate)
    }

    fn filter_subscribers(&self, pred: impl Fn(&Subscriber) -> bool) -> Vec<Subscriber> {
        self.cell.read(|s| {
            s.subscribers
                .iter()
                .filter(|x| pred(x))
                .cloned()
                .collect()
        })
    }

    /// Create an active subscriber
    ///
    /// Email and phone are not checked for uniqueness.
    pub fn add_subscriber(&self, data: SubscriberCreate) -> AppResult<Subscriber> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_email(&data.email, "email")?;
        validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;

        let subscriber = Subscriber {
            id: snowflake_id(),
            name: data.name.trim().to_string(),
            email: data.email,
            phone: data.phone,
            status: SubscriberStatus::Active,
            plan_id: data.plan_id,
            plan_duration: data.plan_duration.unwrap_or(1),
            start_subscription_date: data.start_subscription_date.unwrap_or_else(today),
            end_subscription_date: None,
            interested_in_casting: data.interested_in_casting.unwrap_or(false),
            notes: data.notes,
            tags: Vec::new(),
            recovery_notes: Vec::new(),
            attachments: Vec::new(),
            casting_participations: Vec::new(),
            created_at: now_millis(),
        };

        let created = self.cell.mutate(|s| {
            s.subscribers.push(subscriber.clone());
            Ok(subscriber)
        })?;
        tracing::info!(subscriber_id = created.id, "Subscriber created");
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Created, created.id);
        Ok(created)
    }

    /// Shallow-merge the given fields (last write wins)
    pub fn update_subscriber(&self, id: i64, data: SubscriberUpdate) -> AppResult<Subscriber> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_email(&data.email, "email")?;
        validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;

        let updated = self.cell.mutate(|s| {
            let sub = s.subscriber_mut(id)?;
            if let Some(name) = data.name {
                sub.name = name.trim().to_string();
            }
            if data.email.is_some() {
                sub.email = data.email;
            }
            if data.phone.is_some() {
                sub.phone = data.phone;
            }
            if data.plan_id.is_some() {
                sub.plan_id = data.plan_id;
            }
            if let Some(duration) = data.plan_duration {
                sub.plan_duration = duration;
            }
            if let Some(date) = data.start_subscription_date {
                sub.start_subscription_date = date;
            }
            if let Some(interested) = data.interested_in_casting {
                sub.interested_in_casting = interested;
            }
            if data.notes.is_some() {
                sub.notes = data.notes;
            }
            Ok(sub.clone())
        })?;
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Updated, id);
        Ok(updated)
    }

    /// Hard delete; the subscriber is removed from every casting
    pub fn delete_subscriber(&self, id: i64) -> AppResult<()> {
        let touched = self.cell.mutate(|s| {
            let idx = s
                .subscribers
                .iter()
                .position(|x| x.id == id)
                .ok_or_else(|| AppError::missing(ErrorCode::SubscriberNotFound, id))?;
            s.subscribers.remove(idx);

            let mut touched = Vec::new();
            for casting in s.castings.iter_mut() {
                if casting.has_subscriber(id) {
                    casting.selected_subscribers.retain(|&x| x != id);
                    touched.push(casting.id);
                }
            }
            Ok(touched)
        })?;

        tracing::info!(
            subscriber_id = id,
            castings = touched.len(),
            "Subscriber deleted"
        );
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Deleted, id);
        for casting_id in touched {
            self.events
                .publish(EntityKind::Casting, ChangeAction::Updated, casting_id);
        }
        Ok(())
    }

    /// Mark the subscriber inactive as of `date`
    ///
    /// One-way: there is no path back to active.
    pub fn unsubscribe(&self, id: i64, date: NaiveDate) -> AppResult<Subscriber> {
        let updated = self.cell.mutate(|s| {
            let sub = s.subscriber_mut(id)?;
            if !sub.is_active() {
                return Err(AppError::missing(ErrorCode::SubscriberAlreadyInactive, id));
            }
            sub.status = SubscriberStatus::Inactive;
            sub.end_subscription_date = Some(date);
            Ok(sub.clone())
        });

        match &updated {
            Ok(_) => {
                tracing::info!(subscriber_id = id, end_date = %date, "Subscriber unsubscribed");
                self.events
                    .publish(EntityKind::Subscriber, ChangeAction::Updated, id);
            }
            Err(e) => tracing::warn!(subscriber_id = id, error = %e, "Unsubscribe rejected"),
        }
        updated
    }

    // ========== Tags ==========

    pub fn list_tags(&self) -> Vec<Tag> {
        self.cell.read(|s| s.tags.clone())
    }

    pub fn get_tag(&self, id: i64) -> Option<Tag> {
        self.cell.read(|s| s.tags.iter().find(|t| t.id == id).cloned())
    }

    pub fn add_tag(&self, data: TagCreate) -> AppResult<Tag> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.color, "color", MAX_SHORT_TEXT_LEN)?;

        let name = data.name.trim().to_string();
        let tag = self.cell.mutate(|s| {
            s.ensure_tag_name_free(&name, None)?;
            let tag = Tag {
                id: snowflake_id(),
                name,
                color: data.color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
            };
            s.tags.push(tag.clone());
            Ok(tag)
        })?;
        self.events.publish(EntityKind::Tag, ChangeAction::Created, tag.id);
        Ok(tag)
    }

    /// Update a tag and every subscriber's copy of it
    pub fn update_tag(&self, id: i64, data: TagUpdate) -> AppResult<Tag> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.color, "color", MAX_SHORT_TEXT_LEN)?;

        let tag = self.cell.mutate(|s| {
            if let Some(name) = &data.name {
                s.ensure_tag_name_free(name.trim(), Some(id))?;
            }
            let tag = s.tag_mut(id)?;
            if let Some(name) = data.name {
                tag.name = name.trim().to_string();
            }
            if let Some(color) = data.color {
                tag.color = color;
            }
            let tag = tag.clone();

            for sub in s.subscribers.iter_mut() {
                for held in sub.tags.iter_mut().filter(|t| t.id == id) {
                    *held = tag.clone();
                }
            }
            Ok(tag)
        })?;
        self.events.publish(EntityKind::Tag, ChangeAction::Updated, id);
        Ok(tag)
    }

    /// Delete a tag and strip it from every subscriber
    pub fn delete_tag(&self, id: i64) -> AppResult<()> {
        self.cell.mutate(|s| {
            let idx = s
                .tags
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| AppError::missing(ErrorCode::TagNotFound, id))?;
            s.tags.remove(idx);
            for sub in s.subscribers.iter_mut() {
                sub.tags.retain(|t| t.id != id);
            }
            Ok(())
        })?;
        self.events.publish(EntityKind::Tag, ChangeAction::Deleted, id);
        Ok(())
    }

    /// Attach a store tag to a subscriber (no-op when already held)
    pub fn assign_tag(&self, subscriber_id: i64, tag_id: i64) -> AppResult<Subscriber> {
        let updated = self.cell.mutate(|s| {
            let tag = s.tag_mut(tag_id)?.clone();
            let sub = s.subscriber_mut(subscriber_id)?;
            if !sub.has_tag(tag_id) {
                sub.tags.push(tag);
            }
            Ok(sub.clone())
        })?;
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Updated, subscriber_id);
        Ok(updated)
    }

    pub fn unassign_tag(&self, subscriber_id: i64, tag_id: i64) -> AppResult<Subscriber> {
        let updated = self.cell.mutate(|s| {
            let sub = s.subscriber_mut(subscriber_id)?;
            sub.tags.retain(|t| t.id != tag_id);
            Ok(sub.clone())
        })?;
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Updated, subscriber_id);
        Ok(updated)
    }

    // ========== Recovery notes ==========

    /// Prepend a recovery note; only inactive subscribers take notes
    pub fn add_recovery_note(&self, subscriber_id: i64, content: &str) -> AppResult<RecoveryNote> {
        validate_required_text(content, "content", MAX_NOTE_LEN)?;

        let note = self.cell.mutate(|s| {
            let sub = s.subscriber_mut(subscriber_id)?;
            if sub.is_active() {
                return Err(AppError::missing(
                    ErrorCode::SubscriberStillActive,
                    subscriber_id,
                ));
            }
            let note = RecoveryNote {
                id: snowflake_id(),
                content: content.trim().to_string(),
                created_at: now_millis(),
            };
            sub.recovery_notes.insert(0, note.clone());
            Ok(note)
        })?;
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Updated, subscriber_id);
        Ok(note)
    }

    pub fn update_recovery_note(
        &self,
        subscriber_id: i64,
        note_id: i64,
        content: &str,
    ) -> AppResult<RecoveryNote> {
        validate_required_text(content, "content", MAX_NOTE_LEN)?;

        let note = self.cell.mutate(|s| {
            let sub = s.subscriber_mut(subscriber_id)?;
            let note = sub
                .recovery_notes
                .iter_mut()
                .find(|n| n.id == note_id)
                .ok_or_else(|| AppError::missing(ErrorCode::RecoveryNoteNotFound, note_id))?;
            note.content = content.trim().to_string();
            Ok(note.clone())
        })?;
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Updated, subscriber_id);
        Ok(note)
    }

    pub fn delete_recovery_note(&self, subscriber_id: i64, note_id: i64) -> AppResult<()> {
        self.cell.mutate(|s| {
            let sub = s.subscriber_mut(subscriber_id)?;
            let before = sub.recovery_notes.len();
            sub.recovery_notes.retain(|n| n.id != note_id);
            if sub.recovery_notes.len() == before {
                return Err(AppError::missing(ErrorCode::RecoveryNoteNotFound, note_id));
            }
            Ok(())
        })?;
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Updated, subscriber_id);
        Ok(())
    }

    // ========== Attachments ==========

    pub fn add_attachment(
        &self,
        subscriber_id: i64,
        data: AttachmentCreate,
    ) -> AppResult<Attachment> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.mime_type, "mime_type", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&data.url, "url", MAX_URL_LEN)?;

        let attachment = self.cell.mutate(|s| {
            let sub = s.subscriber_mut(subscriber_id)?;
            let attachment = Attachment {
                id: snowflake_id(),
                name: data.name,
                mime_type: data.mime_type,
                url: data.url,
                size: data.size,
                created_at: now_millis(),
            };
            sub.attachments.push(attachment.clone());
            Ok(attachment)
        })?;
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Updated, subscriber_id);
        Ok(attachment)
    }

    pub fn delete_attachment(&self, subscriber_id: i64, attachment_id: i64) -> AppResult<()> {
        self.cell.mutate(|s| {
            let sub = s.subscriber_mut(subscriber_id)?;
            let before = sub.attachments.len();
            sub.attachments.retain(|a| a.id != attachment_id);
            if sub.attachments.len() == before {
                return Err(AppError::missing(
                    ErrorCode::AttachmentNotFound,
                    attachment_id,
                ));
            }
            Ok(())
        })?;
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Updated, subscriber_id);
        Ok(())
    }

    // ========== Castings ==========

    pub fn list_castings(&self) -> Vec<Casting> {
        self.cell.read(|s| s.castings.clone())
    }

    pub fn get_casting(&self, id: i64) -> Option<Casting> {
        self.cell
            .read(|s| s.castings.iter().find(|c| c.id == id).cloned())
    }

    /// Castings a subscriber is selected for
    pub fn castings_for_subscriber(&self, subscriber_id: i64) -> Vec<Casting> {
        self.cell.read(|s| {
            s.castings
                .iter()
                .filter(|c| c.has_subscriber(subscriber_id))
                .cloned()
                .collect()
        })
    }

    pub fn add_casting(&self, data: CastingCreate) -> AppResult<Casting> {
        validate_required_text(&data.theme, "theme", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        validate_casting_dates(
            data.opening_date,
            data.closing_date,
            data.recording_date,
            data.posting_date,
        )?;

        let casting = Casting {
            id: snowflake_id(),
            theme: data.theme.trim().to_string(),
            description: data.description,
            number_of_people: data.number_of_people,
            opening_date: data.opening_date,
            closing_date: data.closing_date,
            recording_date: data.recording_date,
            posting_date: data.posting_date,
            selected_subscribers: Vec::new(),
            created_at: now_millis(),
        };
        let created = self.cell.mutate(|s| {
            s.castings.push(casting.clone());
            Ok(casting)
        })?;
        tracing::info!(casting_id = created.id, theme = %created.theme, "Casting created");
        self.events
            .publish(EntityKind::Casting, ChangeAction::Created, created.id);
        Ok(created)
    }

    pub fn update_casting(&self, id: i64, data: CastingUpdate) -> AppResult<Casting> {
        if let Some(theme) = &data.theme {
            validate_required_text(theme, "theme", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;

        let updated = self.cell.mutate(|s| {
            let casting = s.casting_mut(id)?;
            if let Some(theme) = data.theme {
                casting.theme = theme.trim().to_string();
            }
            if data.description.is_some() {
                casting.description = data.description;
            }
            if let Some(n) = data.number_of_people {
                casting.number_of_people = n;
            }
            if let Some(d) = data.opening_date {
                casting.opening_date = d;
            }
            if let Some(d) = data.closing_date {
                casting.closing_date = d;
            }
            if let Some(d) = data.recording_date {
                casting.recording_date = d;
            }
            if let Some(d) = data.posting_date {
                casting.posting_date = d;
            }
            validate_casting_dates(
                casting.opening_date,
                casting.closing_date,
                casting.recording_date,
                casting.posting_date,
            )?;
            Ok(casting.clone())
        })?;
        self.events
            .publish(EntityKind::Casting, ChangeAction::Updated, id);
        Ok(updated)
    }

    /// Hard delete; the casting is removed from every subscriber's participations
    ///
    /// Project links live in the sales store, so the public path is
    /// `Dashboard::delete_casting`.
    pub(crate) fn delete_casting(&self, id: i64) -> AppResult<()> {
        self.cell.mutate(|s| {
            let idx = s
                .castings
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| AppError::missing(ErrorCode::CastingNotFound, id))?;
            s.castings.remove(idx);
            for sub in s.subscribers.iter_mut() {
                sub.casting_participations.retain(|&c| c != id);
            }
            Ok(())
        })?;
        tracing::info!(casting_id = id, "Casting deleted");
        self.events
            .publish(EntityKind::Casting, ChangeAction::Deleted, id);
        Ok(())
    }

    /// Select a subscriber for a casting, updating both sides together
    ///
    /// The subscriber must be active and interested in casting. Selecting an
    /// already selected subscriber is a no-op.
    pub fn add_subscriber_to_casting(
        &self,
        casting_id: i64,
        subscriber_id: i64,
    ) -> AppResult<Casting> {
        let result = self.cell.mutate(|s| {
            let sub = s.subscriber_mut(subscriber_id)?;
            if !sub.is_active() {
                return Err(AppError::missing(
                    ErrorCode::SubscriberInactive,
                    subscriber_id,
                ));
            }
            if !sub.interested_in_casting {
                return Err(AppError::missing(
                    ErrorCode::CastingNotInterested,
                    subscriber_id,
                ));
            }
            if !sub.casting_participations.contains(&casting_id) {
                sub.casting_participations.push(casting_id);
            }

            let casting = s.casting_mut(casting_id)?;
            if !casting.has_subscriber(subscriber_id) {
                casting.selected_subscribers.push(subscriber_id);
            }
            Ok(casting.clone())
        });

        match &result {
            Ok(_) => {
                tracing::info!(casting_id, subscriber_id, "Subscriber added to casting");
                self.publish_link(casting_id, subscriber_id);
            }
            Err(e) => tracing::warn!(
                casting_id,
                subscriber_id,
                error = %e,
                "Casting selection rejected"
            ),
        }
        result
    }

    /// Deselect a subscriber, updating both sides together
    pub fn remove_subscriber_from_casting(
        &self,
        casting_id: i64,
        subscriber_id: i64,
    ) -> AppResult<Casting> {
        let casting = self.cell.mutate(|s| {
            let sub = s.subscriber_mut(subscriber_id)?;
            sub.casting_participations.retain(|&c| c != casting_id);

            let casting = s.casting_mut(casting_id)?;
            casting.selected_subscribers.retain(|&x| x != subscriber_id);
            Ok(casting.clone())
        })?;
        tracing::info!(casting_id, subscriber_id, "Subscriber removed from casting");
        self.publish_link(casting_id, subscriber_id);
        Ok(casting)
    }

    fn publish_link(&self, casting_id: i64, subscriber_id: i64) {
        self.events
            .publish(EntityKind::Casting, ChangeAction::Updated, casting_id);
        self.events
            .publish(EntityKind::Subscriber, ChangeAction::Updated, subscriber_id);
    }
}
