//! Sales Store
//!
//! Plans, promotions, videos and sales, plus the casting ↔ project links.
//!
//! Sales can enter through two doors: [`SalesStore::add_sale`] (recorded by
//! hand) and [`SalesStore::add_telegram_sale`] (bot order). The payload has no
//! `source` field, so the door decides the provenance.

use super::StateCell;
use super::delivery::{check_delivery_transition, check_payment_transition};
use crate::events::{ChangeAction, EntityKind, EventBus, StoreEvent};
use crate::storage::SnapshotStorage;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_percentage,
    validate_price, validate_required_text,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::models::{
    DeliveryStatus, PaymentStatus, Plan, PlanCreate, PlanUpdate, Promotion, PromotionCreate,
    PromotionUpdate, Sale, SaleCreate, SaleSource, SaleUpdate, Video, VideoCreate, VideoUpdate,
};
use shared::util::{now_millis, snowflake_id};
use shared::{AppError, AppResult, ErrorCode};
use std::collections::BTreeMap;
use tokio::sync::broadcast;

const STORE_KEY: &str = "sales";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SalesState {
    plans: Vec<Plan>,
    promotions: Vec<Promotion>,
    videos: Vec<Video>,
    sales: Vec<Sale>,
    /// casting id -> associated project ids
    casting_projects: BTreeMap<i64, Vec<i64>>,
}

impl SalesState {
    fn plan_mut(&mut self, id: i64) -> AppResult<&mut Plan> {
        self.plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::missing(ErrorCode::PlanNotFound, id))
    }

    fn ensure_plan(&self, id: i64) -> AppResult<()> {
        if self.plans.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            Err(AppError::missing(ErrorCode::PlanNotFound, id))
        }
    }

    fn ensure_video(&self, id: i64) -> AppResult<()> {
        if self.videos.iter().any(|v| v.id == id) {
            Ok(())
        } else {
            Err(AppError::missing(ErrorCode::VideoNotFound, id))
        }
    }

    fn promotion_mut(&mut self, id: i64) -> AppResult<&mut Promotion> {
        self.promotions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::missing(ErrorCode::PromotionNotFound, id))
    }

    fn video_mut(&mut self, id: i64) -> AppResult<&mut Video> {
        self.videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| AppError::missing(ErrorCode::VideoNotFound, id))
    }

    fn sale_mut(&mut self, id: i64) -> AppResult<&mut Sale> {
        self.sales
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::missing(ErrorCode::SaleNotFound, id))
    }
}

fn validate_promotion_dates(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::field(
            "end_date",
            "end_date must not be before start_date",
        ));
    }
    Ok(())
}

/// Sales store
pub struct SalesStore {
    cell: StateCell<SalesState>,
    events: EventBus,
}

impl Default for SalesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SalesStore {
    pub fn new() -> Self {
        Self {
            cell: StateCell::in_memory(STORE_KEY),
            events: EventBus::new(),
        }
    }

    pub fn open(storage: SnapshotStorage) -> AppResult<Self> {
        Ok(Self {
            cell: StateCell::open(STORE_KEY, storage)?,
            events: EventBus::new(),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ========== Plans ==========

    pub fn list_plans(&self) -> Vec<Plan> {
        self.cell.read(|s| s.plans.clone())
    }

    pub fn get_plan(&self, id: i64) -> Option<Plan> {
        self.cell.read(|s| s.plans.iter().find(|p| p.id == id).cloned())
    }

    pub fn add_plan(&self, data: PlanCreate) -> AppResult<Plan> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        validate_price(data.price, "price")?;

        let plan = Plan {
            id: snowflake_id(),
            name: data.name.trim().to_string(),
            description: data.description,
            price: data.price,
            duration: data.duration,
            features: data.features,
            is_active: true,
            created_at: now_millis(),
        };
        let created = self.cell.mutate(|s| {
            s.plans.push(plan.clone());
            Ok(plan)
        })?;
        tracing::info!(plan_id = created.id, name = %created.name, "Plan created");
        self.events
            .publish(EntityKind::Plan, ChangeAction::Created, created.id);
        Ok(created)
    }

    pub fn update_plan(&self, id: i64, data: PlanUpdate) -> AppResult<Plan> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        if let Some(price) = data.price {
            validate_price(price, "price")?;
        }

        let updated = self.cell.mutate(|s| {
            let plan = s.plan_mut(id)?;
            if let Some(name) = data.name {
                plan.name = name.trim().to_string();
            }
            if data.description.is_some() {
                plan.description = data.description;
            }
            if let Some(price) = data.price {
                plan.price = price;
            }
            if let Some(duration) = data.duration {
                plan.duration = duration;
            }
            if let Some(features) = data.features {
                plan.features = features;
            }
            if let Some(active) = data.is_active {
                plan.is_active = active;
            }
            Ok(plan.clone())
        })?;
        self.events.publish(EntityKind::Plan, ChangeAction::Updated, id);
        Ok(updated)
    }

    /// Delete a plan together with its promotions
    ///
    /// Subscribers keep their `plan_id`; views resolve it as an unknown plan.
    pub fn delete_plan(&self, id: i64) -> AppResult<()> {
        let dropped = self.cell.mutate(|s| {
            s.ensure_plan(id)?;
            s.plans.retain(|p| p.id != id);
            let dropped: Vec<i64> = s
                .promotions
                .iter()
                .filter(|p| p.plan_id == id)
                .map(|p| p.id)
                .collect();
            s.promotions.retain(|p| p.plan_id != id);
            Ok(dropped)
        })?;
        tracing::info!(plan_id = id, promotions = dropped.len(), "Plan deleted");
        self.events.publish(EntityKind::Plan, ChangeAction::Deleted, id);
        for promotion_id in dropped {
            self.events
                .publish(EntityKind::Promotion, ChangeAction::Deleted, promotion_id);
        }
        Ok(())
    }

    // ========== Promotions ==========

    pub fn list_promotions(&self) -> Vec<Promotion> {
        self.cell.read(|s| s.promotions.clone())
    }

    pub fn get_promotion(&self, id: i64) -> Option<Promotion> {
        self.cell
            .read(|s| s.promotions.iter().find(|p| p.id == id).cloned())
    }

    /// Enabled promotions that have not expired on `today`, in insertion order
    pub fn active_promotions(&self, today: NaiveDate) -> Vec<Promotion> {
        self.cell.read(|s| {
            s.promotions
                .iter()
                .filter(|p| p.is_applicable(today))
                .cloned()
                .collect()
        })
    }

    pub fn add_promotion(&self, data: PromotionCreate) -> AppResult<Promotion> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_percentage(data.discount_percentage, "discount_percentage")?;
        validate_promotion_dates(data.start_date, data.end_date)?;

        let promotion = self.cell.mutate(|s| {
            s.ensure_plan(data.plan_id)?;
            let promotion = Promotion {
                id: snowflake_id(),
                plan_id: data.plan_id,
                name: data.name.trim().to_string(),
                discount_percentage: data.discount_percentage,
                start_date: data.start_date,
                end_date: data.end_date,
                is_active: data.is_active.unwrap_or(true),
                created_at: now_millis(),
            };
            s.promotions.push(promotion.clone());
            Ok(promotion)
        })?;
        tracing::info!(
            promotion_id = promotion.id,
            plan_id = promotion.plan_id,
            discount = promotion.discount_percentage,
            "Promotion created"
        );
        self.events
            .publish(EntityKind::Promotion, ChangeAction::Created, promotion.id);
        Ok(promotion)
    }

    pub fn update_promotion(&self, id: i64, data: PromotionUpdate) -> AppResult<Promotion> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        if let Some(pct) = data.discount_percentage {
            validate_percentage(pct, "discount_percentage")?;
        }

        let updated = self.cell.mutate(|s| {
            if let Some(plan_id) = data.plan_id {
                s.ensure_plan(plan_id)?;
            }
            let promo = s.promotion_mut(id)?;
            if let Some(plan_id) = data.plan_id {
                promo.plan_id = plan_id;
            }
            if let Some(name) = data.name {
                promo.name = name.trim().to_string();
            }
            if let Some(pct) = data.discount_percentage {
                promo.discount_percentage = pct;
            }
            if let Some(d) = data.start_date {
                promo.start_date = d;
            }
            if let Some(d) = data.end_date {
                promo.end_date = d;
            }
            if let Some(active) = data.is_active {
                promo.is_active = active;
            }
            validate_promotion_dates(promo.start_date, promo.end_date)?;
            Ok(promo.clone())
        })?;
        self.events
            .publish(EntityKind::Promotion, ChangeAction::Updated, id);
        Ok(updated)
    }

    pub fn delete_promotion(&self, id: i64) -> AppResult<()> {
        self.cell.mutate(|s| {
            s.promotion_mut(id)?;
            s.promotions.retain(|p| p.id != id);
            Ok(())
        })?;
        self.events
            .publish(EntityKind::Promotion, ChangeAction::Deleted, id);
        Ok(())
    }

    // ========== Videos ==========

    pub fn list_videos(&self) -> Vec<Video> {
        self.cell.read(|s| s.videos.clone())
    }

    pub fn get_video(&self, id: i64) -> Option<Video> {
        self.cell.read(|s| s.videos.iter().find(|v| v.id == id).cloned())
    }

    pub fn add_video(&self, data: VideoCreate) -> AppResult<Video> {
        validate_required_text(&data.title, "title", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        validate_required_text(&data.url, "url", MAX_URL_LEN)?;
        validate_price(data.price, "price")?;

        let video = Video {
            id: snowflake_id(),
            title: data.title.trim().to_string(),
            description: data.description,
            price: data.price,
            duration: data.duration,
            url: data.url,
            participants: data.participants,
            created_at: now_millis(),
        };
        let created = self.cell.mutate(|s| {
            s.videos.push(video.clone());
            Ok(video)
        })?;
        tracing::info!(video_id = created.id, title = %created.title, "Video created");
        self.events
            .publish(EntityKind::Video, ChangeAction::Created, created.id);
        Ok(created)
    }

    pub fn update_video(&self, id: i64, data: VideoUpdate) -> AppResult<Video> {
        if let Some(title) = &data.title {
            validate_required_text(title, "title", MAX_NAME_LEN)?;
        }
        if let Some(url) = &data.url {
            validate_required_text(url, "url", MAX_URL_LEN)?;
        }
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        if let Some(price) = data.price {
            validate_price(price, "price")?;
        }

        let updated = self.cell.mutate(|s| {
            let video = s.video_mut(id)?;
            if let Some(title) = data.title {
                video.title = title.trim().to_string();
            }
            if data.description.is_some() {
                video.description = data.description;
            }
            if let Some(price) = data.price {
                video.price = price;
            }
            if let Some(duration) = data.duration {
                video.duration = duration;
            }
            if let Some(url) = data.url {
                video.url = url;
            }
            if let Some(participants) = data.participants {
                video.participants = participants;
            }
            Ok(video.clone())
        })?;
        self.events.publish(EntityKind::Video, ChangeAction::Updated, id);
        Ok(updated)
    }

    /// Delete a video record; existing sales keep their `video_id`
    pub fn delete_video(&self, id: i64) -> AppResult<()> {
        self.cell.mutate(|s| {
            s.ensure_video(id)?;
            s.videos.retain(|v| v.id != id);
            Ok(())
        })?;
        self.events.publish(EntityKind::Video, ChangeAction::Deleted, id);
        Ok(())
    }

    // ========== Sales ==========

    pub fn list_sales(&self) -> Vec<Sale> {
        self.cell.read(|s| s.sales.clone())
    }

    pub fn get_sale(&self, id: i64) -> Option<Sale> {
        self.cell.read(|s| s.sales.iter().find(|x| x.id == id).cloned())
    }

    pub fn sales_for_subscriber(&self, subscriber_id: i64) -> Vec<Sale> {
        self.cell.read(|s| {
            s.sales
                .iter()
                .filter(|x| x.subscriber_id == subscriber_id)
                .cloned()
                .collect()
        })
    }

    /// Record a sale by hand (`source = manual`)
    pub fn add_sale(&self, data: SaleCreate) -> AppResult<Sale> {
        self.insert_sale(data, SaleSource::Manual)
    }

    /// Record a bot order (`source = telegram`)
    pub fn add_telegram_sale(&self, data: SaleCreate) -> AppResult<Sale> {
        self.insert_sale(data, SaleSource::Telegram)
    }

    fn insert_sale(&self, data: SaleCreate, source: SaleSource) -> AppResult<Sale> {
        validate_price(data.price, "price")?;
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;

        let sale = self.cell.mutate(|s| {
            s.ensure_video(data.video_id)?;
            let sale = Sale {
                id: snowflake_id(),
                video_id: data.video_id,
                subscriber_id: data.subscriber_id,
                quantity: data.quantity.unwrap_or(1).max(1),
                price: data.price,
                payment_status: data.payment_status.unwrap_or_default(),
                delivery_status: DeliveryStatus::Pending,
                sent_at: None,
                source,
                notes: data.notes,
                created_at: now_millis(),
            };
            s.sales.push(sale.clone());
            Ok(sale)
        })?;
        tracing::info!(
            sale_id = sale.id,
            video_id = sale.video_id,
            subscriber_id = sale.subscriber_id,
            source = ?sale.source,
            total = %sale.total(),
            "Sale recorded"
        );
        self.events
            .publish(EntityKind::Sale, ChangeAction::Created, sale.id);
        Ok(sale)
    }

    /// Partial replace of the editable fields
    pub fn update_sale(&self, id: i64, data: SaleUpdate) -> AppResult<Sale> {
        if let Some(price) = data.price {
            validate_price(price, "price")?;
        }
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;

        let updated = self.cell.mutate(|s| {
            if let Some(video_id) = data.video_id {
                s.ensure_video(video_id)?;
            }
            let sale = s.sale_mut(id)?;
            if let Some(video_id) = data.video_id {
                sale.video_id = video_id;
            }
            if let Some(subscriber_id) = data.subscriber_id {
                sale.subscriber_id = subscriber_id;
            }
            if let Some(quantity) = data.quantity {
                sale.quantity = quantity.max(1);
            }
            if let Some(price) = data.price {
                sale.price = price;
            }
            if data.notes.is_some() {
                sale.notes = data.notes;
            }
            Ok(sale.clone())
        })?;
        self.events.publish(EntityKind::Sale, ChangeAction::Updated, id);
        Ok(updated)
    }

    pub fn delete_sale(&self, id: i64) -> AppResult<()> {
        self.cell.mutate(|s| {
            s.sale_mut(id)?;
            s.sales.retain(|x| x.id != id);
            Ok(())
        })?;
        tracing::info!(sale_id = id, "Sale deleted");
        self.events.publish(EntityKind::Sale, ChangeAction::Deleted, id);
        Ok(())
    }

    pub fn update_payment_status(&self, id: i64, next: PaymentStatus) -> AppResult<Sale> {
        let result = self.cell.mutate(|s| {
            let sale = s.sale_mut(id)?;
            check_payment_transition(sale, next)?;
            sale.payment_status = next;
            Ok(sale.clone())
        });
        self.log_transition(id, "payment", next.as_str(), &result);
        result
    }

    /// Move the delivery track; `delivered` requires a paid and sent sale
    pub fn update_delivery_status(&self, id: i64, next: DeliveryStatus) -> AppResult<Sale> {
        let result = self.cell.mutate(|s| {
            let sale = s.sale_mut(id)?;
            check_delivery_transition(sale, next)?;
            sale.delivery_status = next;
            Ok(sale.clone())
        });
        self.log_transition(id, "delivery", next.as_str(), &result);
        result
    }

    /// Stamp the last time the sale was pushed out
    pub fn mark_sent(&self, id: i64, at: i64) -> AppResult<Sale> {
        let sale = self.cell.mutate(|s| {
            let sale = s.sale_mut(id)?;
            sale.sent_at = Some(at);
            Ok(sale.clone())
        })?;
        tracing::info!(sale_id = id, sent_at = at, "Sale marked as sent");
        self.events.publish(EntityKind::Sale, ChangeAction::Updated, id);
        Ok(sale)
    }

    fn log_transition(&self, id: i64, track: &str, to: &str, result: &AppResult<Sale>) {
        match result {
            Ok(_) => {
                tracing::info!(sale_id = id, track, to, "Sale status changed");
                self.events.publish(EntityKind::Sale, ChangeAction::Updated, id);
            }
            Err(e) => {
                tracing::warn!(sale_id = id, track, to, code = %e.code, error = %e, "Sale status change rejected")
            }
        }
    }

    // ========== Casting ↔ project links ==========

    pub fn projects_for_casting(&self, casting_id: i64) -> Vec<i64> {
        self.cell
            .read(|s| s.casting_projects.get(&casting_id).cloned().unwrap_or_default())
    }

    /// Link a project to a casting (no-op when already linked)
    pub fn associate_project_with_casting(&self, casting_id: i64, project_id: i64) -> AppResult<()> {
        let added = self.cell.mutate(|s| {
            let links = s.casting_projects.entry(casting_id).or_default();
            if links.contains(&project_id) {
                return Ok(false);
            }
            links.push(project_id);
            Ok(true)
        })?;
        if added {
            tracing::debug!(casting_id, project_id, "Project linked to casting");
            self.events
                .publish(EntityKind::Casting, ChangeAction::Updated, casting_id);
        }
        Ok(())
    }

    /// Unlink a project from a casting (no-op when not linked)
    pub fn remove_project_from_casting(&self, casting_id: i64, project_id: i64) -> AppResult<()> {
        let removed = self.cell.mutate(|s| {
            let Some(links) = s.casting_projects.get_mut(&casting_id) else {
                return Ok(false);
            };
            let before = links.len();
            links.retain(|&p| p != project_id);
            let removed = links.len() != before;
            if links.is_empty() {
                s.casting_projects.remove(&casting_id);
            }
            Ok(removed)
        })?;
        if removed {
            self.events
                .publish(EntityKind::Casting, ChangeAction::Updated, casting_id);
        }
        Ok(())
    }

    /// Drop every link of a deleted casting
    pub fn clear_casting_projects(&self, casting_id: i64) -> AppResult<()> {
        self.cell.mutate(|s| {
            s.casting_projects.remove(&casting_id);
            Ok(())
        })
    }

    /// Drop a deleted project from every casting; returns the touched castings
    pub fn remove_project_everywhere(&self, project_id: i64) -> AppResult<Vec<i64>> {
        let touched = self.cell.mutate(|s| {
            let mut touched = Vec::new();
            for (casting_id, links) in s.casting_projects.iter_mut() {
                if links.contains(&project_id) {
                    links.retain(|&p| p != project_id);
                    touched.push(*casting_id);
                }
            }
            s.casting_projects.retain(|_, links| !links.is_empty());
            Ok(touched)
        })?;
        for casting_id in &touched {
            self.events
                .publish(EntityKind::Casting, ChangeAction::Updated, *casting_id);
        }
        Ok(touched)
    }
}
