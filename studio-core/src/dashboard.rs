//! Dashboard facade
//!
//! Wires the stores and the sale notifier together and hosts the operations
//! that span more than one store: casting creation with its project, cascade
//! deletes across the link table, the bot order intake, and the sale send.

use crate::core::Config;
use crate::metrics::{
    self, SalesTotals, SubscriberStats, applied_promotion, discounted_price,
};
use crate::notify::{SaleNotice, SaleNotifier, WebhookNotifier};
use crate::storage::SnapshotStorage;
use crate::stores::{ProjectStore, SalesStore, SubscriberStore};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{
    Casting, CastingCreate, Plan, Project, Promotion, Sale, SaleCreate, Subscriber,
};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Everything the subscriber detail view shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberDetail {
    pub subscriber: Subscriber,
    pub plan: Option<Plan>,
    pub applied_promotion: Option<Promotion>,
    /// Plan price after the applied promotion
    pub discounted_price: Option<Decimal>,
    pub sales: Vec<Sale>,
    pub castings: Vec<Casting>,
}

/// Everything the casting detail view shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastingDetail {
    pub casting: Casting,
    pub selected_subscribers: Vec<Subscriber>,
    pub associated_project_ids: Vec<i64>,
    /// Linked projects that still exist
    pub projects: Vec<Project>,
}

/// One row of the sales table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub sale: Sale,
    pub video_title: Option<String>,
    pub subscriber_name: Option<String>,
    pub total: Decimal,
}

/// Headline numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub subscribers: SubscriberStats,
    pub plan_distribution: BTreeMap<String, usize>,
    pub average_plan_duration: Option<f64>,
    pub sales: SalesTotals,
    pub active_promotions: usize,
    pub casting_candidates: usize,
}

pub struct Dashboard {
    subscribers: SubscriberStore,
    sales: SalesStore,
    projects: ProjectStore,
    notifier: Option<Arc<dyn SaleNotifier>>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("subscribers", &self.subscribers)
            .field("notifier", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(
        subscribers: SubscriberStore,
        sales: SalesStore,
        projects: ProjectStore,
        notifier: Option<Arc<dyn SaleNotifier>>,
    ) -> Self {
        Self {
            subscribers,
            sales,
            projects,
            notifier,
        }
    }

    /// Memory-only stores, no notifier
    pub fn in_memory() -> Self {
        Self::new(
            SubscriberStore::new(),
            SalesStore::new(),
            ProjectStore::new(),
            None,
        )
    }

    /// Build from configuration
    ///
    /// Opens the snapshot database under `work_dir` when `persist` is set and
    /// a webhook notifier when `sales_webhook_url` is set.
    pub fn open(config: &Config) -> AppResult<Self> {
        let (subscribers, sales, projects) = if config.persist {
            let path = config.database_path();
            let storage = SnapshotStorage::open(&path)?;
            tracing::info!(path = %path.display(), "Snapshot database opened");
            (
                SubscriberStore::open(storage.clone())?,
                SalesStore::open(storage.clone())?,
                ProjectStore::open(storage)?,
            )
        } else {
            (SubscriberStore::new(), SalesStore::new(), ProjectStore::new())
        };

        let notifier = match &config.sales_webhook_url {
            Some(url) => {
                let timeout = config.webhook_timeout_ms.map(Duration::from_millis);
                let notifier: Arc<dyn SaleNotifier> = Arc::new(WebhookNotifier::new(url, timeout)?);
                Some(notifier)
            }
            None => {
                tracing::warn!("SALES_WEBHOOK_URL not set, sale sending disabled");
                None
            }
        };

        Ok(Self::new(subscribers, sales, projects, notifier))
    }

    /// Replace the notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn SaleNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn subscribers(&self) -> &SubscriberStore {
        &self.subscribers
    }

    pub fn sales(&self) -> &SalesStore {
        &self.sales
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    // ========== Views ==========

    pub fn subscriber_detail(&self, id: i64, today: NaiveDate) -> AppResult<SubscriberDetail> {
        let subscriber = self
            .subscribers
            .get_subscriber(id)
            .ok_or_else(|| AppError::missing(ErrorCode::SubscriberNotFound, id))?;

        let plan = subscriber.plan_id.and_then(|pid| self.sales.get_plan(pid));
        let promotions = self.sales.list_promotions();
        let applied = applied_promotion(&subscriber, &promotions, today).cloned();
        let discounted = match (&plan, &applied) {
            (Some(plan), Some(promo)) => {
                Some(discounted_price(plan.price, promo.discount_percentage))
            }
            _ => None,
        };

        Ok(SubscriberDetail {
            plan,
            applied_promotion: applied,
            discounted_price: discounted,
            sales: self.sales.sales_for_subscriber(id),
            castings: self.subscribers.castings_for_subscriber(id),
            subscriber,
        })
    }

    pub fn casting_detail(&self, id: i64) -> AppResult<CastingDetail> {
        let casting = self
            .subscribers
            .get_casting(id)
            .ok_or_else(|| AppError::missing(ErrorCode::CastingNotFound, id))?;

        let selected_subscribers = casting
            .selected_subscribers
            .iter()
            .filter_map(|&sid| self.subscribers.get_subscriber(sid))
            .collect();
        let associated_project_ids = self.sales.projects_for_casting(id);
        let projects = associated_project_ids
            .iter()
            .filter_map(|&pid| self.projects.get_project(pid))
            .collect();

        Ok(CastingDetail {
            casting,
            selected_subscribers,
            associated_project_ids,
            projects,
        })
    }

    pub fn sale_lines(&self) -> Vec<SaleLine> {
        self.sales
            .list_sales()
            .into_iter()
            .map(|sale| SaleLine {
                video_title: self.sales.get_video(sale.video_id).map(|v| v.title),
                subscriber_name: self
                    .subscribers
                    .get_subscriber(sale.subscriber_id)
                    .map(|s| s.name),
                total: sale.total(),
                sale,
            })
            .collect()
    }

    pub fn overview(&self, today: NaiveDate) -> Overview {
        let subscribers = self.subscribers.list_subscribers();
        let plans = self.sales.list_plans();
        let sales = self.sales.list_sales();
        Overview {
            subscribers: metrics::subscriber_stats(&subscribers),
            plan_distribution: metrics::plan_distribution(&subscribers, &plans),
            average_plan_duration: metrics::average_plan_duration(&subscribers),
            sales: metrics::sales_totals(&sales),
            active_promotions: self.sales.active_promotions(today).len(),
            casting_candidates: subscribers
                .iter()
                .filter(|s| s.is_casting_candidate())
                .count(),
        }
    }

    // ========== Cross-store operations ==========

    /// Create a casting linked to an existing project
    ///
    /// A casting cannot be created without a project.
    pub fn create_casting(&self, data: CastingCreate, project_id: Option<i64>) -> AppResult<Casting> {
        let Some(project_id) = project_id else {
            tracing::warn!(theme = %data.theme, "Casting rejected: no project selected");
            return Err(AppError::new(ErrorCode::CastingProjectRequired));
        };
        if !self.projects.exists(project_id) {
            return Err(AppError::missing(ErrorCode::ProjectNotFound, project_id));
        }

        let casting = self.subscribers.add_casting(data)?;
        if let Err(e) = self
            .sales
            .associate_project_with_casting(casting.id, project_id)
        {
            // Undo so no casting is left without its project
            if let Err(undo) = self.subscribers.delete_casting(casting.id) {
                tracing::error!(casting_id = casting.id, error = %undo, "Failed to roll back casting");
            }
            return Err(e);
        }
        Ok(casting)
    }

    /// Delete a casting and its project links
    pub fn delete_casting(&self, id: i64) -> AppResult<()> {
        self.subscribers.delete_casting(id)?;
        self.sales.clear_casting_projects(id)
    }

    /// Link another existing project to a casting
    pub fn associate_project(&self, casting_id: i64, project_id: i64) -> AppResult<()> {
        if self.subscribers.get_casting(casting_id).is_none() {
            return Err(AppError::missing(ErrorCode::CastingNotFound, casting_id));
        }
        if !self.projects.exists(project_id) {
            return Err(AppError::missing(ErrorCode::ProjectNotFound, project_id));
        }
        self.sales
            .associate_project_with_casting(casting_id, project_id)
    }

    /// Delete a project and unlink it from every casting
    pub fn delete_project(&self, id: i64) -> AppResult<()> {
        self.projects.delete_project(id)?;
        let touched = self.sales.remove_project_everywhere(id)?;
        if !touched.is_empty() {
            tracing::info!(project_id = id, castings = touched.len(), "Project unlinked from castings");
        }
        Ok(())
    }

    /// Record a sale by hand for a known subscriber
    pub fn record_sale(&self, data: SaleCreate) -> AppResult<Sale> {
        if self.subscribers.get_subscriber(data.subscriber_id).is_none() {
            return Err(AppError::missing(
                ErrorCode::SubscriberNotFound,
                data.subscriber_id,
            ));
        }
        self.sales.add_sale(data)
    }

    /// Bot order intake: a subscriber orders a video at its list price
    pub fn telegram_order(
        &self,
        subscriber_id: i64,
        video_id: i64,
        quantity: Option<u32>,
    ) -> AppResult<Sale> {
        if self.subscribers.get_subscriber(subscriber_id).is_none() {
            return Err(AppError::missing(ErrorCode::SubscriberNotFound, subscriber_id));
        }
        let video = self
            .sales
            .get_video(video_id)
            .ok_or_else(|| AppError::missing(ErrorCode::VideoNotFound, video_id))?;

        self.sales.add_telegram_sale(SaleCreate {
            video_id,
            subscriber_id,
            quantity,
            price: video.price,
            payment_status: None,
            notes: None,
        })
    }

    /// Push a sale to the notification channel and stamp `sent_at`
    ///
    /// On failure the sale is left unsent so the caller can retry. Concurrent
    /// sends of the same sale are not de-duplicated.
    pub async fn send_sale(&self, sale_id: i64) -> AppResult<Sale> {
        let notifier = self
            .notifier
            .clone()
            .ok_or_else(|| AppError::new(ErrorCode::WebhookNotConfigured))?;
        let sale = self
            .sales
            .get_sale(sale_id)
            .ok_or_else(|| AppError::missing(ErrorCode::SaleNotFound, sale_id))?;

        let video_title = self
            .sales
            .get_video(sale.video_id)
            .map(|v| v.title)
            .unwrap_or_else(|| format!("Video #{}", sale.video_id));
        let subscriber_name = self
            .subscribers
            .get_subscriber(sale.subscriber_id)
            .map(|s| s.name)
            .unwrap_or_else(|| format!("Subscriber #{}", sale.subscriber_id));

        let notice = SaleNotice::for_sale(&sale, &video_title, &subscriber_name);
        if let Err(e) = notifier.notify(&notice).await {
            tracing::warn!(sale_id, error = %e, "Sale send failed, left unsent");
            return Err(e);
        }
        self.sales.mark_sent(sale_id, now_millis())
    }
}
