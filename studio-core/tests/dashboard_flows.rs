//! End-to-end dashboard flows against the public API

use axum::{Json, Router, extract::State, routing::post};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{
    CastingCreate, DeliveryStatus, PaymentStatus, PlanCreate, ProjectCreate, PromotionCreate,
    SaleCreate, SaleSource, SubscriberCreate, TagCreate, TagUpdate, VideoCreate,
};
use std::sync::Arc;
use studio_core::{Config, Dashboard, ErrorCode, SaleNotice, Studio, WebhookNotifier};
use tokio::sync::mpsc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn subscriber(dash: &Dashboard, name: &str, interested: bool, plan_id: Option<i64>) -> i64 {
    dash.subscribers()
        .add_subscriber(SubscriberCreate {
            name: name.to_string(),
            plan_id,
            plan_duration: Some(6),
            interested_in_casting: Some(interested),
            ..Default::default()
        })
        .unwrap()
        .id
}

fn video(dash: &Dashboard) -> i64 {
    dash.sales()
        .add_video(VideoCreate {
            title: "Studio tour".to_string(),
            price: Decimal::new(2500, 2),
            duration: 900,
            url: "https://cdn.example.com/v/tour".to_string(),
            ..Default::default()
        })
        .unwrap()
        .id
}

fn casting_with_project(dash: &Dashboard) -> i64 {
    let project = dash
        .projects()
        .add_project(ProjectCreate {
            name: "Winter special".to_string(),
            description: None,
        })
        .unwrap();
    dash.create_casting(
        CastingCreate {
            theme: "Snow".to_string(),
            description: Some("Outdoor shoot".to_string()),
            number_of_people: 3,
            opening_date: date(2026, 11, 1),
            closing_date: date(2026, 11, 15),
            recording_date: date(2026, 12, 1),
            posting_date: date(2026, 12, 20),
        },
        Some(project.id),
    )
    .unwrap()
    .id
}

#[test]
fn deleted_subscriber_leaves_no_casting_reference() {
    let dash = Dashboard::in_memory();
    let a = subscriber(&dash, "Ana", true, None);
    let b = subscriber(&dash, "Bea", true, None);
    let c = casting_with_project(&dash);
    dash.subscribers().add_subscriber_to_casting(c, a).unwrap();
    dash.subscribers().add_subscriber_to_casting(c, b).unwrap();

    dash.subscribers().delete_subscriber(a).unwrap();

    for casting in dash.subscribers().list_castings() {
        assert!(!casting.selected_subscribers.contains(&a));
    }
    let detail = dash.casting_detail(c).unwrap();
    assert_eq!(detail.selected_subscribers.len(), 1);
    assert_eq!(detail.selected_subscribers[0].id, b);
}

#[test]
fn add_then_remove_from_casting_clears_both_sides() {
    let dash = Dashboard::in_memory();
    let a = subscriber(&dash, "Ana", true, None);
    let c = casting_with_project(&dash);

    dash.subscribers().add_subscriber_to_casting(c, a).unwrap();
    dash.subscribers().remove_subscriber_from_casting(c, a).unwrap();

    assert!(dash.subscribers().get_casting(c).unwrap().selected_subscribers.is_empty());
    assert!(
        dash.subscribers()
            .get_subscriber(a)
            .unwrap()
            .casting_participations
            .is_empty()
    );
}

#[test]
fn sale_provenance_follows_entry_point() {
    let dash = Dashboard::in_memory();
    let sub = subscriber(&dash, "Ana", false, None);
    let v = video(&dash);

    let manual = dash
        .record_sale(SaleCreate {
            video_id: v,
            subscriber_id: sub,
            price: Decimal::new(2500, 2),
            ..Default::default()
        })
        .unwrap();
    let bot = dash.telegram_order(sub, v, None).unwrap();

    assert_eq!(manual.source, SaleSource::Manual);
    assert_eq!(bot.source, SaleSource::Telegram);
    assert_eq!(manual.quantity, 1);
    assert_eq!(bot.total(), Decimal::new(2500, 2));
}

#[test]
fn delivery_without_send_is_rejected_and_unchanged() {
    let dash = Dashboard::in_memory();
    let sub = subscriber(&dash, "Ana", false, None);
    let v = video(&dash);
    let sale = dash.telegram_order(sub, v, Some(2)).unwrap();
    assert_eq!(sale.payment_status, PaymentStatus::Pending);

    let err = dash
        .sales()
        .update_delivery_status(sale.id, DeliveryStatus::Delivered)
        .unwrap_err();
    assert_eq!(err.category(), studio_core::ErrorCategory::Sales);
    assert_eq!(
        dash.sales().get_sale(sale.id).unwrap().delivery_status,
        DeliveryStatus::Pending
    );
}

#[test]
fn tag_rename_reaches_every_subscriber() {
    let dash = Dashboard::in_memory();
    let subs: Vec<i64> = ["Ana", "Bea", "Cai"]
        .iter()
        .map(|n| subscriber(&dash, n, false, None))
        .collect();
    let tag = dash
        .subscribers()
        .add_tag(TagCreate {
            name: "early".to_string(),
            color: None,
        })
        .unwrap();
    for &id in &subs {
        dash.subscribers().assign_tag(id, tag.id).unwrap();
    }

    dash.subscribers()
        .update_tag(
            tag.id,
            TagUpdate {
                name: Some("founding".to_string()),
                color: Some("#10B981".to_string()),
            },
        )
        .unwrap();

    for sub in dash.subscribers().list_subscribers() {
        assert_eq!(sub.tags.len(), 1);
        assert_eq!(sub.tags[0].name, "founding");
        assert_eq!(sub.tags[0].color, "#10B981");
    }
}

#[test]
fn promotion_shows_on_subscriber_detail() {
    let dash = Dashboard::in_memory();
    let plan = dash
        .sales()
        .add_plan(PlanCreate {
            name: "Premium".to_string(),
            price: Decimal::new(4000, 2),
            duration: 3,
            ..Default::default()
        })
        .unwrap();
    let sub = subscriber(&dash, "Ana", false, Some(plan.id));
    let today = date(2026, 10, 19);
    dash.sales()
        .add_promotion(PromotionCreate {
            plan_id: plan.id,
            name: "Autumn".to_string(),
            discount_percentage: 20.0,
            start_date: date(2026, 10, 1),
            end_date: today.succ_opt().unwrap(),
            is_active: Some(true),
        })
        .unwrap();

    let detail = dash.subscriber_detail(sub, today).unwrap();
    let promo = detail.applied_promotion.unwrap();
    assert_eq!(promo.discount_percentage, 20.0);
    assert_eq!(detail.discounted_price, Some(Decimal::new(3200, 2)));

    let overview = dash.overview(today);
    assert_eq!(overview.plan_distribution["Premium"], 1);
    assert_eq!(overview.active_promotions, 1);
    assert_eq!(overview.average_plan_duration, Some(6.0));
}

#[test]
fn unsubscribed_member_takes_recovery_notes_only() {
    let dash = Dashboard::in_memory();
    let sub = subscriber(&dash, "Ana", true, None);
    assert_eq!(
        dash.subscribers()
            .add_recovery_note(sub, "offer a discount")
            .unwrap_err()
            .code,
        ErrorCode::SubscriberStillActive
    );

    dash.subscribers().unsubscribe(sub, date(2026, 10, 1)).unwrap();
    dash.subscribers()
        .add_recovery_note(sub, "offer a discount")
        .unwrap();

    let overview = dash.overview(date(2026, 10, 19));
    assert_eq!(overview.subscribers.inactive, 1);
    assert_eq!(overview.casting_candidates, 0);
}

async fn capture(
    State(tx): State<mpsc::UnboundedSender<SaleNotice>>,
    Json(body): Json<SaleNotice>,
) {
    let _ = tx.send(body);
}

#[tokio::test]
async fn send_then_deliver_over_webhook() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let app = Router::new().route("/sales", post(capture)).with_state(tx);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let notifier = WebhookNotifier::new(format!("http://{}/sales", addr), None).unwrap();
    let dash = Dashboard::in_memory().with_notifier(Arc::new(notifier));
    let sub = subscriber(&dash, "Ana", false, None);
    let v = video(&dash);
    let sale = dash.telegram_order(sub, v, Some(3)).unwrap();
    dash.sales()
        .update_payment_status(sale.id, PaymentStatus::Paid)
        .unwrap();

    let sent = dash.send_sale(sale.id).await.unwrap();
    assert!(sent.sent_at.is_some());

    let notice = rx.recv().await.unwrap();
    assert!(notice.message.contains("Studio tour"));
    assert!(notice.message.contains("Ana"));
    assert!(notice.message.contains("75.00"));

    let delivered = dash
        .sales()
        .update_delivery_status(sale.id, DeliveryStatus::Delivered)
        .unwrap();
    assert_eq!(delivered.delivery_status, DeliveryStatus::Delivered);
}

#[test]
fn stores_reload_from_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::with_overrides(dir.path().to_string_lossy(), None);
    config.persist = true;

    let (sub_id, casting_id) = {
        let dash = Dashboard::open(&config).unwrap();
        let sub = subscriber(&dash, "Ana", true, None);
        let casting = casting_with_project(&dash);
        dash.subscribers()
            .add_subscriber_to_casting(casting, sub)
            .unwrap();
        (sub, casting)
    };

    let dash = Dashboard::open(&config).unwrap();
    let sub = dash.subscribers().get_subscriber(sub_id).unwrap();
    assert_eq!(sub.casting_participations, vec![casting_id]);
    let detail = dash.casting_detail(casting_id).unwrap();
    assert_eq!(detail.projects.len(), 1);
    assert_eq!(detail.projects[0].name, "Winter special");
}

#[test]
fn studio_start_logs_to_dir_and_serves_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let mut config = Config::with_overrides(dir.path().to_string_lossy(), None);
    config.persist = true;
    config.log_dir = Some(log_dir.to_string_lossy().into_owned());

    let sub_id = {
        let studio = Studio::start(&config).unwrap();
        assert!(studio.logs_to_file());
        assert!(log_dir.is_dir());
        subscriber(studio.dashboard(), "Bea", false, None)
    };

    config.log_dir = None;
    let studio = Studio::start(&config).unwrap();
    assert!(!studio.logs_to_file());
    assert_eq!(
        studio.dashboard().subscribers().get_subscriber(sub_id).unwrap().name,
        "Bea"
    );
}

#[test]
fn persist_off_writes_nothing_to_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let work_dir = dir.path().join("work");
    let mut config = Config::with_overrides(work_dir.to_string_lossy(), None);
    config.persist = false;

    let dash = Dashboard::open(&config).unwrap();
    subscriber(&dash, "Cleo", false, None);
    assert!(!config.database_path().exists());

    let reopened = Dashboard::open(&config).unwrap();
    assert!(reopened.subscribers().list_subscribers().is_empty());
}
