//! Derived dashboard metrics
//!
//! Pure functions over store snapshots. Nothing here is cached; every call
//! recomputes from the slices it is given.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use shared::models::{PaymentStatus, Plan, Promotion, Sale, Subscriber};
use std::collections::BTreeMap;

/// Label for active subscribers without a plan
pub const NO_PLAN_LABEL: &str = "No plan";
/// Label for a `plan_id` that no longer resolves
pub const UNKNOWN_PLAN_LABEL: &str = "Unknown plan";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubscriberStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// 0-100, 0 when there are no subscribers
    pub active_percentage: f64,
    pub inactive_percentage: f64,
}

pub fn subscriber_stats(subscribers: &[Subscriber]) -> SubscriberStats {
    let total = subscribers.len();
    let active = subscribers.iter().filter(|s| s.is_active()).count();
    let inactive = total - active;
    let pct = |n: usize| {
        if total == 0 {
            0.0
        } else {
            n as f64 * 100.0 / total as f64
        }
    };
    SubscriberStats {
        total,
        active,
        inactive,
        active_percentage: pct(active),
        inactive_percentage: pct(inactive),
    }
}

/// Count of active subscribers per plan name
pub fn plan_distribution(subscribers: &[Subscriber], plans: &[Plan]) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for sub in subscribers.iter().filter(|s| s.is_active()) {
        let label = match sub.plan_id {
            None => NO_PLAN_LABEL.to_string(),
            Some(id) => plans
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| UNKNOWN_PLAN_LABEL.to_string()),
        };
        *out.entry(label).or_insert(0) += 1;
    }
    out
}

/// Mean `plan_duration` over active subscribers, `None` when there are none
pub fn average_plan_duration(subscribers: &[Subscriber]) -> Option<f64> {
    let durations: Vec<u32> = subscribers
        .iter()
        .filter(|s| s.is_active())
        .map(|s| s.plan_duration)
        .collect();
    if durations.is_empty() {
        return None;
    }
    let sum: u64 = durations.iter().map(|&d| u64::from(d)).sum();
    Some(sum as f64 / durations.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalesTotals {
    pub total: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
}

pub fn sales_totals(sales: &[Sale]) -> SalesTotals {
    sales.iter().fold(SalesTotals::default(), |mut acc, sale| {
        let amount = sale.total();
        acc.total += amount;
        match sale.payment_status {
            PaymentStatus::Paid => acc.paid += amount,
            PaymentStatus::Pending => acc.pending += amount,
            PaymentStatus::Failed | PaymentStatus::Refunded => {}
        }
        acc
    })
}

/// First applicable promotion on the subscriber's plan
///
/// Only active subscribers get a promotion.
pub fn applied_promotion<'a>(
    subscriber: &Subscriber,
    promotions: &'a [Promotion],
    today: NaiveDate,
) -> Option<&'a Promotion> {
    if !subscriber.is_active() {
        return None;
    }
    let plan_id = subscriber.plan_id?;
    promotions
        .iter()
        .find(|p| p.plan_id == plan_id && p.is_applicable(today))
}

/// `price` reduced by `percentage`, rounded to cents
pub fn discounted_price(price: Decimal, percentage: f64) -> Decimal {
    let pct = Decimal::from_f64(percentage.clamp(0.0, 100.0)).unwrap_or(Decimal::ZERO);
    let factor = Decimal::ONE - pct / Decimal::ONE_HUNDRED;
    (price * factor).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DeliveryStatus, SaleSource, SubscriberStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn subscriber(id: i64, active: bool, plan_id: Option<i64>, duration: u32) -> Subscriber {
        Subscriber {
            id,
            name: format!("sub-{id}"),
            email: None,
            phone: None,
            status: if active {
                SubscriberStatus::Active
            } else {
                SubscriberStatus::Inactive
            },
            plan_id,
            plan_duration: duration,
            start_subscription_date: date(2026, 1, 1),
            end_subscription_date: None,
            interested_in_casting: false,
            notes: None,
            tags: vec![],
            recovery_notes: vec![],
            attachments: vec![],
            casting_participations: vec![],
            created_at: 0,
        }
    }

    fn plan(id: i64, name: &str) -> Plan {
        Plan {
            id,
            name: name.to_string(),
            description: None,
            price: Decimal::new(3000, 2),
            duration: 1,
            features: vec![],
            is_active: true,
            created_at: 0,
        }
    }

    fn promotion(id: i64, plan_id: i64, pct: f64, end: NaiveDate, active: bool) -> Promotion {
        Promotion {
            id,
            plan_id,
            name: format!("promo-{id}"),
            discount_percentage: pct,
            start_date: date(2026, 1, 1),
            end_date: end,
            is_active: active,
            created_at: 0,
        }
    }

    fn sale(price: i64, quantity: u32, payment: PaymentStatus) -> Sale {
        Sale {
            id: 1,
            video_id: 1,
            subscriber_id: 1,
            quantity,
            price: Decimal::new(price, 2),
            payment_status: payment,
            delivery_status: DeliveryStatus::Pending,
            sent_at: None,
            source: SaleSource::Manual,
            notes: None,
            created_at: 0,
        }
    }

    #[test]
    fn stats_counts_and_percentages() {
        let subs = vec![
            subscriber(1, true, None, 1),
            subscriber(2, true, None, 1),
            subscriber(3, true, None, 1),
            subscriber(4, false, None, 1),
        ];
        let stats = subscriber_stats(&subs);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.active_percentage, 75.0);
        assert_eq!(stats.inactive_percentage, 25.0);

        let empty = subscriber_stats(&[]);
        assert_eq!(empty.active_percentage, 0.0);
    }

    #[test]
    fn distribution_resolves_plan_names() {
        let plans = vec![plan(1, "Premium"), plan(2, "Basic")];
        let subs = vec![
            subscriber(1, true, Some(1), 1),
            subscriber(2, true, Some(1), 1),
            subscriber(3, true, Some(2), 1),
            subscriber(4, true, None, 1),
            subscriber(5, true, Some(9), 1),
            subscriber(6, false, Some(2), 1),
        ];
        let dist = plan_distribution(&subs, &plans);
        assert_eq!(dist["Premium"], 2);
        assert_eq!(dist["Basic"], 1);
        assert_eq!(dist[NO_PLAN_LABEL], 1);
        assert_eq!(dist[UNKNOWN_PLAN_LABEL], 1);
    }

    #[test]
    fn average_duration_over_active_only() {
        let subs = vec![
            subscriber(1, true, None, 3),
            subscriber(2, true, None, 6),
            subscriber(3, false, None, 12),
        ];
        assert_eq!(average_plan_duration(&subs), Some(4.5));
        assert_eq!(average_plan_duration(&subs[2..]), None);
    }

    #[test]
    fn totals_split_by_payment() {
        let sales = vec![
            sale(1000, 2, PaymentStatus::Paid),
            sale(500, 0, PaymentStatus::Pending),
            sale(700, 1, PaymentStatus::Refunded),
        ];
        let totals = sales_totals(&sales);
        assert_eq!(totals.paid, Decimal::new(2000, 2));
        assert_eq!(totals.pending, Decimal::new(500, 2));
        assert_eq!(totals.total, Decimal::new(3200, 2));
    }

    #[test]
    fn applied_promotion_matches_plan_and_date() {
        let today = date(2026, 6, 1);
        let promos = vec![
            promotion(1, 2, 50.0, date(2026, 12, 31), true),
            promotion(2, 1, 10.0, date(2026, 5, 1), true),
            promotion(3, 1, 20.0, date(2026, 12, 31), true),
            promotion(4, 1, 30.0, date(2026, 12, 31), true),
        ];
        let sub = subscriber(1, true, Some(1), 1);
        assert_eq!(applied_promotion(&sub, &promos, today).unwrap().id, 3);

        let gone = subscriber(2, false, Some(1), 1);
        assert!(applied_promotion(&gone, &promos, today).is_none());
        let no_plan = subscriber(3, true, None, 1);
        assert!(applied_promotion(&no_plan, &promos, today).is_none());
    }

    #[test]
    fn discount_rounds_to_cents() {
        assert_eq!(
            discounted_price(Decimal::new(2999, 2), 20.0),
            Decimal::new(2399, 2)
        );
        assert_eq!(discounted_price(Decimal::new(1000, 2), 0.0), Decimal::new(1000, 2));
        assert_eq!(discounted_price(Decimal::new(1000, 2), 100.0), Decimal::ZERO);
    }
}
