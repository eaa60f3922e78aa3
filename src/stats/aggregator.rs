//! Aggregator Module
//! Derives the dashboard's tabular views from a filtered slice of orders.

use crate::data::OrderRecord;
use chrono::{Datelike, Month, NaiveDate};
use log::{debug, warn};
use serde::Serialize;
use statrs::statistics::{Data, Median, Statistics};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

/// Default number of rows in the top-categories view.
pub const DEFAULT_TOP_N: usize = 10;

/// One calendar day of approved orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOrdersView {
    pub date: NaiveDate,
    pub order_count: usize,
    pub revenue: f64,
}

/// One calendar month of shipping activity.
///
/// `monthly_transaction_counts` fills only the count; `monthly_means` fills
/// the count and both means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucketView {
    pub month: u32,
    pub label: &'static str,
    pub transaction_count: usize,
    pub mean_payment_value: Option<f64>,
    pub mean_review_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Best-selling categories, highest count first.
pub type TopCategoryView = Vec<CategoryCount>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewScoreBin {
    pub score: u8,
    pub count: usize,
}

/// Headline numbers for the selected range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub rows: usize,
    pub distinct_orders: usize,
    pub total_revenue: f64,
    pub mean_payment_value: Option<f64>,
    pub median_payment_value: Option<f64>,
    pub mean_review_score: Option<f64>,
}

impl Default for OrderSummary {
    fn default() -> Self {
        Self {
            rows: 0,
            distinct_orders: 0,
            total_revenue: 0.0,
            mean_payment_value: None,
            median_payment_value: None,
            mean_review_score: None,
        }
    }
}

/// Every derived view for one filter state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardViews {
    pub daily_orders: Vec<DailyOrdersView>,
    pub monthly_transactions: Vec<MonthlyBucketView>,
    pub top_categories: TopCategoryView,
    pub monthly_means: Vec<MonthlyBucketView>,
    pub review_scores: Vec<ReviewScoreBin>,
    pub summary: OrderSummary,
}

impl DashboardViews {
    /// True when the filtered input had no rows at all.
    pub fn is_empty(&self) -> bool {
        self.summary.rows == 0
    }
}

/// Full English name of a month number.
pub fn month_label(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().mean())
    }
}

/// Computes the dashboard views. Every function accepts empty input and
/// returns an empty view for it.
pub struct Aggregator;

impl Aggregator {
    /// Distinct orders and revenue per approval day. Days without orders are
    /// not emitted.
    pub fn daily_orders(records: &[OrderRecord]) -> Vec<DailyOrdersView> {
        let mut days: BTreeMap<NaiveDate, (HashSet<&str>, f64)> = BTreeMap::new();
        for record in records {
            let Some(date) = record.approved_date() else {
                continue;
            };
            let (ids, revenue) = days.entry(date).or_default();
            ids.extend(record.order_id.as_deref());
            *revenue += record.payment_value.unwrap_or(0.0);
        }

        days.into_iter()
            .map(|(date, (ids, revenue))| DailyOrdersView {
                date,
                order_count: ids.len(),
                revenue,
            })
            .collect()
    }

    /// Rows per shipping-limit month, in calendar order.
    pub fn monthly_transaction_counts(records: &[OrderRecord]) -> Vec<MonthlyBucketView> {
        let mut months: BTreeMap<u32, usize> = BTreeMap::new();
        for ts in records.iter().filter_map(|r| r.shipping_limit_date) {
            *months.entry(ts.month()).or_default() += 1;
        }

        months
            .into_iter()
            .map(|(month, count)| MonthlyBucketView {
                month,
                label: month_label(month),
                transaction_count: count,
                mean_payment_value: None,
                mean_review_score: None,
            })
            .collect()
    }

    /// The `n` most frequent categories. Equal counts are ordered by name.
    pub fn top_categories(records: &[OrderRecord], n: usize) -> TopCategoryView {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for category in records.iter().filter_map(|r| r.product_category_name.as_deref()) {
            *counts.entry(category).or_default() += 1;
        }

        let mut ranked: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        ranked.truncate(n);
        ranked
    }

    /// Mean payment and mean review score per shipping-limit month.
    pub fn monthly_means(records: &[OrderRecord]) -> Vec<MonthlyBucketView> {
        let mut months: BTreeMap<u32, (usize, Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for record in records {
            let Some(ts) = record.shipping_limit_date else {
                continue;
            };
            let (count, payments, reviews) = months.entry(ts.month()).or_default();
            *count += 1;
            payments.extend(record.payment_value);
            reviews.extend(record.review_score);
        }

        months
            .into_iter()
            .map(|(month, (count, payments, reviews))| MonthlyBucketView {
                month,
                label: month_label(month),
                transaction_count: count,
                mean_payment_value: mean(&payments),
                mean_review_score: mean(&reviews),
            })
            .collect()
    }

    /// Histogram of review scores over the five integer ratings.
    pub fn review_score_distribution(records: &[OrderRecord]) -> Vec<ReviewScoreBin> {
        if records.is_empty() {
            return Vec::new();
        }

        let mut bins: Vec<ReviewScoreBin> = (1..=5u8)
            .map(|score| ReviewScoreBin { score, count: 0 })
            .collect();
        for score in records.iter().filter_map(|r| r.review_score) {
            let rounded = score.round();
            if (1.0..=5.0).contains(&rounded) {
                bins[rounded as usize - 1].count += 1;
            }
        }
        bins
    }

    pub fn summarize(records: &[OrderRecord]) -> OrderSummary {
        if records.is_empty() {
            return OrderSummary::default();
        }

        let payments: Vec<f64> = records.iter().filter_map(|r| r.payment_value).collect();
        let reviews: Vec<f64> = records.iter().filter_map(|r| r.review_score).collect();
        let distinct_orders = records
            .iter()
            .filter_map(|r| r.order_id.as_deref())
            .collect::<HashSet<_>>()
            .len();

        OrderSummary {
            rows: records.len(),
            distinct_orders,
            total_revenue: payments.iter().sum(),
            mean_payment_value: mean(&payments),
            median_payment_value: (!payments.is_empty())
                .then(|| Data::new(payments.clone()).median()),
            mean_review_score: mean(&reviews),
        }
    }

    /// Compute every view, running the independent aggregations on the rayon pool.
    pub fn compute_all(records: &[OrderRecord], top_n: usize) -> DashboardViews {
        let started = Instant::now();

        let ((daily_orders, monthly_transactions), (top_and_means, scores_and_summary)) =
            rayon::join(
                || {
                    rayon::join(
                        || Self::daily_orders(records),
                        || Self::monthly_transaction_counts(records),
                    )
                },
                || {
                    rayon::join(
                        || {
                            rayon::join(
                                || Self::top_categories(records, top_n),
                                || Self::monthly_means(records),
                            )
                        },
                        || {
                            rayon::join(
                                || Self::review_score_distribution(records),
                                || Self::summarize(records),
                            )
                        },
                    )
                },
            );
        let (top_categories, monthly_means) = top_and_means;
        let (review_scores, summary) = scores_and_summary;

        if records.is_empty() {
            warn!("Aggregation input is empty; all views are empty");
        }
        debug!(
            "Computed dashboard views for {} rows in {:?}",
            records.len(),
            started.elapsed()
        );

        DashboardViews {
            daily_orders,
            monthly_transactions,
            top_categories,
            monthly_means,
            review_scores,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn order(id: &str, approved: &str, category: Option<&str>, payment: f64) -> OrderRecord {
        let mut record = OrderRecord::new(id);
        record.order_approved_at = Some(ts(approved));
        record.shipping_limit_date = Some(ts(approved));
        record.product_category_name = category.map(str::to_string);
        record.payment_value = Some(payment);
        record
    }

    fn with_review(mut record: OrderRecord, score: f64) -> OrderRecord {
        record.review_score = Some(score);
        record
    }

    #[test]
    fn test_every_view_is_empty_on_empty_input() {
        let empty: &[OrderRecord] = &[];
        assert!(Aggregator::daily_orders(empty).is_empty());
        assert!(Aggregator::monthly_transaction_counts(empty).is_empty());
        assert!(Aggregator::top_categories(empty, DEFAULT_TOP_N).is_empty());
        assert!(Aggregator::monthly_means(empty).is_empty());
        assert!(Aggregator::review_score_distribution(empty).is_empty());
        assert_eq!(Aggregator::summarize(empty), OrderSummary::default());

        let views = Aggregator::compute_all(empty, DEFAULT_TOP_N);
        assert!(views.is_empty());
        assert_eq!(views, DashboardViews::default());
    }

    #[test]
    fn test_daily_orders_single_day() {
        // one order split across two payment rows
        let records = vec![
            order("o1", "2018-01-05 08:00:00", Some("toys"), 10.25),
            order("o1", "2018-01-05 08:00:00", Some("toys"), 0.1),
            order("o2", "2018-01-05 09:30:00", Some("toys"), 0.2),
            order("o3", "2018-01-05 23:59:59", None, 1e6),
        ];
        let daily = Aggregator::daily_orders(&records);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2018, 1, 5).unwrap());
        assert_eq!(daily[0].order_count, 3);
        assert!((daily[0].revenue - (10.25 + 0.1 + 0.2 + 1e6)).abs() < 1e-9);
    }

    #[test]
    fn test_daily_orders_does_not_fill_gaps() {
        let records = vec![
            order("a", "2018-01-01 10:00:00", None, 5.0),
            order("b", "2018-01-04 10:00:00", None, 7.0),
        ];
        let dates: Vec<_> = Aggregator::daily_orders(&records)
            .into_iter()
            .map(|d| d.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2018-01-01", "2018-01-04"]);
    }

    #[test]
    fn test_daily_orders_counts_missing_payment_as_zero() {
        let mut record = order("a", "2018-01-01 10:00:00", None, 0.0);
        record.payment_value = None;
        let daily = Aggregator::daily_orders(&[record]);
        assert_eq!(daily[0].order_count, 1);
        assert_eq!(daily[0].revenue, 0.0);
    }

    #[test]
    fn test_blank_order_ids_are_not_counted() {
        let mut blank = order("", "2018-01-05 10:00:00", None, 4.0);
        blank.order_id = None;
        let mut blank_twin = blank.clone();
        blank_twin.payment_value = Some(6.0);
        let records = vec![order("c1", "2018-01-05 09:00:00", None, 10.0), blank, blank_twin];

        let daily = Aggregator::daily_orders(&records);
        assert_eq!(daily[0].order_count, 1);
        assert!((daily[0].revenue - 20.0).abs() < 1e-9);

        let summary = Aggregator::summarize(&records);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.distinct_orders, 1);
    }

    #[test]
    fn test_monthly_transaction_counts_ordered_by_month() {
        let mut unshipped = order("x", "2018-05-01 10:00:00", None, 1.0);
        unshipped.shipping_limit_date = None;
        let records = vec![
            order("a", "2018-11-02 10:00:00", None, 1.0),
            order("b", "2018-02-02 10:00:00", None, 1.0),
            order("c", "2017-11-20 10:00:00", None, 1.0),
            order("d", "2018-02-28 10:00:00", None, 1.0),
            order("e", "2018-02-01 10:00:00", None, 1.0),
            unshipped,
        ];
        let months: Vec<_> = Aggregator::monthly_transaction_counts(&records)
            .into_iter()
            .map(|m| (m.label, m.transaction_count))
            .collect();
        assert_eq!(months, vec![("February", 3), ("November", 2)]);
    }

    #[test]
    fn test_top_categories_limit_and_tie_break() {
        let mut records = Vec::new();
        for (i, category) in ["b", "a", "c", "a", "b", "d", "e", "f", "g", "h", "i", "j", "k"]
            .iter()
            .enumerate()
        {
            records.push(order(&format!("o{i}"), "2018-01-01 00:00:00", Some(*category), 1.0));
        }
        records.push(order("none", "2018-01-01 00:00:00", None, 1.0));

        let top = Aggregator::top_categories(&records, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].category, "a");
        assert_eq!(top[1].category, "b");
        // singles in name order
        assert_eq!(top[2].category, "c");
        assert_eq!(top[9].category, "j");

        let kept_min = top[top.len() - 1].count;
        let k_count = records
            .iter()
            .filter(|r| r.product_category_name.as_deref() == Some("k"))
            .count();
        assert!(kept_min >= k_count);
    }

    #[test]
    fn test_top_categories_fewer_than_n() {
        let records = vec![
            order("a", "2018-01-01 00:00:00", Some("toys"), 1.0),
            order("b", "2018-01-01 00:00:00", Some("toys"), 1.0),
            order("c", "2018-01-01 00:00:00", Some("books"), 1.0),
        ];
        let top = Aggregator::top_categories(&records, DEFAULT_TOP_N);
        assert_eq!(
            top,
            vec![
                CategoryCount {
                    category: "toys".to_string(),
                    count: 2
                },
                CategoryCount {
                    category: "books".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_monthly_means_single_record_month() {
        let records = vec![
            with_review(order("a", "2018-03-10 10:00:00", None, 42.5), 4.0),
            with_review(order("b", "2018-04-10 10:00:00", None, 10.0), 1.0),
            with_review(order("c", "2018-04-11 10:00:00", None, 30.0), 5.0),
        ];
        let means = Aggregator::monthly_means(&records);
        assert_eq!(means.len(), 2);

        assert_eq!(means[0].label, "March");
        assert_eq!(means[0].transaction_count, 1);
        assert_eq!(means[0].mean_payment_value, Some(42.5));
        assert_eq!(means[0].mean_review_score, Some(4.0));

        assert_eq!(means[1].label, "April");
        assert!((means[1].mean_payment_value.unwrap() - 20.0).abs() < 1e-9);
        assert!((means[1].mean_review_score.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_means_skip_missing_values() {
        let mut no_review = order("a", "2018-06-10 10:00:00", None, 8.0);
        no_review.review_score = None;
        let means = Aggregator::monthly_means(&[no_review]);
        assert_eq!(means[0].mean_payment_value, Some(8.0));
        assert_eq!(means[0].mean_review_score, None);
    }

    #[test]
    fn test_review_score_distribution() {
        let records = vec![
            with_review(order("a", "2018-01-01 00:00:00", None, 1.0), 5.0),
            with_review(order("b", "2018-01-01 00:00:00", None, 1.0), 5.0),
            with_review(order("c", "2018-01-01 00:00:00", None, 1.0), 1.0),
            order("d", "2018-01-01 00:00:00", None, 1.0),
        ];
        let counts: Vec<_> = Aggregator::review_score_distribution(&records)
            .into_iter()
            .map(|b| b.count)
            .collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 2]);
    }

    #[test]
    fn test_summarize() {
        let records = vec![
            with_review(order("a", "2018-01-01 00:00:00", None, 10.0), 5.0),
            with_review(order("a", "2018-01-01 00:00:00", None, 20.0), 5.0),
            with_review(order("b", "2018-01-02 00:00:00", None, 60.0), 2.0),
        ];
        let summary = Aggregator::summarize(&records);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.distinct_orders, 2);
        assert!((summary.total_revenue - 90.0).abs() < 1e-9);
        assert!((summary.mean_payment_value.unwrap() - 30.0).abs() < 1e-9);
        assert!((summary.median_payment_value.unwrap() - 20.0).abs() < 1e-9);
        assert!((summary.mean_review_score.unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_all_matches_individual_views() {
        let records = vec![
            with_review(order("a", "2018-01-05 10:00:00", Some("toys"), 100.0), 4.0),
            with_review(order("b", "2018-01-05 12:00:00", Some("toys"), 50.0), 3.0),
            with_review(order("c", "2018-02-10 09:00:00", Some("books"), 200.0), 5.0),
        ];
        let views = Aggregator::compute_all(&records, 1);
        assert!(!views.is_empty());
        assert_eq!(views.daily_orders, Aggregator::daily_orders(&records));
        assert_eq!(views.monthly_means, Aggregator::monthly_means(&records));
        assert_eq!(views.top_categories.len(), 1);
        assert_eq!(views.top_categories[0].category, "toys");
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(1), "January");
        assert_eq!(month_label(12), "December");
        assert_eq!(month_label(13), "Unknown");
    }
}
