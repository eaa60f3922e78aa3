//! Stats module - Aggregated dashboard views

mod aggregator;

pub use aggregator::{
    month_label, Aggregator, CategoryCount, DailyOrdersView, DashboardViews, MonthlyBucketView,
    OrderSummary, ReviewScoreBin, TopCategoryView, DEFAULT_TOP_N,
};
