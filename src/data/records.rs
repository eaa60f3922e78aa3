//! Order and Geolocation Records
//! Typed rows of the two input datasets plus the permissive value parsers.

use chrono::{NaiveDate, NaiveDateTime};

pub const ORDER_ID: &str = "order_id";
pub const PRODUCT_CATEGORY_NAME: &str = "product_category_name";
pub const ORDER_APPROVED_AT: &str = "order_approved_at";
pub const ORDER_DELIVERED_CARRIER_DATE: &str = "order_delivered_carrier_date";
pub const ORDER_DELIVERED_CUSTOMER_DATE: &str = "order_delivered_customer_date";
pub const ORDER_ESTIMATED_DELIVERY_DATE: &str = "order_estimated_delivery_date";
pub const ORDER_PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";
pub const SHIPPING_LIMIT_DATE: &str = "shipping_limit_date";
pub const PAYMENT_VALUE: &str = "payment_value";
pub const REVIEW_SCORE: &str = "review_score";

pub const GEOLOCATION_LAT: &str = "geolocation_lat";
pub const GEOLOCATION_LNG: &str = "geolocation_lng";

/// Columns parsed as timestamps.
pub const DATETIME_COLUMNS: [&str; 6] = [
    ORDER_APPROVED_AT,
    ORDER_DELIVERED_CARRIER_DATE,
    ORDER_DELIVERED_CUSTOMER_DATE,
    ORDER_ESTIMATED_DELIVERY_DATE,
    ORDER_PURCHASE_TIMESTAMP,
    SHIPPING_LIMIT_DATE,
];

/// Every column the orders file must carry.
pub const REQUIRED_ORDER_COLUMNS: [&str; 10] = [
    ORDER_ID,
    PRODUCT_CATEGORY_NAME,
    ORDER_APPROVED_AT,
    ORDER_DELIVERED_CARRIER_DATE,
    ORDER_DELIVERED_CUSTOMER_DATE,
    ORDER_ESTIMATED_DELIVERY_DATE,
    ORDER_PURCHASE_TIMESTAMP,
    SHIPPING_LIMIT_DATE,
    PAYMENT_VALUE,
    REVIEW_SCORE,
];

pub const REQUIRED_GEO_COLUMNS: [&str; 2] = [GEOLOCATION_LAT, GEOLOCATION_LNG];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// One row of the pre-joined orders dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// `None` for a blank id cell; such rows never count as an order.
    pub order_id: Option<String>,
    pub product_category_name: Option<String>,
    pub order_approved_at: Option<NaiveDateTime>,
    pub order_delivered_carrier_date: Option<NaiveDateTime>,
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
    pub order_purchase_timestamp: Option<NaiveDateTime>,
    pub shipping_limit_date: Option<NaiveDateTime>,
    pub payment_value: Option<f64>,
    pub review_score: Option<f64>,
}

impl OrderRecord {
    /// Minimal record with only the id set. Used by tests and fixtures.
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            product_category_name: None,
            order_approved_at: None,
            order_delivered_carrier_date: None,
            order_delivered_customer_date: None,
            order_estimated_delivery_date: None,
            order_purchase_timestamp: None,
            shipping_limit_date: None,
            payment_value: None,
            review_score: None,
        }
    }

    /// Calendar day of the approval timestamp.
    pub fn approved_date(&self) -> Option<NaiveDate> {
        self.order_approved_at.map(|ts| ts.date())
    }
}

/// A single geolocation sample, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Orders sorted ascending by approval timestamp.
///
/// Rows without an approval timestamp sort after every dated row. The sort is
/// stable, so rows sharing a timestamp keep their file order. Downstream
/// filtering relies on this ordering.
#[derive(Debug, Clone, Default)]
pub struct OrderDataset {
    records: Vec<OrderRecord>,
}

impl OrderDataset {
    pub fn from_records(mut records: Vec<OrderRecord>) -> Self {
        records.sort_by(|a, b| match (a.order_approved_at, b.order_approved_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Self { records }
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse a timestamp cell. Unparseable or blank values become `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a numeric cell. NaN and unparseable values become `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}
