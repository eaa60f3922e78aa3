//! CSV Data Loader Module
//! Reads the orders and geolocation CSV files into typed records using Polars.

use crate::data::records::{
    self, parse_number, parse_timestamp, GeoPoint, OrderDataset, OrderRecord, DATETIME_COLUMNS,
    REQUIRED_GEO_COLUMNS, REQUIRED_ORDER_COLUMNS,
};
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load {path}: {reason}")]
    DataLoad { path: PathBuf, reason: String },
    #[error("{path} is missing required column(s): {}", .missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },
    #[error("Failed to read CSV column: {0}")]
    Csv(#[from] PolarsError),
}

/// Loads the dashboard's two input datasets.
pub struct DataLoader;

impl DataLoader {
    /// Load the orders file, parse its timestamp columns and sort by approval time.
    pub fn load_orders(path: impl AsRef<Path>) -> Result<OrderDataset, LoaderError> {
        let path = path.as_ref();
        let df = Self::read_csv(path, &REQUIRED_ORDER_COLUMNS)?;

        let order_ids = Self::string_values(&df, records::ORDER_ID)?;
        let categories = Self::string_values(&df, records::PRODUCT_CATEGORY_NAME)?;
        let payments = Self::string_values(&df, records::PAYMENT_VALUE)?;
        let reviews = Self::string_values(&df, records::REVIEW_SCORE)?;

        let mut timestamps = Vec::with_capacity(DATETIME_COLUMNS.len());
        for name in DATETIME_COLUMNS {
            let raw = Self::string_values(&df, name)?;
            let parsed: Vec<_> = raw.iter().map(|v| v.and_then(parse_timestamp)).collect();
            Self::report_coerced(path, name, &raw, &parsed);
            timestamps.push(parsed);
        }

        let payment_values: Vec<_> = payments.iter().map(|v| v.and_then(parse_number)).collect();
        Self::report_coerced(path, records::PAYMENT_VALUE, &payments, &payment_values);
        let review_scores: Vec<_> = reviews.iter().map(|v| v.and_then(parse_number)).collect();
        Self::report_coerced(path, records::REVIEW_SCORE, &reviews, &review_scores);

        let rows = (0..df.height())
            .map(|i| OrderRecord {
                order_id: order_ids[i]
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
                product_category_name: categories[i]
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
                order_approved_at: timestamps[0][i],
                order_delivered_carrier_date: timestamps[1][i],
                order_delivered_customer_date: timestamps[2][i],
                order_estimated_delivery_date: timestamps[3][i],
                order_purchase_timestamp: timestamps[4][i],
                shipping_limit_date: timestamps[5][i],
                payment_value: payment_values[i],
                review_score: review_scores[i],
            })
            .collect();

        let dataset = OrderDataset::from_records(rows);
        info!("Loaded {} order rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Load the geolocation file. Rows without two parseable coordinates are skipped.
    pub fn load_geo(path: impl AsRef<Path>) -> Result<Vec<GeoPoint>, LoaderError> {
        let path = path.as_ref();
        let df = Self::read_csv(path, &REQUIRED_GEO_COLUMNS)?;

        let lats = Self::string_values(&df, records::GEOLOCATION_LAT)?;
        let lngs = Self::string_values(&df, records::GEOLOCATION_LNG)?;

        let points: Vec<GeoPoint> = lats
            .iter()
            .zip(lngs.iter())
            .filter_map(|(lat, lng)| {
                Some(GeoPoint {
                    lat: lat.and_then(parse_number)?,
                    lng: lng.and_then(parse_number)?,
                })
            })
            .collect();

        let skipped = df.height() - points.len();
        if skipped > 0 {
            warn!(
                "Skipped {} geolocation row(s) without valid coordinates in {}",
                skipped,
                path.display()
            );
        }
        info!("Loaded {} geolocation points from {}", points.len(), path.display());
        Ok(points)
    }

    /// Read every column as text so parsing stays permissive and under our control.
    fn read_csv(path: &Path, required: &[&str]) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::DataLoad {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| LoaderError::DataLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let missing: Vec<String> = required
            .iter()
            .filter(|name| df.column(name).is_err())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoaderError::Schema {
                path: path.to_path_buf(),
                missing,
            });
        }

        if df.height() == 0 {
            return Err(LoaderError::DataLoad {
                path: path.to_path_buf(),
                reason: "file has no data rows".to_string(),
            });
        }

        Ok(df)
    }

    fn string_values<'a>(
        df: &'a DataFrame,
        name: &str,
    ) -> Result<Vec<Option<&'a str>>, LoaderError> {
        let column = df.column(name)?;
        Ok(column.str()?.into_iter().collect())
    }

    /// Log how many non-blank cells of a column could not be parsed.
    fn report_coerced<T>(path: &Path, column: &str, raw: &[Option<&str>], parsed: &[Option<T>]) {
        let coerced = raw
            .iter()
            .zip(parsed)
            .filter(|(r, p)| r.is_some_and(|s| !s.trim().is_empty()) && p.is_none())
            .count();
        if coerced > 0 {
            warn!(
                "{}: {} value(s) in column '{}' could not be parsed and were set to null",
                path.display(),
                coerced,
                column
            );
        }
    }
}
