//! Data Processor Module
//! Date-range filtering over the approval-sorted orders dataset.

use crate::data::records::{OrderDataset, OrderRecord};
use chrono::NaiveDate;
use log::{debug, warn};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Handles date-range selection over loaded orders.
pub struct DataProcessor;

impl DataProcessor {
    /// Orders whose approval date lies in `[start, end]`, both inclusive.
    ///
    /// The dataset is sorted by approval time, so the matching rows form one
    /// contiguous run located by binary search. Undated rows sit at the tail
    /// and never match.
    pub fn filter_by_approved_date(
        dataset: &OrderDataset,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<&[OrderRecord], FilterError> {
        if start > end {
            return Err(FilterError::InvalidRange { start, end });
        }

        let records = dataset.records();
        let lower = records.partition_point(|r| matches!(r.approved_date(), Some(d) if d < start));
        let upper = records.partition_point(|r| matches!(r.approved_date(), Some(d) if d <= end));
        let selected = &records[lower..upper];

        if selected.is_empty() {
            warn!("No orders approved between {} and {}", start, end);
        } else {
            debug!("Selected {} orders between {} and {}", selected.len(), start, end);
        }
        Ok(selected)
    }

    /// First and last approval dates in the dataset.
    pub fn approved_date_bounds(dataset: &OrderDataset) -> Option<(NaiveDate, NaiveDate)> {
        let records = dataset.records();
        let first = records.first().and_then(OrderRecord::approved_date)?;
        let last = records.iter().rev().find_map(OrderRecord::approved_date)?;
        Some((first, last))
    }

    /// Clamp a requested range into `bounds`. Does not reorder start and end.
    pub fn clamp_range(
        bounds: (NaiveDate, NaiveDate),
        start: NaiveDate,
        end: NaiveDate,
    ) -> (NaiveDate, NaiveDate) {
        let (min, max) = bounds;
        (start.clamp(min, max), end.clamp(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order(id: &str, approved: Option<&str>) -> OrderRecord {
        let mut record = OrderRecord::new(id);
        record.order_approved_at =
            approved.map(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap());
        record
    }

    fn sample() -> OrderDataset {
        OrderDataset::from_records(vec![
            order("a", Some("2018-01-05 23:59:59")),
            order("b", Some("2018-01-05 00:00:00")),
            order("c", Some("2018-01-07 12:00:00")),
            order("d", None),
            order("e", Some("2018-02-10 09:00:00")),
            order("f", Some("2017-12-31 18:30:00")),
        ])
    }

    fn ids(records: &[OrderRecord]) -> Vec<&str> {
        records
            .iter()
            .filter_map(|r| r.order_id.as_deref())
            .collect()
    }

    #[test]
    fn test_filter_is_inclusive_at_day_granularity() {
        let dataset = sample();
        let selected =
            DataProcessor::filter_by_approved_date(&dataset, date(2018, 1, 5), date(2018, 1, 7))
                .unwrap();
        assert_eq!(ids(selected), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_filter_single_day_at_min_date() {
        let dataset = sample();
        let (min, _) = DataProcessor::approved_date_bounds(&dataset).unwrap();
        let selected = DataProcessor::filter_by_approved_date(&dataset, min, min).unwrap();
        assert_eq!(ids(selected), vec!["f"]);
    }

    #[test]
    fn test_filter_rejects_inverted_range() {
        let dataset = sample();
        let result =
            DataProcessor::filter_by_approved_date(&dataset, date(2018, 2, 1), date(2018, 1, 1));
        assert_eq!(
            result,
            Err(FilterError::InvalidRange {
                start: date(2018, 2, 1),
                end: date(2018, 1, 1),
            })
        );
    }

    #[test]
    fn test_filter_empty_range_is_not_an_error() {
        let dataset = sample();
        let selected =
            DataProcessor::filter_by_approved_date(&dataset, date(2018, 1, 20), date(2018, 1, 31))
                .unwrap();
        assert!(selected.is_empty());

        let empty = OrderDataset::default();
        let selected =
            DataProcessor::filter_by_approved_date(&empty, date(2018, 1, 1), date(2018, 12, 31))
                .unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_filter_output_is_ordered_and_in_range() {
        let dataset = sample();
        let start = date(2017, 12, 1);
        let mut end = start;
        while end <= date(2018, 3, 1) {
            let selected = DataProcessor::filter_by_approved_date(&dataset, start, end).unwrap();
            assert!(selected.iter().all(|r| {
                let d = r.approved_date().unwrap();
                d >= start && d <= end
            }));
            assert!(selected
                .windows(2)
                .all(|w| w[0].order_approved_at <= w[1].order_approved_at));
            end += Duration::days(3);
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let dataset = sample();
        let first =
            DataProcessor::filter_by_approved_date(&dataset, date(2018, 1, 1), date(2018, 1, 31))
                .unwrap();
        let second =
            DataProcessor::filter_by_approved_date(&dataset, date(2018, 1, 1), date(2018, 1, 31))
                .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bounds_skip_undated_rows() {
        let dataset = sample();
        assert_eq!(
            DataProcessor::approved_date_bounds(&dataset),
            Some((date(2017, 12, 31), date(2018, 2, 10)))
        );
        assert_eq!(
            DataProcessor::approved_date_bounds(&OrderDataset::default()),
            None
        );
    }

    #[test]
    fn test_clamp_range() {
        let bounds = (date(2018, 1, 1), date(2018, 6, 30));
        assert_eq!(
            DataProcessor::clamp_range(bounds, date(2017, 5, 1), date(2019, 1, 1)),
            bounds
        );
        assert_eq!(
            DataProcessor::clamp_range(bounds, date(2018, 2, 1), date(2018, 3, 1)),
            (date(2018, 2, 1), date(2018, 3, 1))
        );
    }
}
