use arrow::array::{Array, Float64Array, Scalar, StringArray, TimestampMicrosecondArray};
use arrow::compute::kernels::cmp::{eq, gt_eq, lt_eq};
use arrow::compute::{self, and, filter_record_batch};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::schema::{product_categories, purchase_amounts, timestamps, TIMEZONE};

pub const DEFAULT_MIN_AMOUNT: f64 = 50.0;
pub const DEFAULT_MAX_AMOUNT: f64 = 500.0;

/// Conjunctive row predicate over amount, time and category.
///
/// The amount range is always applied (inclusive on both ends). The date bounds and
/// the category only apply when set. Inverted ranges select nothing rather than
/// failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub min_amount: f64,
    pub max_amount: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            min_amount: DEFAULT_MIN_AMOUNT,
            max_amount: DEFAULT_MAX_AMOUNT,
            start_date: None,
            end_date: None,
            category: None,
        }
    }
}

fn timestamp_scalar(at: DateTime<Utc>) -> Scalar<TimestampMicrosecondArray> {
    Scalar::new(TimestampMicrosecondArray::from(vec![at.timestamp_micros()]).with_timezone(TIMEZONE))
}

impl TransactionFilter {
    pub fn with_amount_range(mut self, min_amount: f64, max_amount: f64) -> Self {
        self.min_amount = min_amount;
        self.max_amount = max_amount;
        self
    }

    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Select the matching rows into a new table, preserving source order.
    pub fn apply(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let amounts = purchase_amounts(batch)?;
        let mut mask = and(
            &gt_eq(amounts, &Float64Array::new_scalar(self.min_amount))?,
            &lt_eq(amounts, &Float64Array::new_scalar(self.max_amount))?,
        )?;

        if self.start_date.is_some() || self.end_date.is_some() {
            let times = timestamps(batch)?;
            if let Some(start) = self.start_date {
                mask = and(&mask, &gt_eq(times, &timestamp_scalar(start))?)?;
            }
            if let Some(end) = self.end_date {
                mask = and(&mask, &lt_eq(times, &timestamp_scalar(end))?)?;
            }
        }

        if let Some(category) = &self.category {
            let categories = product_categories(batch)?;
            mask = and(&mask, &eq(categories, &StringArray::new_scalar(category))?)?;
        }

        let filtered = filter_record_batch(batch, &mask)?;
        debug!("Filter kept {} of {} rows", filtered.num_rows(), batch.num_rows());
        Ok(filtered)
    }
}

/// Aggregates over a filtered table. The average is NaN when no rows matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub total_volume: f64,
    pub average_amount: f64,
    pub transaction_count: usize,
}

pub fn aggregate(batch: &RecordBatch) -> Result<FilterSummary> {
    let amounts = purchase_amounts(batch)?;
    let total_volume = compute::sum(amounts).unwrap_or(0.0);
    let valid_amounts = amounts.len() - amounts.null_count();
    let average_amount = if valid_amounts == 0 {
        f64::NAN
    } else {
        total_volume / valid_amounts as f64
    };

    Ok(FilterSummary {
        total_volume,
        average_amount,
        transaction_count: batch.num_rows(),
    })
}

/// Filter `batch`, print the aggregate report to stdout and return the filtered rows.
pub fn filter_and_aggregate(batch: &RecordBatch, filter: &TransactionFilter) -> Result<RecordBatch> {
    let filtered = filter.apply(batch)?;
    let summary = aggregate(&filtered)?;
    println!("{}", summary);
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use arrow::array::ArrayRef;
    use chrono::{Duration, TimeZone};
    use crate::error::Error;
    use crate::schema::{transaction_ids, transaction_schema};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    // (id, day offset from base_time, amount, category)
    fn table(rows: &[(&str, i64, f64, &str)]) -> RecordBatch {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.0))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|_| "cafebabe"))),
            Arc::new(
                TimestampMicrosecondArray::from_iter_values(
                    rows.iter().map(|r| (base_time() + Duration::days(r.1)).timestamp_micros()),
                )
                .with_timezone(TIMEZONE),
            ),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.2))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.3))),
        ];
        RecordBatch::try_new(transaction_schema(), arrays).unwrap()
    }

    fn sample() -> RecordBatch {
        table(&[
            ("t1", 0, 49.99, "Category_1"),
            ("t2", 1, 50.0, "Category_2"),
            ("t3", 2, 120.0, "Category_1"),
            ("t4", 3, 500.0, "Category_1"),
            ("t5", 4, 500.01, "Category_2"),
            ("t6", 5, 250.0, "Category_2"),
        ])
    }

    fn ids(batch: &RecordBatch) -> Vec<String> {
        transaction_ids(batch).unwrap().iter().flatten().map(str::to_string).collect()
    }

    #[test]
    fn default_amount_bounds_are_inclusive() {
        let filtered = TransactionFilter::default().apply(&sample()).unwrap();
        assert_eq!(ids(&filtered), vec!["t2", "t3", "t4", "t6"]);
    }

    #[test]
    fn date_and_category_filters_combine() {
        let filter = TransactionFilter::default()
            .with_start_date(base_time() + Duration::days(2))
            .with_end_date(base_time() + Duration::days(5))
            .with_category("Category_1");
        let filtered = filter.apply(&sample()).unwrap();
        assert_eq!(ids(&filtered), vec!["t3", "t4"]);

        let only_start = TransactionFilter::default().with_start_date(base_time() + Duration::days(3));
        assert_eq!(ids(&only_start.apply(&sample()).unwrap()), vec!["t4", "t6"]);

        let only_end = TransactionFilter::default().with_end_date(base_time() + Duration::days(1));
        assert_eq!(ids(&only_end.apply(&sample()).unwrap()), vec!["t2"]);
    }

    #[test]
    fn wide_bounds_keep_every_row_in_order() {
        let source = sample();
        let filtered = TransactionFilter::default().with_amount_range(0.0, 10_000.0).apply(&source).unwrap();
        assert_eq!(filtered, source);
    }

    #[test]
    fn reapplying_a_filter_is_idempotent() {
        let filter = TransactionFilter::default()
            .with_amount_range(100.0, 300.0)
            .with_category("Category_2");
        let once = filter.apply(&sample()).unwrap();
        let twice = filter.apply(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn inverted_ranges_select_nothing() {
        let inverted_amounts = TransactionFilter::default().with_amount_range(500.0, 50.0);
        let filtered = inverted_amounts.apply(&sample()).unwrap();
        assert_eq!(filtered.num_rows(), 0);

        let summary = aggregate(&filtered).unwrap();
        assert_eq!(summary.transaction_count, 0);
        assert_eq!(summary.total_volume, 0.0);
        assert!(summary.average_amount.is_nan());

        let inverted_dates = TransactionFilter::default()
            .with_start_date(base_time() + Duration::days(4))
            .with_end_date(base_time());
        assert_eq!(inverted_dates.apply(&sample()).unwrap().num_rows(), 0);
    }

    #[test]
    fn aggregate_reports_sum_mean_and_count() {
        let filtered = filter_and_aggregate(&sample(), &TransactionFilter::default()).unwrap();
        let summary = aggregate(&filtered).unwrap();

        assert_eq!(summary.transaction_count, 4);
        assert!((summary.total_volume - 920.0).abs() < 1e-9);
        assert!((summary.average_amount - 230.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_category_yields_empty_table() {
        let filtered = TransactionFilter::default().with_category("Category_9").apply(&sample()).unwrap();
        assert_eq!(filtered.num_rows(), 0);
        assert_eq!(filtered.schema(), sample().schema());
    }

    #[test]
    fn filter_with_dates_serializes() {
        let filter = TransactionFilter::default()
            .with_start_date(base_time())
            .with_end_date(base_time() + Duration::days(15))
            .with_category("Category_1");

        let json = serde_json::to_string(&filter).unwrap();
        let restored: TransactionFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, filter);
    }

    #[test]
    fn filtering_without_amount_column_fails() {
        let batch = sample().project(&[0, 1, 2, 4]).unwrap();
        assert!(matches!(TransactionFilter::default().apply(&batch), Err(Error::SchemaMismatch(_))));
    }
}
