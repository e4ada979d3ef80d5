use std::fmt;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use serde::Serialize;
use crate::analyzer::TransactionSummary;
use crate::config::RunConfig;
use crate::error::Result;
use crate::filter::FilterSummary;

/// Rows shown for each per-customer listing of the analysis report.
pub const CUSTOMER_LISTING_ROWS: usize = 5;
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

impl fmt::Display for TransactionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Transaction Data Analysis ===")?;
        writeln!(f, "Total Transaction Volume: ${:.2}", self.total_volume)?;
        writeln!(f, "Average Purchase Amount: ${:.2}", self.average_amount)?;
        writeln!(f, "Maximum Purchase Amount: ${:.2}", self.max_amount)?;
        writeln!(f, "Minimum Purchase Amount: ${:.2}", self.min_amount)?;
        writeln!(f)?;

        writeln!(f, "Transactions per Category:")?;
        for group in &self.category_counts {
            writeln!(f, "{}  {}", group.key, group.count)?;
        }
        writeln!(f)?;

        writeln!(f, "Average Purchase per Customer:")?;
        for group in self.customer_averages.iter().take(CUSTOMER_LISTING_ROWS) {
            writeln!(f, "{}  {:.2}", group.key, group.average)?;
        }
        writeln!(f)?;

        writeln!(f, "Number of Transactions per Customer:")?;
        for group in self.customer_counts.iter().take(CUSTOMER_LISTING_ROWS) {
            writeln!(f, "{}  {}", group.key, group.count)?;
        }
        Ok(())
    }
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Filtered Transaction Data ===")?;
        writeln!(f, "Total Volume (Filtered): ${:.2}", self.total_volume)?;
        writeln!(f, "Average Purchase Amount (Filtered): ${:.2}", self.average_amount)?;
        writeln!(f, "Number of Transactions (Filtered): {}", self.transaction_count)
    }
}

/// Machine-readable form of a full run. NaN statistics serialize as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub config: &'a RunConfig,
    pub analysis: &'a TransactionSummary,
    pub filtered: &'a FilterSummary,
}

impl RunReport<'_> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render the first `rows` rows of `batch` as a text table.
pub fn preview(batch: &RecordBatch, rows: usize) -> Result<String> {
    let head = batch.slice(0, rows.min(batch.num_rows()));
    Ok(pretty_format_batches(&[head])?.to_string())
}
