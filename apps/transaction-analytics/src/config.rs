use std::env;
use std::fmt::Display;
use std::str::FromStr;
use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use crate::data_generator::{GeneratorConfig, DEFAULT_CATEGORY_COUNT, DEFAULT_CUSTOMER_POOL_SIZE};
use crate::filter::TransactionFilter;
use crate::report::DEFAULT_PREVIEW_ROWS;

pub const DEFAULT_NUM_TRANSACTIONS: usize = 100_000;
pub const DEFAULT_FILTER_MIN_AMOUNT: f64 = 100.0;
pub const DEFAULT_FILTER_MAX_AMOUNT: f64 = 300.0;
pub const DEFAULT_FILTER_LOOKBACK_DAYS: i64 = 15;
pub const DEFAULT_FILTER_CATEGORY: &str = "Category_1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format {}", other)),
        }
    }
}

/// Settings for one generate/analyze/filter run, read from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub num_transactions: usize,
    pub num_customers: usize,
    pub num_categories: usize,
    pub seed: Option<u64>,
    pub filter_min_amount: f64,
    pub filter_max_amount: f64,
    pub filter_lookback_days: i64,
    pub filter_category: Option<String>,
    pub preview_rows: usize,
    pub report_format: ReportFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_transactions: DEFAULT_NUM_TRANSACTIONS,
            num_customers: DEFAULT_CUSTOMER_POOL_SIZE,
            num_categories: DEFAULT_CATEGORY_COUNT,
            seed: None,
            filter_min_amount: DEFAULT_FILTER_MIN_AMOUNT,
            filter_max_amount: DEFAULT_FILTER_MAX_AMOUNT,
            filter_lookback_days: DEFAULT_FILTER_LOOKBACK_DAYS,
            filter_category: Some(DEFAULT_FILTER_CATEGORY.to_string()),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            report_format: ReportFormat::Text,
        }
    }
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("Ignoring {}={:?}: {}; using default", key, value, e);
            default
        }),
    }
}

impl RunConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup, falling back to
    /// defaults for absent or unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed = lookup("GENERATOR_SEED").and_then(|value| match value.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(e) => {
                warn!("Ignoring GENERATOR_SEED={:?}: {}; using OS entropy", value, e);
                None
            }
        });

        let filter_category = match lookup("FILTER_CATEGORY") {
            None => defaults.filter_category.clone(),
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(value.trim().to_string()),
        };

        Self {
            num_transactions: parse_or_default("NUM_OF_TRANSACTIONS", lookup("NUM_OF_TRANSACTIONS"), defaults.num_transactions),
            num_customers: parse_or_default("NUM_OF_CUSTOMERS", lookup("NUM_OF_CUSTOMERS"), defaults.num_customers),
            num_categories: parse_or_default("NUM_OF_CATEGORIES", lookup("NUM_OF_CATEGORIES"), defaults.num_categories),
            seed,
            filter_min_amount: parse_or_default("FILTER_MIN_AMOUNT", lookup("FILTER_MIN_AMOUNT"), defaults.filter_min_amount),
            filter_max_amount: parse_or_default("FILTER_MAX_AMOUNT", lookup("FILTER_MAX_AMOUNT"), defaults.filter_max_amount),
            filter_lookback_days: parse_or_default("FILTER_LOOKBACK_DAYS", lookup("FILTER_LOOKBACK_DAYS"), defaults.filter_lookback_days),
            filter_category,
            preview_rows: parse_or_default("PREVIEW_ROWS", lookup("PREVIEW_ROWS"), defaults.preview_rows),
            report_format: parse_or_default("REPORT_FORMAT", lookup("REPORT_FORMAT"), defaults.report_format),
        }
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.num_transactions)
            .with_customer_pool_size(self.num_customers)
            .with_category_count(self.num_categories)
    }

    /// Start of the lookback window; out-of-range lookbacks fall back to the default.
    fn filter_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(self.filter_lookback_days)
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .unwrap_or_else(|| {
                warn!(
                    "Ignoring FILTER_LOOKBACK_DAYS={}: out of range; using default {}",
                    self.filter_lookback_days, DEFAULT_FILTER_LOOKBACK_DAYS
                );
                now - Duration::days(DEFAULT_FILTER_LOOKBACK_DAYS)
            })
    }

    /// Filter covering the last `filter_lookback_days` days up to `now`.
    pub fn transaction_filter(&self, now: DateTime<Utc>) -> TransactionFilter {
        let mut filter = TransactionFilter::default()
            .with_amount_range(self.filter_min_amount, self.filter_max_amount)
            .with_start_date(self.filter_start(now))
            .with_end_date(now);
        if let Some(category) = &self.filter_category {
            filter = filter.with_category(category.clone());
        }
        filter
    }
}
