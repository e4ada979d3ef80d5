use std::sync::Arc;
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use crate::common::{
    generate_category_labels,
    generate_customer_pool_with_rng,
    generate_from_options_with_rng,
    generate_hex_token_with_rng,
    generate_purchase_amount_with_rng,
    generate_window_timestamp_with_rng,
    window_start,
    TRANSACTION_ID_BYTES,
};
use crate::error::{Error, Result};
use crate::schema::{transaction_schema, TIMEZONE};

pub const DEFAULT_CUSTOMER_POOL_SIZE: usize = 100;
pub const DEFAULT_CATEGORY_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub transaction_count: usize,
    pub customer_pool_size: usize,
    pub category_count: usize,
}

impl GeneratorConfig {
    pub fn new(transaction_count: usize) -> Self {
        Self {
            transaction_count,
            customer_pool_size: DEFAULT_CUSTOMER_POOL_SIZE,
            category_count: DEFAULT_CATEGORY_COUNT,
        }
    }

    pub fn with_customer_pool_size(mut self, customer_pool_size: usize) -> Self {
        self.customer_pool_size = customer_pool_size;
        self
    }

    pub fn with_category_count(mut self, category_count: usize) -> Self {
        self.category_count = category_count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("transaction_count", self.transaction_count),
            ("customer_pool_size", self.customer_pool_size),
            ("category_count", self.category_count),
        ] {
            if value == 0 {
                return Err(Error::InvalidArgument(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}

/// Builds synthetic transaction tables from an owned random source.
///
/// The source must be cryptographically secure because transaction and customer
/// identifiers are drawn from it. Seeding it (see [`TransactionGenerator::seeded`])
/// makes every column reproducible.
#[derive(Debug)]
pub struct TransactionGenerator<R: RngCore + CryptoRng = StdRng> {
    rng: R,
}

impl TransactionGenerator<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore + CryptoRng> TransactionGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self, config: &GeneratorConfig) -> Result<RecordBatch> {
        self.generate_at(config, Utc::now())
    }

    /// Generate a table whose timestamps fall in the 30 days preceding `now`.
    pub fn generate_at(&mut self, config: &GeneratorConfig, now: DateTime<Utc>) -> Result<RecordBatch> {
        config.validate()?;
        let num_rows = config.transaction_count;
        let rng = &mut self.rng;

        let transaction_ids: Vec<String> = (0..num_rows)
            .map(|_| generate_hex_token_with_rng(TRANSACTION_ID_BYTES, rng))
            .collect();

        let customer_pool = generate_customer_pool_with_rng(config.customer_pool_size, rng);
        debug!("Generated customer pool of {} ids", customer_pool.len());
        let customer_ids: Vec<String> = (0..num_rows)
            .map(|_| generate_from_options_with_rng(&customer_pool, rng))
            .collect();

        let start = window_start(now);
        let timestamps: Vec<i64> = (0..num_rows)
            .map(|_| generate_window_timestamp_with_rng(start, rng))
            .collect();

        let purchase_amounts: Vec<f64> = (0..num_rows)
            .map(|_| generate_purchase_amount_with_rng(rng))
            .collect();

        let categories = generate_category_labels(config.category_count);
        let product_categories: Vec<String> = (0..num_rows)
            .map(|_| generate_from_options_with_rng(&categories, rng))
            .collect();

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(transaction_ids)),
            Arc::new(StringArray::from(customer_ids)),
            Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone(TIMEZONE)),
            Arc::new(Float64Array::from(purchase_amounts)),
            Arc::new(StringArray::from(product_categories)),
        ];

        let batch = RecordBatch::try_new(transaction_schema(), arrays)?;
        info!(
            "✅ Generated {} transactions across {} customers and {} categories",
            batch.num_rows(),
            config.customer_pool_size,
            config.category_count
        );
        Ok(batch)
    }
}

/// Generate a transaction table using an OS-seeded random source.
pub fn generate(transaction_count: usize, customer_pool_size: usize, category_count: usize) -> Result<RecordBatch> {
    let config = GeneratorConfig::new(transaction_count)
        .with_customer_pool_size(customer_pool_size)
        .with_category_count(category_count);
    TransactionGenerator::from_entropy().generate(&config)
}
