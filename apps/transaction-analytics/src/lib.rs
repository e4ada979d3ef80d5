//! Synthetic transaction tables: generation, descriptive statistics and
//! filter/aggregate queries over an Arrow [`RecordBatch`](arrow::record_batch::RecordBatch).

pub mod analyzer;
pub mod common;
pub mod config;
pub mod data_generator;
pub mod error;
pub mod filter;
pub mod report;
pub mod schema;

pub use analyzer::{analyze, summarize, TransactionSummary};
pub use data_generator::{generate, GeneratorConfig, TransactionGenerator};
pub use error::{Error, Result};
pub use filter::{aggregate, filter_and_aggregate, FilterSummary, TransactionFilter};
pub use report::preview;
