use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use transaction_analytics::config::{ReportFormat, RunConfig};
use transaction_analytics::report::RunReport;
use transaction_analytics::{
    aggregate, analyze, filter_and_aggregate, preview, summarize, TransactionGenerator,
};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    let config = RunConfig::from_env();
    info!(
        "⚙️ Configuration: transactions={}, customers={}, categories={}, seed={:?}, format={:?}",
        config.num_transactions, config.num_customers, config.num_categories, config.seed, config.report_format
    );

    let start_time = std::time::Instant::now();

    let mut generator = match config.seed {
        Some(seed) => TransactionGenerator::seeded(seed),
        None => TransactionGenerator::from_entropy(),
    };
    let transactions = generator.generate(&config.generator_config())?;
    info!("🚀 Generated {} rows in {:.2}s", transactions.num_rows(), start_time.elapsed().as_secs_f64());

    let filter = config.transaction_filter(Utc::now());
    debug!("Filter: {:?}", filter);

    match config.report_format {
        ReportFormat::Text => {
            analyze(&transactions)?;
            let filtered = filter_and_aggregate(&transactions, &filter)?;
            println!();
            println!("{}", preview(&filtered, config.preview_rows)?);
        }
        ReportFormat::Json => {
            let analysis = summarize(&transactions)?;
            let filtered = aggregate(&filter.apply(&transactions)?)?;
            let report = RunReport { config: &config, analysis: &analysis, filtered: &filtered };
            println!("{}", report.to_json()?);
        }
    }

    info!("🎉 Finished in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
