use std::collections::{BTreeMap, HashMap};
use arrow::array::Array;
use arrow::compute;
use arrow::record_batch::RecordBatch;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::schema::{customer_ids, product_categories, purchase_amounts};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAverage {
    pub key: String,
    pub average: f64,
}

/// Descriptive statistics over a transaction table.
///
/// Amount statistics are NaN for an empty table; the total volume is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_volume: f64,
    pub average_amount: f64,
    pub max_amount: f64,
    pub min_amount: f64,
    /// Most frequent category first.
    pub category_counts: Vec<GroupCount>,
    /// Every customer, ascending by id.
    pub customer_averages: Vec<GroupAverage>,
    /// Every customer, most transactions first.
    pub customer_counts: Vec<GroupCount>,
}

/// Count occurrences and rank them by descending count.
/// Equal counts keep the order in which keys first appeared.
pub(crate) fn ranked_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<GroupCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<GroupCount> = Vec::new();

    for key in keys {
        match positions.get(key) {
            Some(&index) => counts[index].count += 1,
            None => {
                positions.insert(key, counts.len());
                counts.push(GroupCount { key: key.to_string(), count: 1 });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn summarize(batch: &RecordBatch) -> Result<TransactionSummary> {
    let amounts = purchase_amounts(batch)?;
    let categories = product_categories(batch)?;
    let customers = customer_ids(batch)?;

    let total_volume = compute::sum(amounts).unwrap_or(0.0);
    let valid_amounts = amounts.len() - amounts.null_count();
    let average_amount = if valid_amounts == 0 {
        f64::NAN
    } else {
        total_volume / valid_amounts as f64
    };
    let max_amount = compute::max(amounts).unwrap_or(f64::NAN);
    let min_amount = compute::min(amounts).unwrap_or(f64::NAN);

    let category_counts = ranked_counts(categories.iter().flatten());

    let mut per_customer: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (customer, amount) in customers.iter().zip(amounts.iter()) {
        if let (Some(customer), Some(amount)) = (customer, amount) {
            let entry = per_customer.entry(customer).or_insert((0.0, 0));
            entry.0 += amount;
            entry.1 += 1;
        }
    }
    let customer_averages = per_customer
        .into_iter()
        .map(|(key, (sum, count))| GroupAverage {
            key: key.to_string(),
            average: sum / count as f64,
        })
        .collect();

    let customer_counts = ranked_counts(customers.iter().flatten());

    debug!(
        "Summarized {} rows: {} categories, {} customers",
        batch.num_rows(),
        category_counts.len(),
        customer_counts.len()
    );

    Ok(TransactionSummary {
        total_volume,
        average_amount,
        max_amount,
        min_amount,
        category_counts,
        customer_averages,
        customer_counts,
    })
}

/// Summarize `batch` and print the analysis report to stdout.
pub fn analyze(batch: &RecordBatch) -> Result<TransactionSummary> {
    let summary = summarize(batch)?;
    println!("{}", summary);
    Ok(summary)
}
