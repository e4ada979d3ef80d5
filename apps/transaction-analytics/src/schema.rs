use std::sync::Arc;
use arrow::array::{Array, Float64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use crate::error::{Error, Result};

pub const TRANSACTION_ID: &str = "TransactionID";
pub const CUSTOMER_ID: &str = "CustomerID";
pub const TIMESTAMP: &str = "Timestamp";
pub const PURCHASE_AMOUNT: &str = "PurchaseAmount";
pub const PRODUCT_CATEGORY: &str = "ProductCategory";

/// Offset form of UTC; named zones need arrow's `chrono-tz` feature to display.
pub const TIMEZONE: &str = "+00:00";

pub fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some(TIMEZONE.into()))
}

/// Column layout of a transaction table, in generation order.
pub fn transaction_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(TRANSACTION_ID, DataType::Utf8, false),
        Field::new(CUSTOMER_ID, DataType::Utf8, false),
        Field::new(TIMESTAMP, timestamp_type(), false),
        Field::new(PURCHASE_AMOUNT, DataType::Float64, false),
        Field::new(PRODUCT_CATEGORY, DataType::Utf8, false),
    ]))
}

fn column<'a, A: Array + 'static>(batch: &'a RecordBatch, name: &str, expected: &str) -> Result<&'a A> {
    let array = batch
        .column_by_name(name)
        .ok_or_else(|| Error::SchemaMismatch(format!("missing column {}", name)))?;

    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        Error::SchemaMismatch(format!(
            "column {} has type {}, expected {}",
            name,
            array.data_type(),
            expected
        ))
    })
}

pub fn transaction_ids(batch: &RecordBatch) -> Result<&StringArray> {
    column(batch, TRANSACTION_ID, "Utf8")
}

pub fn customer_ids(batch: &RecordBatch) -> Result<&StringArray> {
    column(batch, CUSTOMER_ID, "Utf8")
}

pub fn timestamps(batch: &RecordBatch) -> Result<&TimestampMicrosecondArray> {
    let expected = timestamp_type();
    let array: &TimestampMicrosecondArray = column(batch, TIMESTAMP, "Timestamp(Microsecond, \"+00:00\")")?;
    if array.data_type() != &expected {
        return Err(Error::SchemaMismatch(format!(
            "column {} has type {}, expected {}",
            TIMESTAMP,
            array.data_type(),
            expected
        )));
    }
    Ok(array)
}

pub fn purchase_amounts(batch: &RecordBatch) -> Result<&Float64Array> {
    column(batch, PURCHASE_AMOUNT, "Float64")
}

pub fn product_categories(batch: &RecordBatch) -> Result<&StringArray> {
    column(batch, PRODUCT_CATEGORY, "Utf8")
}
