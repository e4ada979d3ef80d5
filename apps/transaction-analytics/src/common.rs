use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng, RngCore};

pub const TRANSACTION_ID_BYTES: usize = 8;
pub const CUSTOMER_ID_BYTES: usize = 4;

pub const WINDOW_DAYS: i64 = 30;
pub const SECONDS_PER_DAY: i64 = 86_400;

pub const MIN_PURCHASE_AMOUNT: f64 = 10.0;
pub const MAX_PURCHASE_AMOUNT: f64 = 1000.0;

/// Generate a lowercase hex token of `num_bytes` random bytes (two characters per byte).
pub fn generate_hex_token_with_rng<R: RngCore + CryptoRng>(num_bytes: usize, rng: &mut R) -> String {
    let mut bytes = vec![0u8; num_bytes];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate the fixed pool of customer identifiers that transactions are assigned from
pub fn generate_customer_pool_with_rng<R: RngCore + CryptoRng>(pool_size: usize, rng: &mut R) -> Vec<String> {
    (0..pool_size)
        .map(|_| generate_hex_token_with_rng(CUSTOMER_ID_BYTES, rng))
        .collect()
}

/// Labels `Category_1` through `Category_<count>`
pub fn generate_category_labels(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Category_{}", i)).collect()
}

/// Pick one value uniformly from `options`; empty options give an empty string.
pub fn generate_from_options_with_rng<R: Rng>(options: &[String], rng: &mut R) -> String {
    options.choose(rng).cloned().unwrap_or_default()
}

/// Start of the generation window: `WINDOW_DAYS` before `now`, truncated to whole seconds.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let now_seconds = DateTime::<Utc>::from_timestamp(now.timestamp(), 0).unwrap_or(now);
    now_seconds - Duration::days(WINDOW_DAYS)
}

/// Generate a UTC timestamp (microseconds) at a random day and second inside the window
pub fn generate_window_timestamp_with_rng<R: Rng>(window_start: DateTime<Utc>, rng: &mut R) -> i64 {
    let day_offset = rng.gen_range(0..WINDOW_DAYS);
    let second_offset = rng.gen_range(0..SECONDS_PER_DAY);

    (window_start + Duration::days(day_offset) + Duration::seconds(second_offset)).timestamp_micros()
}

pub fn generate_purchase_amount_with_rng<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(MIN_PURCHASE_AMOUNT..MAX_PURCHASE_AMOUNT)
}
