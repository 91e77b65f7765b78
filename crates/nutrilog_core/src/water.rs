//! Per-day water-volume log, in milliliters.

use crate::storage::JsonKvStore;
use chrono::NaiveDate;
use std::sync::Arc;

const WATER_KEY_PREFIX: &str = "water_";

fn water_key(date: NaiveDate) -> String {
    format!("{WATER_KEY_PREFIX}{}", date.format("%Y-%m-%d"))
}

#[derive(Clone)]
pub struct WaterLog {
    kv: Arc<JsonKvStore>,
}

impl WaterLog {
    pub fn new(kv: Arc<JsonKvStore>) -> Self {
        Self { kv }
    }

    /// Milliliters logged for `date`; zero when nothing was logged.
    pub async fn read(&self, date: NaiveDate) -> u32 {
        self.kv.get(&water_key(date)).await.unwrap_or(0)
    }

    /// Add `ml` to the day's total and return the new total.
    pub async fn add(&self, date: NaiveDate, ml: u32) -> u32 {
        let total = self.read(date).await.saturating_add(ml);
        self.kv.put(&water_key(date), &total).await;
        total
    }

    /// Overwrite the day's total.
    pub async fn set(&self, date: NaiveDate, ml: u32) {
        self.kv.put(&water_key(date), &ml).await;
    }
}
