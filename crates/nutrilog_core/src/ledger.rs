//! Daily ledger store: the append-only record of what was eaten each day.

use crate::error::{CoreError, CoreResult};
use crate::storage::JsonKvStore;
use crate::types::{DailyLedger, MealEntry, MealSlot};
use chrono::NaiveDate;
use std::sync::Arc;

const MEALS_KEY_PREFIX: &str = "meals_";

fn meals_key(date: NaiveDate) -> String {
    format!("{MEALS_KEY_PREFIX}{}", date.format("%Y-%m-%d"))
}

/// One ledger document per calendar date, created lazily on first append.
#[derive(Clone)]
pub struct LedgerStore {
    kv: Arc<JsonKvStore>,
}

impl LedgerStore {
    pub fn new(kv: Arc<JsonKvStore>) -> Self {
        Self { kv }
    }

    /// The ledger for `date`; empty if nothing was ever logged.
    pub async fn read(&self, date: NaiveDate) -> DailyLedger {
        self.kv
            .get(&meals_key(date))
            .await
            .unwrap_or_else(|| DailyLedger::empty(date))
    }

    /// Append one entry to a slot. The only validation is a positive
    /// quantity; an unknown food id is stored as-is and starts counting
    /// toward totals once the catalog resolves it.
    pub async fn append(
        &self,
        date: NaiveDate,
        slot: MealSlot,
        entry: MealEntry,
    ) -> CoreResult<DailyLedger> {
        if entry.quantity == 0 {
            return Err(CoreError::Validation("quantity must be positive".into()));
        }
        let mut ledger = self.read(date).await;
        ledger.slots.entry(slot).or_default().push(entry);
        self.kv.put(&meals_key(date), &ledger).await;
        Ok(ledger)
    }

    /// Clear every slot for `date`. Irreversible; the caller is expected to
    /// re-aggregate the day to zero afterwards.
    pub async fn reset(&self, date: NaiveDate) {
        self.kv.remove(&meals_key(date)).await;
        tracing::info!(%date, "day ledger reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn append_rejects_zero_quantity() {
        let dir = tempfile::tempdir().expect("tempdir");
        let kv = Arc::new(JsonKvStore::open(dir.path()).await.expect("open"));
        let store = LedgerStore::new(kv);

        let err = store
            .append(
                date(),
                MealSlot::Lunch,
                MealEntry {
                    food_id: "apple".into(),
                    quantity: 0,
                },
            )
            .await
            .expect_err("zero quantity must fail");
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.read(date()).await.is_empty());
    }

    #[tokio::test]
    async fn append_accumulates_within_a_slot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let kv = Arc::new(JsonKvStore::open(dir.path()).await.expect("open"));
        let store = LedgerStore::new(kv);

        for quantity in [1, 2] {
            store
                .append(
                    date(),
                    MealSlot::Breakfast,
                    MealEntry {
                        food_id: "rolled-oats".into(),
                        quantity,
                    },
                )
                .await
                .expect("append");
        }
        let ledger = store.read(date()).await;
        assert_eq!(ledger.slots[&MealSlot::Breakfast].len(), 2);
    }

    #[tokio::test]
    async fn reset_clears_the_whole_day() {
        let dir = tempfile::tempdir().expect("tempdir");
        let kv = Arc::new(JsonKvStore::open(dir.path()).await.expect("open"));
        let store = LedgerStore::new(kv);

        store
            .append(
                date(),
                MealSlot::Dinner,
                MealEntry {
                    food_id: "grilled-salmon".into(),
                    quantity: 1,
                },
            )
            .await
            .expect("append");
        store.reset(date()).await;
        assert!(store.read(date()).await.is_empty());
    }
}
