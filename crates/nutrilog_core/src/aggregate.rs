//! Aggregation engine and the derived-aggregate store.
//!
//! Aggregates are materialized so chart reads never re-walk raw ledgers.
//! They stay derived data: every recompute walks the full ledger for the
//! date and overwrites the stored aggregate, which keeps repeated partial
//! updates from drifting.

use crate::catalog::FoodCatalog;
use crate::ledger::LedgerStore;
use crate::storage::JsonKvStore;
use crate::types::DailyAggregate;
use chrono::NaiveDate;
use std::sync::Arc;

const TOTALS_KEY_PREFIX: &str = "totals_";

fn totals_key(date: NaiveDate) -> String {
    format!("{TOTALS_KEY_PREFIX}{}", date.format("%Y-%m-%d"))
}

/// Round grams to one decimal, ties to even on the tenths digit.
pub(crate) fn round_tenths(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

/// Store of materialized per-day aggregates, keyed by date.
#[derive(Clone)]
pub struct AggregateStore {
    kv: Arc<JsonKvStore>,
}

impl AggregateStore {
    pub fn new(kv: Arc<JsonKvStore>) -> Self {
        Self { kv }
    }

    pub async fn load(&self, date: NaiveDate) -> Option<DailyAggregate> {
        self.kv.get(&totals_key(date)).await
    }

    pub async fn save(&self, aggregate: &DailyAggregate) {
        self.kv.put(&totals_key(aggregate.date), aggregate).await;
    }

    /// Every persisted aggregate, in no particular order.
    pub async fn load_all(&self) -> Vec<DailyAggregate> {
        self.kv.load_prefix(TOTALS_KEY_PREFIX).await
    }
}

/// Recomputes a day's aggregate from its ledger and the catalog.
#[derive(Clone)]
pub struct Aggregator {
    ledger: LedgerStore,
    aggregates: AggregateStore,
    catalog: Arc<dyn FoodCatalog>,
}

impl Aggregator {
    pub fn new(ledger: LedgerStore, aggregates: AggregateStore, catalog: Arc<dyn FoodCatalog>) -> Self {
        Self {
            ledger,
            aggregates,
            catalog,
        }
    }

    /// Walk every entry in every slot of the date's ledger, resolve facts,
    /// accumulate, round, persist. Entries with an unresolved food id
    /// contribute nothing but stay in the ledger; they start counting the
    /// moment the catalog learns the id. Idempotent for an unchanged ledger.
    pub async fn recompute(&self, date: NaiveDate) -> DailyAggregate {
        let ledger = self.ledger.read(date).await;

        let mut protein = 0.0;
        let mut carbs = 0.0;
        let mut calories = 0.0;
        for entry in ledger.entries() {
            let Some(facts) = self.catalog.lookup(&entry.food_id) else {
                metrics::counter!("nutrilog_unresolved_food_total").increment(1);
                tracing::warn!(
                    food_id = %entry.food_id,
                    %date,
                    "meal entry references a food the catalog does not know; skipped from totals"
                );
                continue;
            };
            let quantity = f64::from(entry.quantity);
            protein += facts.protein * quantity;
            carbs += facts.carbs * quantity;
            calories += facts.calories * quantity;
        }

        let aggregate = DailyAggregate {
            date,
            protein: round_tenths(protein),
            carbs: round_tenths(carbs),
            calories: calories.round() as u32,
        };
        self.aggregates.save(&aggregate).await;
        aggregate
    }
}
