//! Domain types shared across the engine and exposed to the UI layer.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use nutrilog_client::{PlaceId, UserId};

pub type FoodId = String;

/// The four slots a day's meals are grouped into.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];
}

/// One logged portion of a catalog food. Immutable once appended; the only
/// way to remove entries is resetting the whole day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MealEntry {
    pub food_id: FoodId,
    pub quantity: u32,
}

/// The raw record of everything eaten on one calendar day, grouped by slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyLedger {
    pub date: NaiveDate,
    #[serde(default)]
    pub slots: BTreeMap<MealSlot, Vec<MealEntry>>,
}

impl DailyLedger {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            slots: BTreeMap::new(),
        }
    }

    /// All entries across every slot, in slot order.
    pub fn entries(&self) -> impl Iterator<Item = &MealEntry> {
        self.slots.values().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.values().all(|entries| entries.is_empty())
    }
}

/// Derived nutrient sums for one day. Always recomputable from the ledger and
/// the catalog; overwritten wholesale on every recompute, never incremented
/// in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    /// Grams, rounded to one decimal.
    pub protein: f64,
    /// Grams, rounded to one decimal.
    pub carbs: f64,
    /// Kilocalories, rounded to the nearest integer.
    pub calories: u32,
}

impl DailyAggregate {
    /// The aggregate of a day with nothing logged.
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            protein: 0.0,
            carbs: 0.0,
            calories: 0,
        }
    }
}

/// User-configured daily targets. Owned by the profile screen; the engine
/// only compares series against it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Goal {
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub water_ml: u32,
}

/// One nutrient's chart data for a week: seven values aligned to the week's
/// dates, a flat goal line of the same length, and the week mean rounded to
/// one decimal.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct NutrientSeries {
    pub values: Vec<f64>,
    pub goal_line: Vec<f64>,
    pub mean: f64,
}

/// The rolling-week chart: Sunday through Saturday around a reference date.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct WeekSeries {
    pub week_start: NaiveDate,
    pub dates: Vec<NaiveDate>,
    pub protein: NutrientSeries,
    pub carbs: NutrientSeries,
    pub calories: NutrientSeries,
    pub water_ml: NutrientSeries,
}

/// Per-month averages over the days that actually have an aggregate, not the
/// calendar length of the month.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct MonthPoint {
    /// `YYYY-MM`.
    pub month: String,
    pub protein: f64,
    pub carbs: f64,
    pub calories: u32,
}

/// The monthly chart: ascending months plus the goal the caller wants the
/// points compared against. An empty `points` means no historical data in
/// the window, as opposed to months of zero-valued days.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct MonthSeries {
    pub points: Vec<MonthPoint>,
    pub goal: Goal,
}

/// Where a favorites read was answered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub enum FetchSource {
    /// Authoritative remote answer; the local cache was realigned.
    Server,
    /// Remote unavailable; last known local cache, possibly stale.
    Cache,
    /// No authenticated user.
    Empty,
}

/// Result of a favorites id read, with its provenance so the UI can warn
/// when the data may be stale.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct FavoriteIds {
    pub user_id: Option<UserId>,
    pub ids: HashSet<PlaceId>,
    pub source: FetchSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_slot_keys_round_trip_through_json() {
        let mut ledger = DailyLedger::empty(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        ledger.slots.entry(MealSlot::Lunch).or_default().push(MealEntry {
            food_id: "apple".into(),
            quantity: 2,
        });

        let raw = serde_json::to_string(&ledger).expect("serialize");
        let back: DailyLedger = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back, ledger);
        assert_eq!(back.entries().count(), 1);
    }

    #[test]
    fn ledger_without_slots_field_deserializes_empty() {
        let back: DailyLedger = serde_json::from_str(r#"{"date":"2024-06-01"}"#).expect("parse");
        assert!(back.is_empty());
    }
}
