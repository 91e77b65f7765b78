//! nutrilog core engine: a local-first meal ledger with derived nutrient
//! aggregates, chart series and an optimistic favorites sync, exposed to the
//! surrounding UI layer as [`NutritionTracker`].

use chrono::NaiveDate;
use std::sync::Arc;

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod favorites;
pub mod ledger;
pub mod series;
pub mod storage;
pub mod types;
pub mod water;

mod test_utils;

pub use crate::aggregate::{AggregateStore, Aggregator};
pub use crate::catalog::{CatalogFood, FoodCatalog, FoodFacts, GlycemicBand, StaticFoodCatalog};
pub use crate::error::{CoreError, CoreResult};
pub use crate::favorites::FavoritesService;
pub use crate::ledger::LedgerStore;
pub use crate::storage::JsonKvStore;
pub use crate::types::{
    DailyAggregate, DailyLedger, FavoriteIds, FetchSource, FoodId, Goal, MealEntry, MealSlot,
    MonthPoint, MonthSeries, NutrientSeries, WeekSeries,
};
pub use crate::water::WaterLog;
pub use nutrilog_client::{
    AuthProvider, FavoriteRecord, FavoritesStore, Place, PlaceId, RemoteError, UserId,
};

/// The engine facade the UI layer drives. Owns the local stores and wires
/// them to the external collaborators (food catalog, auth provider, remote
/// favorites store).
#[derive(Clone)]
pub struct NutritionTracker {
    ledger: LedgerStore,
    aggregates: AggregateStore,
    aggregator: Aggregator,
    water: WaterLog,
    favorites: FavoritesService,
}

impl NutritionTracker {
    pub fn new(
        kv: Arc<JsonKvStore>,
        catalog: Arc<dyn FoodCatalog>,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn FavoritesStore>,
    ) -> Self {
        let ledger = LedgerStore::new(kv.clone());
        let aggregates = AggregateStore::new(kv.clone());
        let aggregator = Aggregator::new(ledger.clone(), aggregates.clone(), catalog);
        let water = WaterLog::new(kv.clone());
        let favorites = FavoritesService::new(auth, store, kv);
        Self {
            ledger,
            aggregates,
            aggregator,
            water,
            favorites,
        }
    }

    /// Append one meal entry and recompute the day's aggregate.
    pub async fn append_meal(
        &self,
        date: NaiveDate,
        slot: MealSlot,
        food_id: impl Into<FoodId>,
        quantity: u32,
    ) -> CoreResult<DailyAggregate> {
        self.ledger
            .append(
                date,
                slot,
                MealEntry {
                    food_id: food_id.into(),
                    quantity,
                },
            )
            .await?;
        Ok(self.aggregator.recompute(date).await)
    }

    /// Clear the day's ledger and re-aggregate it to zero. Irreversible.
    pub async fn reset_day(&self, date: NaiveDate) -> DailyAggregate {
        self.ledger.reset(date).await;
        self.aggregator.recompute(date).await
    }

    /// Recompute a day's aggregate from its ledger as stored.
    pub async fn recompute(&self, date: NaiveDate) -> DailyAggregate {
        self.aggregator.recompute(date).await
    }

    /// The raw ledger for a day, for the meal list on the home screen.
    pub async fn read_day(&self, date: NaiveDate) -> DailyLedger {
        self.ledger.read(date).await
    }

    /// Sunday-through-Saturday series around `reference`, against `goal`.
    pub async fn weekly_series(&self, reference: NaiveDate, goal: &Goal) -> WeekSeries {
        series::weekly(&self.aggregates, &self.water, reference, goal).await
    }

    /// Per-month averages over logged days, for the last `window_months`
    /// months with data.
    pub async fn monthly_series(&self, window_months: usize, goal: &Goal) -> MonthSeries {
        series::monthly(&self.aggregates, window_months, goal).await
    }

    /// Add to the day's water total (ml); returns the new total.
    pub async fn add_water(&self, date: NaiveDate, ml: u32) -> u32 {
        self.water.add(date, ml).await
    }

    /// The day's water total (ml).
    pub async fn water_for(&self, date: NaiveDate) -> u32 {
        self.water.read(date).await
    }

    /// Toggle a place's favorite status; returns whether it is a favorite
    /// after the call.
    pub async fn toggle_favorite(&self, place: &Place) -> CoreResult<bool> {
        self.favorites.toggle_favorite(place).await
    }

    pub async fn add_favorite(&self, place: &Place) -> CoreResult<()> {
        self.favorites.add_favorite(place).await
    }

    pub async fn remove_favorite(&self, place_id: &str) -> CoreResult<()> {
        self.favorites.remove_favorite(place_id).await
    }

    pub async fn fetch_favorite_ids(&self) -> FavoriteIds {
        self.favorites.fetch_favorite_ids().await
    }

    pub async fn fetch_favorites(&self) -> Vec<FavoriteRecord> {
        self.favorites.fetch_favorites().await
    }
}
