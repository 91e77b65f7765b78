//! Drives the engine end to end against in-memory collaborators: logs a
//! day's meals, prints the aggregate, then the weekly series.
//!
//! Run with: cargo run -p nutrilog_core --example daily_summary

use async_trait::async_trait;
use chrono::NaiveDate;
use nutrilog_core::{
    AuthProvider, FavoriteRecord, FavoritesStore, Goal, JsonKvStore, MealSlot, NutritionTracker,
    Place, RemoteError, StaticFoodCatalog, UserId,
};
use std::sync::Arc;
use tokio::sync::Mutex;

struct DemoAuth;

#[async_trait]
impl AuthProvider for DemoAuth {
    async fn current_user_id(&self) -> Option<UserId> {
        Some("demo-user".into())
    }
}

#[derive(Default)]
struct DemoStore {
    rows: Mutex<Vec<FavoriteRecord>>,
}

#[async_trait]
impl FavoritesStore for DemoStore {
    async fn upsert(&self, record: &FavoriteRecord) -> Result<(), RemoteError> {
        let mut rows = self.rows.lock().await;
        rows.retain(|r| !(r.user_id == record.user_id && r.place_id == record.place_id));
        rows.push(record.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str, place_id: &str) -> Result<(), RemoteError> {
        let mut rows = self.rows.lock().await;
        rows.retain(|r| !(r.user_id == user_id && r.place_id == place_id));
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<FavoriteRecord>, RemoteError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_env = std::env::var("NUTRILOG_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    let data_dir = tempfile::tempdir()?;
    let kv = Arc::new(JsonKvStore::open(data_dir.path()).await?);
    let tracker = NutritionTracker::new(
        kv,
        Arc::new(StaticFoodCatalog::reference()),
        Arc::new(DemoAuth),
        Arc::new(DemoStore::default()),
    );

    let today = NaiveDate::from_ymd_opt(2024, 6, 5).expect("valid date");
    tracker.append_meal(today, MealSlot::Breakfast, "rolled-oats", 1).await?;
    tracker.append_meal(today, MealSlot::Breakfast, "banana", 1).await?;
    tracker.append_meal(today, MealSlot::Lunch, "grilled-chicken-breast", 1).await?;
    tracker.append_meal(today, MealSlot::Lunch, "cooked-brown-rice", 2).await?;
    let aggregate = tracker
        .append_meal(today, MealSlot::Dinner, "grilled-salmon", 1)
        .await?;
    tracker.add_water(today, 1500).await;

    tracing::info!(
        date = %aggregate.date,
        protein = aggregate.protein,
        carbs = aggregate.carbs,
        calories = aggregate.calories,
        "daily totals"
    );

    let goal = Goal {
        calories: 1800,
        protein: 120.0,
        carbs: 220.0,
        water_ml: 2000,
    };
    let week = tracker.weekly_series(today, &goal).await;
    tracing::info!(
        week_start = %week.week_start,
        calories_mean = week.calories.mean,
        water_mean = week.water_ml.mean,
        "weekly series"
    );

    let favorite = Place {
        id: "green-bowl".into(),
        name: "Green Bowl".into(),
        kind: "restaurant".into(),
        address: Some("12 Oak St".into()),
        latitude: None,
        longitude: None,
    };
    let now_favorite = tracker.toggle_favorite(&favorite).await?;
    tracing::info!(place = %favorite.name, now_favorite, "favorite toggled");

    Ok(())
}
