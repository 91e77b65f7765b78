//! Time-series builder: weekly and monthly chart series over stored
//! aggregates, compared against a caller-supplied goal.

use crate::aggregate::{AggregateStore, round_tenths};
use crate::types::{DailyAggregate, Goal, MonthPoint, MonthSeries, NutrientSeries, WeekSeries};
use crate::water::WaterLog;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// The most recent Sunday at or before `reference` (Sunday = day 0 of the
/// week).
pub fn week_start(reference: NaiveDate) -> NaiveDate {
    reference - Duration::days(i64::from(reference.weekday().num_days_from_sunday()))
}

fn nutrient_series(values: Vec<f64>, goal: f64) -> NutrientSeries {
    let mean = round_tenths(values.iter().sum::<f64>() / values.len() as f64);
    NutrientSeries {
        goal_line: vec![goal; values.len()],
        values,
        mean,
    }
}

/// Seven days starting from the week's Sunday. A date with no stored
/// aggregate contributes zero: a day with nothing logged is a zero day, not
/// a gap.
pub async fn weekly(
    aggregates: &AggregateStore,
    water: &WaterLog,
    reference: NaiveDate,
    goal: &Goal,
) -> WeekSeries {
    let start = week_start(reference);
    let dates: Vec<NaiveDate> = (0..7).map(|i| start + Duration::days(i)).collect();

    let mut protein = Vec::with_capacity(7);
    let mut carbs = Vec::with_capacity(7);
    let mut calories = Vec::with_capacity(7);
    let mut water_ml = Vec::with_capacity(7);
    for date in &dates {
        let aggregate = aggregates
            .load(*date)
            .await
            .unwrap_or_else(|| DailyAggregate::zero(*date));
        protein.push(aggregate.protein);
        carbs.push(aggregate.carbs);
        calories.push(f64::from(aggregate.calories));
        water_ml.push(f64::from(water.read(*date).await));
    }

    WeekSeries {
        week_start: start,
        dates,
        protein: nutrient_series(protein, goal.protein),
        carbs: nutrient_series(carbs, goal.carbs),
        calories: nutrient_series(calories, f64::from(goal.calories)),
        water_ml: nutrient_series(water_ml, f64::from(goal.water_ml)),
    }
}

/// Group every stored aggregate by calendar month and average over the days
/// that actually have an aggregate, then keep the last `window_months`
/// months. Reports "a typical day when you did log", not an average diluted
/// by forgotten days; an empty result means no history at all.
pub async fn monthly(
    aggregates: &AggregateStore,
    window_months: usize,
    goal: &Goal,
) -> MonthSeries {
    struct MonthAccum {
        protein: f64,
        carbs: f64,
        calories: u64,
        days: u32,
    }

    // BTreeMap keys are `YYYY-MM`, so iteration order is chronological.
    let mut by_month: BTreeMap<String, MonthAccum> = BTreeMap::new();
    for aggregate in aggregates.load_all().await {
        let month = aggregate.date.format("%Y-%m").to_string();
        let accum = by_month.entry(month).or_insert(MonthAccum {
            protein: 0.0,
            carbs: 0.0,
            calories: 0,
            days: 0,
        });
        accum.protein += aggregate.protein;
        accum.carbs += aggregate.carbs;
        accum.calories += u64::from(aggregate.calories);
        accum.days += 1;
    }

    let mut points: Vec<MonthPoint> = by_month
        .into_iter()
        .map(|(month, accum)| {
            let days = f64::from(accum.days);
            MonthPoint {
                month,
                protein: round_tenths(accum.protein / days),
                carbs: round_tenths(accum.carbs / days),
                calories: (accum.calories as f64 / days).round() as u32,
            }
        })
        .collect();

    let skip = points.len().saturating_sub(window_months);
    points.drain(..skip);

    MonthSeries {
        points,
        goal: goal.clone(),
    }
}
