//! Food catalog accessor.
//!
//! The catalog is an external reference table: the engine only resolves meal
//! entries against it by identifier. A bundled in-memory table ships with the
//! crate so the picker works offline; a lagging catalog (user-created foods
//! not yet present) is an expected condition, not an error.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::FoodId;

/// Per-unit macro content for one catalog food.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FoodFacts {
    /// Grams of protein per unit.
    pub protein: f64,
    /// Grams of carbohydrate per unit.
    pub carbs: f64,
    /// Kilocalories per unit.
    pub calories: f64,
}

/// Glycemic-index band shown next to a food in the picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GlycemicBand {
    VeryLow,
    Low,
    Medium,
    High,
}

/// A full catalog row: facts plus the display metadata the picker renders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogFood {
    pub id: FoodId,
    pub name: String,
    pub description: Option<String>,
    pub facts: FoodFacts,
    pub glycemic: Option<GlycemicBand>,
}

pub trait FoodCatalog: Send + Sync + 'static {
    /// Resolve a food id to its per-unit facts. `None` means the catalog
    /// does not (yet) know the id.
    fn lookup(&self, id: &str) -> Option<FoodFacts>;

    /// Case-insensitive substring search over food names, for the picker.
    fn search(&self, query: &str) -> Vec<CatalogFood>;
}

/// In-memory catalog over a fixed table.
pub struct StaticFoodCatalog {
    foods: Vec<CatalogFood>,
    by_id: HashMap<FoodId, usize>,
}

impl StaticFoodCatalog {
    pub fn new(foods: Vec<CatalogFood>) -> Self {
        let by_id = foods
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id.clone(), i))
            .collect();
        Self { foods, by_id }
    }

    /// The bundled reference table.
    pub fn reference() -> Self {
        fn food(
            id: &str,
            name: &str,
            description: &str,
            protein: f64,
            carbs: f64,
            calories: f64,
            glycemic: GlycemicBand,
        ) -> CatalogFood {
            CatalogFood {
                id: id.into(),
                name: name.into(),
                description: Some(description.into()),
                facts: FoodFacts {
                    protein,
                    carbs,
                    calories,
                },
                glycemic: Some(glycemic),
            }
        }

        use GlycemicBand::*;
        Self::new(vec![
            food("rolled-oats", "Rolled oats", "Grains / 30g", 4.0, 20.0, 117.0, Low),
            food("grilled-chicken-breast", "Grilled chicken breast", "Meat / 100g", 31.0, 0.0, 165.0, VeryLow),
            food("steamed-broccoli", "Steamed broccoli", "Vegetables / 100g", 3.0, 7.0, 34.0, VeryLow),
            food("cooked-brown-rice", "Cooked brown rice", "Grains / 100g", 2.6, 23.0, 111.0, Medium),
            food("apple", "Apple", "Fruit / 100g", 0.3, 14.0, 52.0, Low),
            food("banana", "Banana", "Fruit / 118g", 1.3, 27.0, 105.0, Medium),
            food("pinto-beans", "Cooked pinto beans", "Legumes / 100g", 8.7, 14.0, 127.0, VeryLow),
            food("boiled-egg", "Boiled egg", "Eggs / 1 unit", 6.0, 0.6, 68.0, VeryLow),
            food("whole-wheat-bread", "Whole wheat bread", "Bread / 50g", 5.0, 23.0, 130.0, Medium),
            food("grilled-salmon", "Grilled salmon", "Fish / 100g", 20.0, 0.0, 208.0, VeryLow),
            food("plain-nonfat-yogurt", "Plain nonfat yogurt", "Dairy / 170g", 10.0, 17.0, 100.0, Low),
            food("fresh-cheese", "Fresh white cheese", "Dairy / 30g", 6.0, 1.0, 90.0, VeryLow),
            food("raw-broccoli", "Raw broccoli", "Vegetables / 100g", 2.5, 7.0, 31.0, VeryLow),
            food("boiled-potato", "Boiled potato", "Tubers / 100g", 2.0, 20.0, 87.0, High),
            food("cooked-white-rice", "Cooked white rice", "Grains / 100g", 2.4, 28.0, 130.0, High),
            food("black-beans", "Cooked black beans", "Legumes / 100g", 9.0, 14.0, 132.0, VeryLow),
            food("whole-milk", "Whole milk", "Dairy / 200ml", 6.6, 10.0, 122.0, Low),
            food("skim-milk", "Skim milk", "Dairy / 200ml", 7.0, 10.0, 70.0, Low),
            food("chocolate-milk", "Chocolate milk", "Drinks / 200ml", 6.0, 26.0, 150.0, Medium),
            food("orange-juice", "Orange juice", "Drinks / 200ml", 1.6, 20.0, 88.0, Medium),
            food("apple-juice", "Apple juice", "Drinks / 200ml", 0.2, 24.0, 96.0, Medium),
            food("fruit-yogurt", "Fruit yogurt", "Dairy / 170g", 5.0, 18.0, 140.0, Low),
        ])
    }
}

impl FoodCatalog for StaticFoodCatalog {
    fn lookup(&self, id: &str) -> Option<FoodFacts> {
        self.by_id.get(id).map(|&i| self.foods[i].facts)
    }

    fn search(&self, query: &str) -> Vec<CatalogFood> {
        let needle = query.trim().to_lowercase();
        self.foods
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}
