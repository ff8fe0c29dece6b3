//! USDA Standard Reference nutrition values for the synthesizer's food set.
//!
//! Amounts are per 100 g edible portion, in canonical nutrient order
//! ([`Nutrient::ALL`]). Macronutrients and fiber are grams, vitamins and
//! minerals are in their customary USDA units (µg RAE, mg, IU as published).

use crate::data::Nutrient;

/// Number of nutrient columns per food.
pub const N_NUTRIENTS: usize = Nutrient::ALL.len();

/// One curated food with its per-100 g nutrient amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFood {
    pub name: &'static str,
    pub category: &'static str,
    /// Amounts in [`Nutrient::ALL`] order.
    pub per_100g: [f32; N_NUTRIENTS],
}

impl ReferenceFood {
    /// The per-100 g amount of one nutrient.
    pub fn amount(&self, nutrient: Nutrient) -> f32 {
        // per_100g is laid out in Nutrient::ALL order, which is declaration order
        self.per_100g[nutrient as usize]
    }
}

/// Look up a reference food by name.
pub fn reference_food(name: &str) -> Option<&'static ReferenceFood> {
    REFERENCE_FOODS.iter().find(|food| food.name == name)
}

/// The curated reference table the synthesizer samples from.
///
/// Order: calories, protein, fat, carbohydrates, fiber, vitamin_a,
/// vitamin_c, vitamin_d, vitamin_e, calcium, iron, potassium, sodium.
#[rustfmt::skip]
pub const REFERENCE_FOODS: [ReferenceFood; 30] = [
    // Fruits
    ReferenceFood { name: "apple", category: "fruit", per_100g: [52.0, 0.3, 0.2, 14.0, 2.4, 3.0, 4.6, 0.0, 0.18, 6.0, 0.12, 107.0, 1.0] },
    ReferenceFood { name: "banana", category: "fruit", per_100g: [89.0, 1.1, 0.3, 23.0, 2.6, 3.0, 8.7, 0.0, 0.1, 5.0, 0.26, 358.0, 1.0] },
    ReferenceFood { name: "orange", category: "fruit", per_100g: [47.0, 0.9, 0.1, 12.0, 2.4, 225.0, 53.2, 0.0, 0.18, 40.0, 0.1, 181.0, 0.0] },
    ReferenceFood { name: "strawberry", category: "fruit", per_100g: [32.0, 0.7, 0.3, 8.0, 2.0, 1.0, 58.8, 0.0, 0.29, 16.0, 0.41, 153.0, 1.0] },
    ReferenceFood { name: "grape", category: "fruit", per_100g: [62.0, 0.6, 0.2, 16.0, 0.9, 3.0, 3.2, 0.0, 0.19, 10.0, 0.36, 191.0, 2.0] },
    // Vegetables
    ReferenceFood { name: "carrot", category: "vegetable", per_100g: [41.0, 0.9, 0.2, 10.0, 2.8, 835.0, 5.9, 0.0, 0.66, 33.0, 0.3, 320.0, 69.0] },
    ReferenceFood { name: "broccoli", category: "vegetable", per_100g: [34.0, 2.8, 0.4, 7.0, 2.6, 623.0, 89.2, 0.0, 0.78, 47.0, 0.73, 316.0, 33.0] },
    ReferenceFood { name: "spinach", category: "vegetable", per_100g: [23.0, 2.9, 0.4, 4.0, 2.2, 469.0, 28.1, 0.0, 2.03, 99.0, 2.71, 558.0, 79.0] },
    ReferenceFood { name: "tomato", category: "vegetable", per_100g: [18.0, 0.9, 0.2, 4.0, 1.2, 833.0, 13.7, 0.0, 0.54, 10.0, 0.27, 237.0, 5.0] },
    ReferenceFood { name: "cucumber", category: "vegetable", per_100g: [16.0, 0.7, 0.1, 4.0, 0.5, 105.0, 2.8, 0.0, 0.03, 16.0, 0.28, 147.0, 2.0] },
    // Proteins
    ReferenceFood { name: "chicken_breast", category: "protein", per_100g: [165.0, 31.0, 3.6, 0.0, 0.0, 6.0, 0.0, 0.0, 0.22, 15.0, 1.04, 256.0, 74.0] },
    ReferenceFood { name: "salmon", category: "protein", per_100g: [208.0, 25.0, 12.0, 0.0, 0.0, 149.0, 3.9, 11.0, 3.55, 9.0, 0.34, 363.0, 59.0] },
    ReferenceFood { name: "egg", category: "protein", per_100g: [155.0, 13.0, 11.0, 1.1, 0.0, 160.0, 0.0, 2.0, 1.05, 56.0, 1.75, 138.0, 124.0] },
    ReferenceFood { name: "beef", category: "protein", per_100g: [250.0, 26.0, 15.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.12, 18.0, 2.6, 318.0, 72.0] },
    ReferenceFood { name: "tofu", category: "protein", per_100g: [76.0, 8.0, 4.8, 1.9, 0.3, 0.0, 0.0, 0.0, 0.01, 130.0, 1.4, 121.0, 7.0] },
    // Grains
    ReferenceFood { name: "rice", category: "grain", per_100g: [130.0, 2.7, 0.3, 28.0, 0.4, 0.0, 0.0, 0.0, 0.11, 10.0, 0.2, 35.0, 1.0] },
    ReferenceFood { name: "bread", category: "grain", per_100g: [265.0, 9.0, 3.2, 49.0, 2.7, 0.0, 0.0, 0.0, 0.22, 49.0, 3.6, 115.0, 491.0] },
    ReferenceFood { name: "pasta", category: "grain", per_100g: [131.0, 5.0, 1.1, 25.0, 1.8, 0.0, 0.0, 0.0, 0.06, 7.0, 1.3, 44.0, 6.0] },
    ReferenceFood { name: "oatmeal", category: "grain", per_100g: [68.0, 2.4, 1.4, 12.0, 1.7, 0.0, 0.0, 0.0, 0.08, 49.0, 0.6, 61.0, 49.0] },
    ReferenceFood { name: "quinoa", category: "grain", per_100g: [120.0, 4.4, 1.9, 22.0, 2.8, 0.0, 0.0, 0.0, 0.63, 17.0, 1.49, 172.0, 7.0] },
    // Dairy
    ReferenceFood { name: "milk", category: "dairy", per_100g: [42.0, 3.4, 1.0, 5.0, 0.0, 46.0, 0.9, 1.2, 0.08, 113.0, 0.03, 150.0, 44.0] },
    ReferenceFood { name: "yogurt", category: "dairy", per_100g: [59.0, 10.0, 0.4, 3.6, 0.0, 27.0, 0.5, 0.1, 0.06, 110.0, 0.07, 141.0, 36.0] },
    ReferenceFood { name: "cheese", category: "dairy", per_100g: [402.0, 25.0, 33.0, 1.3, 0.0, 265.0, 0.0, 0.6, 0.21, 721.0, 0.68, 98.0, 621.0] },
    ReferenceFood { name: "butter", category: "dairy", per_100g: [717.0, 0.9, 81.0, 0.1, 0.0, 684.0, 0.0, 1.5, 2.32, 24.0, 0.02, 24.0, 11.0] },
    ReferenceFood { name: "cream", category: "dairy", per_100g: [340.0, 2.1, 37.0, 2.8, 0.0, 97.0, 0.6, 0.5, 0.76, 65.0, 0.05, 95.0, 43.0] },
    // Nuts and seeds
    ReferenceFood { name: "almond", category: "nut", per_100g: [579.0, 21.0, 50.0, 22.0, 12.5, 0.0, 0.0, 0.0, 25.63, 269.0, 3.71, 733.0, 1.0] },
    ReferenceFood { name: "peanut", category: "nut", per_100g: [567.0, 26.0, 49.0, 16.0, 8.5, 0.0, 0.0, 0.0, 8.33, 92.0, 4.58, 705.0, 18.0] },
    ReferenceFood { name: "walnut", category: "nut", per_100g: [654.0, 15.0, 65.0, 14.0, 6.7, 0.0, 1.3, 0.0, 0.7, 98.0, 2.91, 441.0, 2.0] },
    ReferenceFood { name: "sunflower_seed", category: "nut", per_100g: [584.0, 21.0, 51.0, 20.0, 8.6, 0.0, 1.4, 0.0, 35.17, 78.0, 5.25, 645.0, 9.0] },
    ReferenceFood { name: "chia_seed", category: "nut", per_100g: [486.0, 17.0, 31.0, 42.0, 34.4, 0.0, 1.6, 0.0, 0.5, 631.0, 7.72, 407.0, 16.0] },
];
