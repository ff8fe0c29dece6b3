//! The fixed set of predicted nutrients.
//!
//! Every model generation targets exactly these nutrients. Corpora may carry
//! any subset of the matching target columns; a nutrient without a column
//! simply ends up without a model.

use serde::{Deserialize, Serialize};

/// A nutrient tracked by the prediction engine.
///
/// The set is closed: downstream consumers (persisted artifacts, CLI output,
/// report keys) all index by this enum rather than by free-form strings.
/// Variant order is the canonical column order used in synthesized corpora,
/// and `Ord` follows it, so `BTreeMap<Nutrient, _>` iterates canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    /// Energy in kcal per portion.
    Calories,
    Protein,
    Fat,
    Carbohydrates,
    Fiber,
    VitaminA,
    VitaminC,
    VitaminD,
    VitaminE,
    Calcium,
    Iron,
    Potassium,
    Sodium,
}

impl Nutrient {
    /// All nutrients in canonical column order.
    pub const ALL: [Nutrient; 13] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Carbohydrates,
        Nutrient::Fiber,
        Nutrient::VitaminA,
        Nutrient::VitaminC,
        Nutrient::VitaminD,
        Nutrient::VitaminE,
        Nutrient::Calcium,
        Nutrient::Iron,
        Nutrient::Potassium,
        Nutrient::Sodium,
    ];

    /// The corpus column name for this nutrient.
    pub fn column_name(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Fat => "fat",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Fiber => "fiber",
            Nutrient::VitaminA => "vitamin_a",
            Nutrient::VitaminC => "vitamin_c",
            Nutrient::VitaminD => "vitamin_d",
            Nutrient::VitaminE => "vitamin_e",
            Nutrient::Calcium => "calcium",
            Nutrient::Iron => "iron",
            Nutrient::Potassium => "potassium",
            Nutrient::Sodium => "sodium",
        }
    }

    /// Resolve a corpus column name, returning `None` for unknown columns.
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|n| n.column_name() == name)
    }
}

impl std::fmt::Display for Nutrient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}
