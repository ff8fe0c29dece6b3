//! The ordered feature schema of a model generation.
//!
//! The schema pins which feature columns the models were trained on and in
//! what order. Feature vectors built for prediction must follow it exactly;
//! reordering or dropping an entry changes what every split threshold means.

use super::codebook::CategoricalField;
use super::corpus::CorpusColumns;

/// One feature column in the model input matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Raw portion size in grams.
    PortionSize,
    /// Integer code of the food name.
    FoodName,
    /// Integer code of the food category.
    FoodCategory,
    /// Integer code of the portion unit.
    PortionUnit,
}

impl FeatureKind {
    /// All feature kinds in canonical schema order.
    pub const ALL: [FeatureKind; 4] = [
        FeatureKind::PortionSize,
        FeatureKind::FoodName,
        FeatureKind::FoodCategory,
        FeatureKind::PortionUnit,
    ];

    /// The persisted column name of this feature.
    ///
    /// Encoded categorical features carry an `_encoded` suffix to
    /// distinguish them from the raw corpus columns.
    pub fn column_name(self) -> &'static str {
        match self {
            FeatureKind::PortionSize => "portion_size",
            FeatureKind::FoodName => "food_name_encoded",
            FeatureKind::FoodCategory => "food_category_encoded",
            FeatureKind::PortionUnit => "portion_unit_encoded",
        }
    }

    /// Resolve a persisted column name, returning `None` for unknown names.
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.column_name() == name)
    }

    /// The categorical field backing this feature, if any.
    pub fn categorical_field(self) -> Option<CategoricalField> {
        match self {
            FeatureKind::PortionSize => None,
            FeatureKind::FoodName => Some(CategoricalField::FoodName),
            FeatureKind::FoodCategory => Some(CategoricalField::FoodCategory),
            FeatureKind::PortionUnit => Some(CategoricalField::PortionUnit),
        }
    }
}

/// Schema rebuild errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown feature column {0:?}")]
    UnknownColumn(String),

    #[error("duplicate feature column {0:?}")]
    DuplicateColumn(String),
}

/// The ordered list of feature columns a generation was trained with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    features: Vec<FeatureKind>,
}

impl FeatureSchema {
    /// Derive the schema from the columns present in a corpus.
    ///
    /// Present columns enter in canonical order; absent ones are skipped, so
    /// the schema may hold anywhere from zero to four entries.
    pub fn from_columns(columns: &CorpusColumns) -> Self {
        let mut features = Vec::new();
        if columns.portion_size {
            features.push(FeatureKind::PortionSize);
        }
        if columns.food_name {
            features.push(FeatureKind::FoodName);
        }
        if columns.food_category {
            features.push(FeatureKind::FoodCategory);
        }
        if columns.portion_unit {
            features.push(FeatureKind::PortionUnit);
        }
        FeatureSchema { features }
    }

    /// Rebuild a schema from persisted column names, preserving their order.
    pub fn from_column_names<S: AsRef<str>>(names: &[S]) -> Result<Self, SchemaError> {
        let mut features = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let kind = FeatureKind::from_column_name(name)
                .ok_or_else(|| SchemaError::UnknownColumn(name.to_owned()))?;
            if features.contains(&kind) {
                return Err(SchemaError::DuplicateColumn(name.to_owned()));
            }
            features.push(kind);
        }
        Ok(FeatureSchema { features })
    }

    pub fn features(&self) -> &[FeatureKind] {
        &self.features
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.features.iter().map(|k| k.column_name()).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_columns() -> CorpusColumns {
        CorpusColumns {
            portion_size: true,
            food_name: true,
            food_category: true,
            portion_unit: true,
            nutrients: Vec::new(),
        }
    }

    #[test]
    fn test_from_columns_full_schema_in_canonical_order() {
        let schema = FeatureSchema::from_columns(&all_columns());
        assert_eq!(schema.features(), &FeatureKind::ALL);
        assert_eq!(
            schema.column_names(),
            vec![
                "portion_size",
                "food_name_encoded",
                "food_category_encoded",
                "portion_unit_encoded",
            ]
        );
    }

    #[test]
    fn test_from_columns_skips_absent_fields() {
        let mut columns = all_columns();
        columns.portion_size = false;
        columns.portion_unit = false;
        let schema = FeatureSchema::from_columns(&columns);
        assert_eq!(
            schema.features(),
            &[FeatureKind::FoodName, FeatureKind::FoodCategory]
        );
    }

    #[test]
    fn test_from_column_names_round_trip() {
        let schema = FeatureSchema::from_columns(&all_columns());
        let rebuilt = FeatureSchema::from_column_names(&schema.column_names()).unwrap();
        assert_eq!(rebuilt, schema);
    }

    #[test]
    fn test_from_column_names_preserves_order() {
        let names = ["food_category_encoded", "portion_size"];
        let schema = FeatureSchema::from_column_names(&names).unwrap();
        assert_eq!(
            schema.features(),
            &[FeatureKind::FoodCategory, FeatureKind::PortionSize]
        );
    }

    #[test]
    fn test_from_column_names_rejects_unknown() {
        let err = FeatureSchema::from_column_names(&["portion_size", "brand"]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownColumn(name) if name == "brand"));
    }

    #[test]
    fn test_from_column_names_rejects_duplicates() {
        let err =
            FeatureSchema::from_column_names(&["portion_size", "portion_size"]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn(_)));
    }

    #[test]
    fn test_categorical_field_mapping() {
        assert_eq!(FeatureKind::PortionSize.categorical_field(), None);
        assert_eq!(
            FeatureKind::FoodName.categorical_field(),
            Some(CategoricalField::FoodName)
        );
    }
}
