//! Schema types for generation serialization.
//!
//! These types provide a stable serialization format independent of runtime
//! types. Schema types are separate from runtime types for:
//! - Forward/backward compatibility (schema can evolve independently)
//! - Validation during deserialization
//! - Clear migration paths between schema versions
//!
//! Every artifact file carries its own `version` field so a reader can
//! reject files written by an incompatible build before looking at the
//! payload. Maps use `BTreeMap` for deterministic JSON output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Current artifact schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Tree schema (SoA layout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSchema {
    /// Number of nodes (internal + leaves).
    pub num_nodes: u32,
    /// Split feature index for each node (ignored for leaves).
    pub split_indices: Vec<u32>,
    /// Split threshold for each node (ignored for leaves).
    pub thresholds: Vec<f64>,
    /// Left child index for each node.
    pub children_left: Vec<u32>,
    /// Right child index for each node.
    pub children_right: Vec<u32>,
    /// Default direction for missing values, per node.
    pub default_left: Vec<bool>,
    /// Leaf marker per node.
    pub is_leaf: Vec<bool>,
    /// Leaf prediction per node (ignored for internal nodes).
    pub leaf_values: Vec<f64>,
}

/// One persisted per-nutrient forest (`<nutrient>_model.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestSchema {
    pub version: u32,
    /// Nutrient column name, doubling as a file/content consistency check.
    pub nutrient: String,
    /// Input width every tree was trained against.
    pub n_features: u32,
    pub trees: Vec<TreeSchema>,
}

/// Persisted scaler parameters (`scaler.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerSchema {
    pub version: u32,
    pub means: Vec<f64>,
    /// Divisors as applied by the transform (zero-variance columns store 1).
    pub stds: Vec<f64>,
}

/// Persisted codebooks (`codebooks.json`).
///
/// Each field maps to its ordered value list; a value's index is its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodebooksSchema {
    pub version: u32,
    pub fields: BTreeMap<String, Vec<String>>,
}

/// Persisted feature column order (`feature_names.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureNamesSchema {
    pub version: u32,
    pub columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_names_serde_shape() {
        let schema = FeatureNamesSchema {
            version: SCHEMA_VERSION,
            columns: vec!["portion_size".into(), "food_name_encoded".into()],
        };
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(
            json,
            r#"{"version":1,"columns":["portion_size","food_name_encoded"]}"#
        );

        let parsed: FeatureNamesSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn codebooks_fields_are_ordered() {
        let mut fields = BTreeMap::new();
        fields.insert("portion_unit".to_owned(), vec!["g".to_owned()]);
        fields.insert("food_name".to_owned(), vec!["apple".to_owned()]);
        let schema = CodebooksSchema {
            version: SCHEMA_VERSION,
            fields,
        };

        let json = serde_json::to_string(&schema).unwrap();
        // BTreeMap keys serialize sorted regardless of insertion order
        assert!(json.find("food_name").unwrap() < json.find("portion_unit").unwrap());
    }

    #[test]
    fn forest_schema_round_trip() {
        let schema = ForestSchema {
            version: SCHEMA_VERSION,
            nutrient: "calories".into(),
            n_features: 4,
            trees: vec![TreeSchema {
                num_nodes: 1,
                split_indices: vec![0],
                thresholds: vec![0.0],
                children_left: vec![0],
                children_right: vec![0],
                default_left: vec![true],
                is_leaf: vec![true],
                leaf_values: vec![52.0],
            }],
        };

        let json = serde_json::to_string(&schema).unwrap();
        let parsed: ForestSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn scaler_schema_rejects_missing_fields() {
        let result: Result<ScalerSchema, _> = serde_json::from_str(r#"{"version":1}"#);
        assert!(result.is_err());
    }
}
