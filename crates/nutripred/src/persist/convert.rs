//! Conversion between runtime types and schema types.
//!
//! Writing is infallible (`From`); reading is validated (`TryFrom`), so a
//! garbled artifact surfaces as a [`ReadError`] instead of a panic or a
//! silently wrong model.

use super::error::ReadError;
use super::schema::{
    CodebooksSchema, FeatureNamesSchema, ForestSchema, ScalerSchema, TreeSchema, SCHEMA_VERSION,
};
use crate::data::{CategoricalField, Codebook, CodebookSet, FeatureSchema, Nutrient, StandardScaler};
use crate::repr::{BaggedForest, RegressionTree};

// =============================================================================
// Tree conversions
// =============================================================================

impl From<&RegressionTree> for TreeSchema {
    fn from(tree: &RegressionTree) -> Self {
        let n_nodes = tree.n_nodes();
        let nodes = 0..n_nodes as u32;

        TreeSchema {
            num_nodes: n_nodes as u32,
            split_indices: nodes.clone().map(|id| tree.split_index(id)).collect(),
            thresholds: nodes
                .clone()
                .map(|id| tree.split_threshold(id) as f64)
                .collect(),
            children_left: nodes.clone().map(|id| tree.left_child(id)).collect(),
            children_right: nodes.clone().map(|id| tree.right_child(id)).collect(),
            default_left: nodes.clone().map(|id| tree.default_left(id)).collect(),
            is_leaf: nodes.clone().map(|id| tree.is_leaf(id)).collect(),
            leaf_values: nodes.map(|id| tree.leaf_value(id) as f64).collect(),
        }
    }
}

fn check_len(name: &'static str, len: usize, n_nodes: usize) -> Result<(), ReadError> {
    if len != n_nodes {
        return Err(ReadError::Validation(format!(
            "tree array {name} has {len} entries for {n_nodes} nodes"
        )));
    }
    Ok(())
}

impl TryFrom<TreeSchema> for RegressionTree {
    type Error = ReadError;

    fn try_from(schema: TreeSchema) -> Result<Self, Self::Error> {
        let n_nodes = schema.num_nodes as usize;
        check_len("split_indices", schema.split_indices.len(), n_nodes)?;
        check_len("thresholds", schema.thresholds.len(), n_nodes)?;
        check_len("children_left", schema.children_left.len(), n_nodes)?;
        check_len("children_right", schema.children_right.len(), n_nodes)?;
        check_len("default_left", schema.default_left.len(), n_nodes)?;
        check_len("is_leaf", schema.is_leaf.len(), n_nodes)?;
        check_len("leaf_values", schema.leaf_values.len(), n_nodes)?;

        let tree = RegressionTree::new(
            schema.split_indices,
            schema.thresholds.into_iter().map(|t| t as f32).collect(),
            schema.children_left,
            schema.children_right,
            schema.default_left,
            schema.is_leaf,
            schema.leaf_values.into_iter().map(|v| v as f32).collect(),
        );
        tree.validate()
            .map_err(|e| ReadError::Validation(e.to_string()))?;
        Ok(tree)
    }
}

// =============================================================================
// Forest conversions
// =============================================================================

/// Serialize a per-nutrient forest.
pub fn forest_to_schema(nutrient: Nutrient, forest: &BaggedForest) -> ForestSchema {
    ForestSchema {
        version: SCHEMA_VERSION,
        nutrient: nutrient.column_name().to_owned(),
        n_features: forest.n_features() as u32,
        trees: forest.trees().map(TreeSchema::from).collect(),
    }
}

/// Rebuild a per-nutrient forest, checking it belongs to `expected`.
pub fn forest_from_schema(
    expected: Nutrient,
    schema: ForestSchema,
) -> Result<BaggedForest, ReadError> {
    if schema.nutrient != expected.column_name() {
        return Err(ReadError::Validation(format!(
            "forest artifact is for nutrient {:?} but was loaded as {}",
            schema.nutrient, expected
        )));
    }

    let n_features = schema.n_features as usize;
    let mut forest = BaggedForest::new(n_features);
    for tree in schema.trees {
        forest.push_tree(RegressionTree::try_from(tree)?);
    }
    forest
        .validate()
        .map_err(|e| ReadError::Validation(e.to_string()))?;
    Ok(forest)
}

// =============================================================================
// Scaler conversions
// =============================================================================

impl From<&StandardScaler> for ScalerSchema {
    fn from(scaler: &StandardScaler) -> Self {
        ScalerSchema {
            version: SCHEMA_VERSION,
            means: scaler.means().iter().map(|&m| m as f64).collect(),
            stds: scaler.stds().iter().map(|&s| s as f64).collect(),
        }
    }
}

impl TryFrom<ScalerSchema> for StandardScaler {
    type Error = ReadError;

    fn try_from(schema: ScalerSchema) -> Result<Self, Self::Error> {
        StandardScaler::from_parts(
            schema.means.into_iter().map(|m| m as f32).collect(),
            schema.stds.into_iter().map(|s| s as f32).collect(),
        )
        .map_err(|e| ReadError::Validation(e.to_string()))
    }
}

// =============================================================================
// Codebook conversions
// =============================================================================

impl From<&CodebookSet> for CodebooksSchema {
    fn from(set: &CodebookSet) -> Self {
        CodebooksSchema {
            version: SCHEMA_VERSION,
            fields: set
                .iter()
                .map(|(field, book)| (field.column_name().to_owned(), book.values().to_vec()))
                .collect(),
        }
    }
}

impl TryFrom<CodebooksSchema> for CodebookSet {
    type Error = ReadError;

    fn try_from(schema: CodebooksSchema) -> Result<Self, Self::Error> {
        let mut set = CodebookSet::default();
        for (name, values) in schema.fields {
            let field = CategoricalField::from_column_name(&name).ok_or_else(|| {
                ReadError::Validation(format!("unknown codebook field {name:?}"))
            })?;
            let book = Codebook::from_values(values)
                .map_err(|e| ReadError::Validation(format!("codebook {name}: {e}")))?;
            set.insert(field, book);
        }
        Ok(set)
    }
}

// =============================================================================
// Feature schema conversions
// =============================================================================

impl From<&FeatureSchema> for FeatureNamesSchema {
    fn from(schema: &FeatureSchema) -> Self {
        FeatureNamesSchema {
            version: SCHEMA_VERSION,
            columns: schema
                .column_names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl TryFrom<FeatureNamesSchema> for FeatureSchema {
    type Error = ReadError;

    fn try_from(schema: FeatureNamesSchema) -> Result<Self, Self::Error> {
        FeatureSchema::from_column_names(&schema.columns)
            .map_err(|e| ReadError::Validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> RegressionTree {
        RegressionTree::new(
            vec![1, 0, 0],
            vec![2.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, true, true],
            vec![false, true, true],
            vec![0.0, 10.0, 20.0],
        )
    }

    #[test]
    fn test_tree_round_trip() {
        let tree = stump();
        let schema = TreeSchema::from(&tree);
        let rebuilt = RegressionTree::try_from(schema).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn test_tree_rejects_wrong_array_length() {
        let mut schema = TreeSchema::from(&stump());
        schema.leaf_values.pop();
        assert!(matches!(
            RegressionTree::try_from(schema),
            Err(ReadError::Validation(_))
        ));
    }

    #[test]
    fn test_tree_rejects_broken_structure() {
        let mut schema = TreeSchema::from(&stump());
        schema.children_left[0] = 9;
        assert!(matches!(
            RegressionTree::try_from(schema),
            Err(ReadError::Validation(_))
        ));
    }

    #[test]
    fn test_forest_round_trip() {
        let forest = BaggedForest::from_trees(vec![stump(), RegressionTree::leaf(3.0)], 2);
        let schema = forest_to_schema(Nutrient::Calories, &forest);
        assert_eq!(schema.nutrient, "calories");

        let rebuilt = forest_from_schema(Nutrient::Calories, schema).unwrap();
        assert_eq!(rebuilt, forest);
    }

    #[test]
    fn test_forest_rejects_nutrient_mismatch() {
        let forest = BaggedForest::from_trees(vec![RegressionTree::leaf(1.0)], 1);
        let schema = forest_to_schema(Nutrient::Calories, &forest);
        assert!(matches!(
            forest_from_schema(Nutrient::Protein, schema),
            Err(ReadError::Validation(_))
        ));
    }

    #[test]
    fn test_forest_rejects_out_of_range_split() {
        let forest = BaggedForest::from_trees(vec![stump()], 2);
        let mut schema = forest_to_schema(Nutrient::Iron, &forest);
        // claim a narrower input than the trees actually use
        schema.n_features = 1;
        assert!(matches!(
            forest_from_schema(Nutrient::Iron, schema),
            Err(ReadError::Validation(_))
        ));
    }

    #[test]
    fn test_scaler_round_trip_and_validation() {
        let scaler = StandardScaler::from_parts(vec![1.0, 2.0], vec![0.5, 1.0]).unwrap();
        let schema = ScalerSchema::from(&scaler);
        let rebuilt = StandardScaler::try_from(schema).unwrap();
        assert_eq!(rebuilt, scaler);

        let bad = ScalerSchema {
            version: SCHEMA_VERSION,
            means: vec![0.0],
            stds: vec![0.0],
        };
        assert!(matches!(
            StandardScaler::try_from(bad),
            Err(ReadError::Validation(_))
        ));
    }

    #[test]
    fn test_codebooks_round_trip() {
        let mut set = CodebookSet::default();
        set.insert(CategoricalField::FoodName, Codebook::fit(["apple", "rice"]));
        set.insert(CategoricalField::PortionUnit, Codebook::fit(["g"]));

        let schema = CodebooksSchema::from(&set);
        let rebuilt = CodebookSet::try_from(schema).unwrap();
        assert_eq!(rebuilt, set);
    }

    #[test]
    fn test_codebooks_reject_unknown_field() {
        let mut schema = CodebooksSchema::from(&CodebookSet::default());
        schema.fields.insert("brand".into(), vec!["acme".into()]);
        assert!(matches!(
            CodebookSet::try_from(schema),
            Err(ReadError::Validation(_))
        ));
    }

    #[test]
    fn test_feature_names_round_trip() {
        let schema = FeatureSchema::from_column_names(&["portion_size", "food_name_encoded"])
            .unwrap();
        let names = FeatureNamesSchema::from(&schema);
        assert_eq!(names.columns, vec!["portion_size", "food_name_encoded"]);

        let rebuilt = FeatureSchema::try_from(names).unwrap();
        assert_eq!(rebuilt, schema);
    }

    #[test]
    fn test_feature_names_reject_unknown_column() {
        let names = FeatureNamesSchema {
            version: SCHEMA_VERSION,
            columns: vec!["brand".into()],
        };
        assert!(matches!(
            FeatureSchema::try_from(names),
            Err(ReadError::Validation(_))
        ));
    }
}
