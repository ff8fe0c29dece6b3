//! Corpus encoding: raw records to numeric feature matrices.
//!
//! Fitting an encoder derives the feature schema from the corpus columns,
//! builds one codebook per categorical column, and materializes the feature
//! matrix plus per-nutrient target vectors. The same schema and codebooks
//! then encode single prediction inputs, with unseen categorical values
//! degrading to the fallback code instead of failing.

use std::collections::BTreeMap;

use ndarray::Array2;

use super::codebook::{CategoricalField, Codebook, CodebookSet};
use super::corpus::{Corpus, FoodRecord};
use super::nutrient::Nutrient;
use super::schema::{FeatureKind, FeatureSchema};

/// A fully encoded corpus, ready for splitting and training.
#[derive(Debug, Clone)]
pub struct EncodedCorpus {
    /// Row-major `[n_records, n_features]` feature matrix in schema order.
    pub features: Array2<f32>,
    pub schema: FeatureSchema,
    pub codebooks: CodebookSet,
    /// One target vector per nutrient column present in the corpus.
    pub targets: BTreeMap<Nutrient, Vec<f32>>,
}

impl EncodedCorpus {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn target(&self, nutrient: Nutrient) -> Option<&[f32]> {
        self.targets.get(&nutrient).map(Vec::as_slice)
    }
}

/// A single prediction input, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct PredictionInput<'a> {
    pub food_name: &'a str,
    pub food_category: &'a str,
    pub portion_size: f32,
    pub portion_unit: &'a str,
}

impl PredictionInput<'_> {
    fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::FoodName => self.food_name,
            CategoricalField::FoodCategory => self.food_category,
            CategoricalField::PortionUnit => self.portion_unit,
        }
    }
}

fn record_field(record: &FoodRecord, field: CategoricalField) -> &str {
    match field {
        CategoricalField::FoodName => &record.food_name,
        CategoricalField::FoodCategory => &record.food_category,
        CategoricalField::PortionUnit => &record.portion_unit,
    }
}

/// Fit codebooks over a corpus and encode it in one pass.
///
/// Always succeeds; an empty corpus encodes to a zero-row matrix and the
/// caller decides whether that is trainable.
pub fn fit_encode(corpus: &Corpus) -> EncodedCorpus {
    let schema = FeatureSchema::from_columns(corpus.columns());

    let mut codebooks = CodebookSet::default();
    for kind in schema.features() {
        if let Some(field) = kind.categorical_field() {
            let book = Codebook::fit(
                corpus
                    .records()
                    .iter()
                    .map(|record| record_field(record, field)),
            );
            codebooks.insert(field, book);
        }
    }

    let mut features = Array2::<f32>::zeros((corpus.n_records(), schema.len()));
    for (row, record) in corpus.records().iter().enumerate() {
        for (col, kind) in schema.features().iter().enumerate() {
            features[(row, col)] = match kind.categorical_field() {
                None => record.portion_size,
                Some(field) => {
                    codebooks.code_or_fallback(field, record_field(record, field)) as f32
                }
            };
        }
    }

    let targets = corpus
        .columns()
        .nutrients
        .iter()
        .map(|&nutrient| {
            let column = corpus
                .records()
                .iter()
                .map(|record| record.nutrients.get(&nutrient).copied().unwrap_or(0.0))
                .collect();
            (nutrient, column)
        })
        .collect();

    EncodedCorpus {
        features,
        schema,
        codebooks,
        targets,
    }
}

/// Encode one prediction input against a fitted schema and codebooks.
///
/// The result always has `schema.len()` entries, in schema order.
pub fn encode_input(
    input: &PredictionInput<'_>,
    schema: &FeatureSchema,
    codebooks: &CodebookSet,
) -> Vec<f32> {
    schema
        .features()
        .iter()
        .map(|kind| match kind.categorical_field() {
            None => input.portion_size,
            Some(field) => codebooks.code_or_fallback(field, input.categorical(field)) as f32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_corpus() -> Corpus {
        Corpus::from_csv_reader(
            "food_name,food_category,portion_size,portion_unit,calories,protein\n\
             banana,fruit,120,g,106.8,1.3\n\
             apple,fruit,150,g,78.0,0.4\n\
             rice,grain,100,g,130.0,2.7\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_fit_encode_builds_schema_matrix_and_targets() {
        let encoded = fit_encode(&sample_corpus());

        assert_eq!(encoded.n_rows(), 3);
        assert_eq!(encoded.n_features(), 4);
        assert_eq!(encoded.schema.features(), &FeatureKind::ALL);

        // banana was seen first, so it gets code 0; fruit likewise.
        assert_eq!(encoded.features[(0, 0)], 120.0);
        assert_eq!(encoded.features[(0, 1)], 0.0);
        assert_eq!(encoded.features[(1, 1)], 1.0);
        assert_eq!(encoded.features[(2, 1)], 2.0);
        assert_eq!(encoded.features[(0, 2)], 0.0);
        assert_eq!(encoded.features[(2, 2)], 1.0);
        // every row used unit "g"
        assert_eq!(encoded.features[(2, 3)], 0.0);

        assert_eq!(encoded.target(Nutrient::Calories), Some(&[106.8, 78.0, 130.0][..]));
        assert_eq!(encoded.target(Nutrient::Protein), Some(&[1.3, 0.4, 2.7][..]));
        assert_eq!(encoded.target(Nutrient::Fat), None);
    }

    #[test]
    fn test_fit_encode_skips_absent_columns() {
        let corpus = Corpus::from_csv_reader(
            "food_name,calories\napple,52\nrice,130\n".as_bytes(),
        )
        .unwrap();
        let encoded = fit_encode(&corpus);

        assert_eq!(encoded.schema.features(), &[FeatureKind::FoodName]);
        assert_eq!(encoded.n_features(), 1);
        assert!(encoded.codebooks.get(CategoricalField::FoodCategory).is_none());
    }

    #[test]
    fn test_fit_encode_empty_corpus() {
        let corpus = Corpus::from_csv_reader("food_name,calories\n".as_bytes()).unwrap();
        let encoded = fit_encode(&corpus);
        assert_eq!(encoded.n_rows(), 0);
        assert_eq!(encoded.target(Nutrient::Calories), Some(&[][..]));
    }

    #[test]
    fn test_encode_input_matches_training_encoding() {
        let encoded = fit_encode(&sample_corpus());
        let input = PredictionInput {
            food_name: "apple",
            food_category: "fruit",
            portion_size: 150.0,
            portion_unit: "g",
        };
        let row = encode_input(&input, &encoded.schema, &encoded.codebooks);
        let training_row: Vec<f32> = encoded.features.row(1).to_vec();
        assert_eq!(row, training_row);
    }

    #[test]
    fn test_encode_input_unseen_values_fall_back() {
        let encoded = fit_encode(&sample_corpus());
        let input = PredictionInput {
            food_name: "durian",
            food_category: "unknown",
            portion_size: 80.0,
            portion_unit: "oz",
        };
        let row = encode_input(&input, &encoded.schema, &encoded.codebooks);
        assert_eq!(row, vec![80.0, 0.0, 0.0, 0.0]);
    }
}
