//! CSV corpus loading.
//!
//! A corpus is a flat CSV table of food records. Four feature columns
//! (`food_name`, `food_category`, `portion_size`, `portion_unit`) and the
//! thirteen nutrient target columns are all optional: the reader records
//! which ones were present and downstream stages work off that.
//!
//! Cell-level problems never fail the load. Missing numeric cells parse to
//! `0`, except a present-but-unparseable portion size which falls back to
//! `100` (a plausible reference portion).

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;

use super::nutrient::Nutrient;

/// Fallback for a portion cell that is present but not numeric.
const PORTION_FALLBACK: f32 = 100.0;

/// Errors that can occur when loading or writing a corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A single food record.
///
/// String fields default to empty and numeric fields to zero when the
/// corresponding column is absent; [`CorpusColumns`] tracks which columns
/// actually existed so absent ones are not mistaken for real values.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodRecord {
    pub food_name: String,
    pub food_category: String,
    pub portion_size: f32,
    pub portion_unit: String,
    /// Target values for the nutrient columns present in the corpus.
    pub nutrients: BTreeMap<Nutrient, f32>,
}

/// Which columns a corpus actually carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusColumns {
    pub portion_size: bool,
    pub food_name: bool,
    pub food_category: bool,
    pub portion_unit: bool,
    /// Present nutrient target columns, in canonical order.
    pub nutrients: Vec<Nutrient>,
}

impl CorpusColumns {
    /// Returns `true` if at least one feature column is present.
    pub fn has_features(&self) -> bool {
        self.portion_size || self.food_name || self.food_category || self.portion_unit
    }
}

/// A loaded corpus: records plus the column layout they were read with.
#[derive(Debug, Clone)]
pub struct Corpus {
    records: Vec<FoodRecord>,
    columns: CorpusColumns,
}

impl Corpus {
    /// Load a corpus from a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Load a corpus from any CSV byte stream.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, CorpusError> {
        // Flexible so ragged rows degrade to empty cells instead of failing.
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv.headers()?.clone();
        let position = |name: &str| headers.iter().position(|h| h == name);

        let portion_idx = position("portion_size");
        let name_idx = position("food_name");
        let category_idx = position("food_category");
        let unit_idx = position("portion_unit");
        let nutrient_idx: Vec<(Nutrient, usize)> = Nutrient::ALL
            .iter()
            .filter_map(|&n| position(n.column_name()).map(|i| (n, i)))
            .collect();

        let columns = CorpusColumns {
            portion_size: portion_idx.is_some(),
            food_name: name_idx.is_some(),
            food_category: category_idx.is_some(),
            portion_unit: unit_idx.is_some(),
            nutrients: nutrient_idx.iter().map(|&(n, _)| n).collect(),
        };

        let mut records = Vec::new();
        for row in csv.records() {
            let row = row?;
            // Short rows yield empty cells rather than a hard failure.
            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("");

            let nutrients = nutrient_idx
                .iter()
                .map(|&(n, i)| (n, parse_numeric(row.get(i).unwrap_or(""))))
                .collect();

            records.push(FoodRecord {
                food_name: cell(name_idx).to_owned(),
                food_category: cell(category_idx).to_owned(),
                portion_size: parse_portion(cell(portion_idx)),
                portion_unit: cell(unit_idx).to_owned(),
                nutrients,
            });
        }

        Ok(Corpus { records, columns })
    }

    pub fn records(&self) -> &[FoodRecord] {
        &self.records
    }

    pub fn columns(&self) -> &CorpusColumns {
        &self.columns
    }

    pub fn n_records(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if the corpus can drive a training run: it has rows,
    /// at least one feature column, and at least one target column.
    pub fn is_trainable(&self) -> bool {
        !self.records.is_empty() && self.columns.has_features() && !self.columns.nutrients.is_empty()
    }
}

/// Write records to a CSV file using the full canonical column set.
///
/// This is the inverse of [`Corpus::from_csv_path`] for fully-populated
/// records; nutrients missing from a record's map are written as `0`.
pub fn write_records_csv(
    path: impl AsRef<Path>,
    records: &[FoodRecord],
) -> Result<(), CorpusError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    let mut header: Vec<&str> = vec!["food_name", "food_category", "portion_size", "portion_unit"];
    header.extend(Nutrient::ALL.iter().map(|n| n.column_name()));
    writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = vec![
            record.food_name.clone(),
            record.food_category.clone(),
            record.portion_size.to_string(),
            record.portion_unit.clone(),
        ];
        for nutrient in Nutrient::ALL {
            let value = record.nutrients.get(&nutrient).copied().unwrap_or(0.0);
            row.push(value.to_string());
        }
        writer.write_record(&row)?;
    }

    writer.flush().map_err(CorpusError::Io)?;
    Ok(())
}

fn parse_portion(cell: &str) -> f32 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f32>().unwrap_or(PORTION_FALLBACK)
}

fn parse_numeric(cell: &str) -> f32 {
    cell.trim().parse::<f32>().unwrap_or(0.0)
}
