//! Categorical value codebooks.
//!
//! Each categorical feature column gets a [`Codebook`] mapping distinct
//! string values to dense integer codes in first-seen corpus order. The
//! codebooks fitted at training time are persisted with the generation and
//! must be reused verbatim at prediction time, otherwise codes shift and
//! predictions silently degrade.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Code used for values that cannot be resolved against a codebook.
///
/// Unseen strings and lookups against a missing codebook both map here, so
/// prediction stays total at the cost of colliding with the first interned
/// value of that field.
pub const FALLBACK_CODE: u32 = 0;

// =============================================================================
// Categorical Fields
// =============================================================================

/// The categorical feature fields that may carry a codebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    FoodName,
    FoodCategory,
    PortionUnit,
}

impl CategoricalField {
    /// All categorical fields in canonical column order.
    pub const ALL: [CategoricalField; 3] = [
        CategoricalField::FoodName,
        CategoricalField::FoodCategory,
        CategoricalField::PortionUnit,
    ];

    /// The corpus column name for this field.
    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalField::FoodName => "food_name",
            CategoricalField::FoodCategory => "food_category",
            CategoricalField::PortionUnit => "portion_unit",
        }
    }

    /// Resolve a corpus column name, returning `None` for unknown columns.
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.column_name() == name)
    }
}

impl std::fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

// =============================================================================
// Codebook
// =============================================================================

/// Duplicate value encountered while rebuilding a codebook.
#[derive(Debug, Clone, thiserror::Error)]
#[error("duplicate codebook value {value:?} at codes {first} and {second}")]
pub struct DuplicateValue {
    pub value: String,
    pub first: u32,
    pub second: u32,
}

/// A bijection between distinct string values and dense integer codes.
///
/// Codes are assigned in first-seen order starting at zero, so the ordered
/// value list alone reconstructs the full mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codebook {
    values: Vec<String>,
    index: HashMap<String, u32>,
}

impl Codebook {
    /// Fit a codebook over a stream of values, interning each distinct value
    /// at its first occurrence.
    pub fn fit<'a, I: IntoIterator<Item = &'a str>>(values: I) -> Self {
        let mut book = Codebook::default();
        for value in values {
            book.intern(value);
        }
        book
    }

    /// Rebuild a codebook from its ordered value list (index = code).
    ///
    /// Fails on duplicates, which would make the code assignment ambiguous.
    pub fn from_values(values: Vec<String>) -> Result<Self, DuplicateValue> {
        let mut index = HashMap::with_capacity(values.len());
        for (code, value) in values.iter().enumerate() {
            if let Some(first) = index.insert(value.clone(), code as u32) {
                return Err(DuplicateValue {
                    value: value.clone(),
                    first,
                    second: code as u32,
                });
            }
        }
        Ok(Codebook { values, index })
    }

    fn intern(&mut self, value: &str) -> u32 {
        if let Some(&code) = self.index.get(value) {
            return code;
        }
        let code = self.values.len() as u32;
        self.index.insert(value.to_owned(), code);
        self.values.push(value.to_owned());
        code
    }

    /// Look up the code for a value, `None` if it was never interned.
    pub fn code(&self, value: &str) -> Option<u32> {
        self.index.get(value).copied()
    }

    /// Look up the value for a code, `None` if out of range.
    pub fn value(&self, code: u32) -> Option<&str> {
        self.values.get(code as usize).map(String::as_str)
    }

    /// The ordered value list (index = code).
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Codebook Set
// =============================================================================

/// The codebooks of one model generation, keyed by categorical field.
///
/// A field may have no codebook at all (its column was absent at training
/// time, or the persisted artifact lost it). Lookups against such a field
/// degrade to [`FALLBACK_CODE`] rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodebookSet {
    books: BTreeMap<CategoricalField, Codebook>,
}

impl CodebookSet {
    pub fn insert(&mut self, field: CategoricalField, book: Codebook) {
        self.books.insert(field, book);
    }

    pub fn get(&self, field: CategoricalField) -> Option<&Codebook> {
        self.books.get(&field)
    }

    /// Encode a value for a field, falling back to [`FALLBACK_CODE`] when the
    /// field has no codebook or the value was never seen.
    pub fn code_or_fallback(&self, field: CategoricalField, value: &str) -> u32 {
        self.books
            .get(&field)
            .and_then(|book| book.code(value))
            .unwrap_or(FALLBACK_CODE)
    }

    /// Iterate fields with a codebook, in canonical field order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoricalField, &Codebook)> {
        self.books.iter().map(|(&field, book)| (field, book))
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
