//! Directory-backed storage for a trained generation.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::convert::{forest_from_schema, forest_to_schema};
use super::error::{ReadError, WriteError};
use super::schema::{
    CodebooksSchema, FeatureNamesSchema, ForestSchema, ScalerSchema, SCHEMA_VERSION,
};
use crate::data::{CodebookSet, FeatureSchema, Nutrient, StandardScaler};
use crate::engine::Generation;

/// File holding the ordered feature column list.
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";
/// File holding the scaler parameters.
pub const SCALER_FILE: &str = "scaler.json";
/// File holding the categorical codebooks.
pub const CODEBOOKS_FILE: &str = "codebooks.json";

// =============================================================================
// GenerationStore
// =============================================================================

/// Reads and writes one model generation under a directory.
///
/// A generation is stored as a flat set of JSON files: the shared artifacts
/// (feature names, scaler, codebooks) plus one `<nutrient>_model.json` per
/// trained nutrient. [`save`](GenerationStore::save) replaces the directory
/// contents as a unit; [`load`](GenerationStore::load) reads them back and
/// revalidates everything before handing out a [`Generation`].
#[derive(Debug, Clone)]
pub struct GenerationStore {
    dir: PathBuf,
}

impl GenerationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        GenerationStore { dir: dir.into() }
    }

    /// The directory this store reads from and writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the model file for one nutrient.
    pub fn model_file(&self, nutrient: Nutrient) -> PathBuf {
        self.dir
            .join(format!("{}_model.json", nutrient.column_name()))
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Persist a generation, replacing whatever the directory held before.
    ///
    /// Model files left over from a previous generation are removed first, so
    /// a later `load` never mixes old models with the new scaler or codebooks.
    /// Each file is written to a temporary name and renamed into place, which
    /// keeps a crash mid-write from leaving a truncated artifact behind.
    pub fn save(&self, generation: &Generation) -> Result<(), WriteError> {
        fs::create_dir_all(&self.dir).map_err(|source| WriteError::Io {
            path: self.dir.clone(),
            source,
        })?;
        self.remove_stale_models()?;

        write_json(
            self.dir.join(FEATURE_NAMES_FILE),
            &FeatureNamesSchema::from(generation.schema()),
        )?;
        write_json(
            self.dir.join(SCALER_FILE),
            &ScalerSchema::from(generation.scaler()),
        )?;
        write_json(
            self.dir.join(CODEBOOKS_FILE),
            &CodebooksSchema::from(generation.codebooks()),
        )?;
        for (nutrient, forest) in generation.models() {
            write_json(
                self.model_file(nutrient),
                &forest_to_schema(nutrient, forest),
            )?;
        }

        debug!(
            "saved generation with {} models to {}",
            generation.n_models(),
            self.dir.display()
        );
        Ok(())
    }

    fn remove_stale_models(&self) -> Result<(), WriteError> {
        for nutrient in Nutrient::ALL {
            let path = self.model_file(nutrient);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(WriteError::Io { path, source }),
            }
        }
        Ok(())
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Load the generation stored in the directory.
    ///
    /// The shared artifacts are required; a missing one yields
    /// [`ReadError::NotFound`]. Per-nutrient models are optional: a nutrient
    /// whose model file is absent is left out of the generation, and callers
    /// degrade to predicting the remaining nutrients.
    pub fn load(&self) -> Result<Generation, ReadError> {
        let names: FeatureNamesSchema = read_json(self.dir.join(FEATURE_NAMES_FILE))?;
        let schema = FeatureSchema::try_from(names)?;

        let scaler: ScalerSchema = read_json(self.dir.join(SCALER_FILE))?;
        let scaler = StandardScaler::try_from(scaler)?;

        let codebooks: CodebooksSchema = read_json(self.dir.join(CODEBOOKS_FILE))?;
        let codebooks = CodebookSet::try_from(codebooks)?;

        let mut models = BTreeMap::new();
        for nutrient in Nutrient::ALL {
            let forest: ForestSchema = match read_json(self.model_file(nutrient)) {
                Ok(schema) => schema,
                Err(e) if e.is_not_found() => {
                    warn!("no model file for {nutrient}, it will not be predicted");
                    continue;
                }
                Err(e) => return Err(e),
            };
            models.insert(nutrient, forest_from_schema(nutrient, forest)?);
        }

        debug!(
            "loaded generation with {} models from {}",
            models.len(),
            self.dir.display()
        );
        Generation::new(schema, codebooks, scaler, models)
            .map_err(|e| ReadError::Validation(e.to_string()))
    }
}

// =============================================================================
// JSON helpers
// =============================================================================

/// Schema version accessor, so [`read_json`] can gate every artifact the
/// same way.
trait Versioned {
    fn version(&self) -> u32;
}

macro_rules! impl_versioned {
    ($($ty:ty),*) => {
        $(impl Versioned for $ty {
            fn version(&self) -> u32 {
                self.version
            }
        })*
    };
}

impl_versioned!(
    FeatureNamesSchema,
    ScalerSchema,
    CodebooksSchema,
    ForestSchema
);

fn write_json<T: Serialize>(path: PathBuf, value: &T) -> Result<(), WriteError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| WriteError::Json {
        path: path.clone(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|source| WriteError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, &path).map_err(|source| WriteError::Io { path, source })
}

fn read_json<T: DeserializeOwned + Versioned>(path: PathBuf) -> Result<T, ReadError> {
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ReadError::NotFound { path });
        }
        Err(source) => return Err(ReadError::Io { path, source }),
    };
    let value: T = serde_json::from_slice(&bytes).map_err(|source| ReadError::Json {
        path: path.clone(),
        source,
    })?;
    if value.version() != SCHEMA_VERSION {
        return Err(ReadError::UnsupportedVersion {
            path,
            found: value.version(),
            expected: SCHEMA_VERSION,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::{BaggedForest, RegressionTree};
    use tempfile::TempDir;

    fn sample_generation() -> Generation {
        let schema = FeatureSchema::from_column_names(&[
            "portion_size",
            "food_name_encoded",
            "food_category_encoded",
            "portion_unit_encoded",
        ])
        .unwrap();

        let mut codebooks = CodebookSet::default();
        codebooks.insert(
            crate::data::CategoricalField::FoodName,
            crate::data::Codebook::fit(["apple", "rice"]),
        );
        codebooks.insert(
            crate::data::CategoricalField::FoodCategory,
            crate::data::Codebook::fit(["fruit", "grain"]),
        );
        codebooks.insert(
            crate::data::CategoricalField::PortionUnit,
            crate::data::Codebook::fit(["g"]),
        );

        let scaler = StandardScaler::from_parts(
            vec![100.0, 0.5, 0.5, 0.0],
            vec![50.0, 0.5, 0.5, 1.0],
        )
        .unwrap();

        let mut models = BTreeMap::new();
        models.insert(
            Nutrient::Calories,
            BaggedForest::from_trees(
                vec![
                    RegressionTree::new(
                        vec![0, 0, 0],
                        vec![0.0, 0.0, 0.0],
                        vec![1, 0, 0],
                        vec![2, 0, 0],
                        vec![true, true, true],
                        vec![false, true, true],
                        vec![0.0, 40.0, 90.0],
                    ),
                    RegressionTree::leaf(60.0),
                ],
                4,
            ),
        );
        models.insert(
            Nutrient::Protein,
            BaggedForest::from_trees(vec![RegressionTree::leaf(1.5)], 4),
        );

        Generation::new(schema, codebooks, scaler, models).unwrap()
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = GenerationStore::new(dir.path());
        let generation = sample_generation();

        store.save(&generation).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.schema(), generation.schema());
        assert_eq!(loaded.codebooks(), generation.codebooks());
        assert_eq!(loaded.scaler(), generation.scaler());
        assert_eq!(loaded.n_models(), 2);
        assert_eq!(
            loaded.model(Nutrient::Protein),
            generation.model(Nutrient::Protein)
        );
    }

    #[test]
    fn test_load_empty_dir_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = GenerationStore::new(dir.path());
        let err = store.load().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_garbled_json() {
        let dir = TempDir::new().unwrap();
        let store = GenerationStore::new(dir.path());
        store.save(&sample_generation()).unwrap();

        fs::write(dir.path().join(SCALER_FILE), "{not json").unwrap();
        assert!(matches!(store.load(), Err(ReadError::Json { .. })));
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let store = GenerationStore::new(dir.path());
        store.save(&sample_generation()).unwrap();

        let path = dir.path().join(FEATURE_NAMES_FILE);
        let text = fs::read_to_string(&path)
            .unwrap()
            .replace("\"version\": 1", "\"version\": 99");
        fs::write(&path, text).unwrap();

        assert!(matches!(
            store.load(),
            Err(ReadError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_missing_model_file_degrades_to_partial_generation() {
        let dir = TempDir::new().unwrap();
        let store = GenerationStore::new(dir.path());
        store.save(&sample_generation()).unwrap();

        fs::remove_file(store.model_file(Nutrient::Calories)).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.n_models(), 1);
        assert!(loaded.model(Nutrient::Calories).is_none());
        assert!(loaded.model(Nutrient::Protein).is_some());
    }

    #[test]
    fn test_load_rejects_misfiled_model() {
        let dir = TempDir::new().unwrap();
        let store = GenerationStore::new(dir.path());
        store.save(&sample_generation()).unwrap();

        // protein model content under the iron file name
        fs::copy(
            store.model_file(Nutrient::Protein),
            store.model_file(Nutrient::Iron),
        )
        .unwrap();

        assert!(matches!(store.load(), Err(ReadError::Validation(_))));
    }

    #[test]
    fn test_load_rejects_scaler_width_mismatch() {
        let dir = TempDir::new().unwrap();
        let store = GenerationStore::new(dir.path());
        store.save(&sample_generation()).unwrap();

        let narrow = ScalerSchema {
            version: SCHEMA_VERSION,
            means: vec![0.0],
            stds: vec![1.0],
        };
        write_json(dir.path().join(SCALER_FILE), &narrow).unwrap();

        assert!(matches!(store.load(), Err(ReadError::Validation(_))));
    }

    #[test]
    fn test_save_removes_stale_models() {
        let dir = TempDir::new().unwrap();
        let store = GenerationStore::new(dir.path());
        let generation = sample_generation();
        store.save(&generation).unwrap();

        // next generation trains fewer nutrients
        let slim = Generation::new(
            generation.schema().clone(),
            generation.codebooks().clone(),
            generation.scaler().clone(),
            BTreeMap::from([(
                Nutrient::Calories,
                generation.model(Nutrient::Calories).unwrap().clone(),
            )]),
        )
        .unwrap();
        store.save(&slim).unwrap();

        assert!(!store.model_file(Nutrient::Protein).exists());
        assert_eq!(store.load().unwrap().n_models(), 1);
    }

    #[test]
    fn test_no_tmp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = GenerationStore::new(dir.path());
        store.save(&sample_generation()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
