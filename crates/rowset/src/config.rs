use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use rowset_core::{Error, Result};
use rowset_data::{DataLoaderConfig, SplitConfig};

/// Pipeline configuration loaded from a TOML or JSON file.
///
/// ```toml
/// input = "data/samples.npy"
/// target_cols = [10]
/// output_dir = "data/splits"
///
/// [split]
/// ratios = [0.7, 0.15, 0.15]
/// seed = 42
///
/// [loader]
/// batch_size = 64
/// shuffle = true
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// `.npy` file holding the sample table.
    pub input: PathBuf,
    /// Columns used as targets; the rest are features.
    pub target_cols: Vec<usize>,
    pub split: SplitConfig,
    pub loader: DataLoaderConfig,
    /// Where to write `train.npy`, `val.npy` and `test.npy`. Nothing is
    /// written when unset.
    pub output_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data.npy"),
            target_cols: Vec::new(),
            split: SplitConfig::default(),
            loader: DataLoaderConfig::default(),
            output_dir: None,
        }
    }
}

impl RunConfig {
    /// Load configuration from the given path. JSON if the extension is
    /// `.json`, TOML otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let config: Self = if is_json {
            serde_json::from_str(&content)
                .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))?
        } else {
            toml::from_str(&content)
                .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later in the pipeline.
    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        if self.loader.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "loader.batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
