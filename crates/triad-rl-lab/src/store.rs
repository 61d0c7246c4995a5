//! Results persistence
//!
//! Bundles are bincode-encoded, gzip-compressed and written under a
//! timestamped name in the data directory.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use ndarray::Array3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use triad_rl_core::{RLError, Result};
use triad_rl_env::BAIRD_FEATURES;

use crate::config::{BairdConfig, PolicyGradientConfig};
use crate::orchestrator::PolicyGradientStudy;

/// Default directory for saved results
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Baird study output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BairdResults {
    /// Weight snapshots, `(runs, steps + 1, 8)`
    pub weights: Array3<f64>,
    /// Settings the study ran with
    pub config: BairdConfig,
}

/// Policy-gradient comparison output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyGradientResults {
    /// REINFORCE study
    pub reinforce: PolicyGradientStudy,
    /// Actor-critic study
    pub actor_critic: PolicyGradientStudy,
    /// Settings the studies ran with
    pub config: PolicyGradientConfig,
}

impl BairdResults {
    /// Check the config and that the weight tensor matches it
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        let expected = (self.config.runs, self.config.steps + 1, BAIRD_FEATURES);
        if self.weights.dim() != expected {
            return Err(RLError::Configuration(format!(
                "weights have shape {:?}, config implies {expected:?}",
                self.weights.dim()
            )));
        }
        Ok(())
    }
}

impl PolicyGradientResults {
    /// Check the config and that both step tensors match its grid
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        let expected = self.config.grid_shape();
        for study in [&self.reinforce, &self.actor_critic] {
            if study.steps.dim() != expected {
                return Err(RLError::Configuration(format!(
                    "{} steps have shape {:?}, config implies {expected:?}",
                    study.mode,
                    study.steps.dim()
                )));
            }
        }
        Ok(())
    }
}

/// Saves and loads result bundles
#[derive(Debug, Clone)]
pub struct ResultsStore {
    data_dir: PathBuf,
}

impl Default for ResultsStore {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl ResultsStore {
    /// Store rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Data directory
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File name for a bundle saved at `at`
    #[must_use]
    pub fn file_name(label: &str, at: DateTime<Utc>) -> String {
        format!("{}_{label}.bin.gz", at.format("%Y-%m-%dT%H-%M-%S"))
    }

    /// Save `bundle` under a timestamped name and return its path
    pub async fn save<T: Serialize>(&self, bundle: &T, label: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir).await?;
        let path = self.data_dir.join(Self::file_name(label, Utc::now()));

        let data = bincode::serialize(bundle)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data)?;
        let compressed = encoder.finish()?;
        fs::write(&path, compressed).await?;

        info!(path = %path.display(), bytes = data.len(), "saved results");
        Ok(path)
    }

    /// Load a bundle from `name` as given, falling back to `data_dir/name`
    pub async fn load<T: DeserializeOwned>(&self, name: impl AsRef<Path>) -> Result<T> {
        let name = name.as_ref();
        let mut tried = vec![name.to_path_buf()];
        let fallback = self.data_dir.join(name);
        if fallback != name {
            tried.push(fallback);
        }

        for path in &tried {
            match fs::read(path).await {
                Ok(compressed) => {
                    let mut decoder = GzDecoder::new(&compressed[..]);
                    let mut data = Vec::new();
                    decoder.read_to_end(&mut data)?;
                    let bundle = bincode::deserialize(&data)?;
                    info!(path = %path.display(), "loaded results");
                    return Ok(bundle);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(RLError::DataUnavailable { tried })
    }
}
