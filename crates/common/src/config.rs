//! Configuration management for evaluation runs.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `config/default.toml` (if it exists)
//! 3. An explicit file passed with `--config` (if any)
//! 4. Environment variables prefixed with `JETSIM_`
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Example Configuration
//!
//! ```toml
//! [paths]
//! real_datasets_dir = "/data/jetnet"
//! output_dir = "results"
//!
//! [evaluation]
//! num_w1_batches = 10
//! efp_cache_layout = "legacy"
//!
//! [telemetry]
//! log_level = "debug"
//! ```

use anyhow::{Context, Result};
use jetsim_domain::EfpCacheLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main evaluation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub evaluation: EvaluationSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Filesystem roots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root for reference datasets
    pub real_datasets_dir: PathBuf,
    /// Root for downloaded generated samples
    pub gen_datasets_dir: PathBuf,
    /// Directory holding one subdirectory per submission
    pub submission_dir: PathBuf,
    /// Where reports are written
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            real_datasets_dir: PathBuf::from("./datasets/"),
            gen_datasets_dir: PathBuf::from("./datasets/"),
            submission_dir: PathBuf::from("./submissions/"),
            output_dir: PathBuf::from("./results/"),
        }
    }
}

/// Sample sizes, batching and caching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Jets loaded per sample set
    pub num_samples: usize,
    /// Jets drawn per W1 batch
    pub num_w1_eval_samples: usize,
    /// Number of W1 batches
    pub num_w1_batches: usize,
    /// Jets drawn per KPD batch
    pub kpd_batch_size: usize,
    /// Number of KPD batches
    pub kpd_num_batches: usize,
    /// Seed for batch sampling
    pub seed: u64,
    pub efp_cache_layout: EfpCacheLayout,
    /// Keep resolved reference samples in memory for the whole run
    pub cache_real_samples: bool,
    /// Show download progress bars
    pub show_progress: bool,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            num_samples: 50_000,
            num_w1_eval_samples: 50_000,
            num_w1_batches: 5,
            kpd_batch_size: 5_000,
            kpd_num_batches: 10,
            seed: 42,
            efp_cache_layout: EfpCacheLayout::default(),
            cache_real_samples: true,
            show_progress: true,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Enable JSON logging format
    pub json_logging: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl EvalConfig {
    /// Load configuration from files and environment variables.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use jetsim_common::config::EvalConfig;
    ///
    /// let config = EvalConfig::load(None).expect("Failed to load configuration");
    /// println!("Reports go to {}", config.paths.output_dir.display());
    /// ```
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            // Example: JETSIM_EVALUATION__NUM_W1_BATCHES=10
            .add_source(
                config::Environment::with_prefix("JETSIM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let eval_config: EvalConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        eval_config.validate()?;

        Ok(eval_config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let eval = &self.evaluation;

        if eval.num_samples == 0 {
            anyhow::bail!("num_samples must be greater than 0");
        }

        if eval.num_w1_eval_samples == 0 {
            anyhow::bail!("num_w1_eval_samples must be greater than 0");
        }

        if eval.num_w1_batches == 0 {
            anyhow::bail!("num_w1_batches must be greater than 0");
        }

        if eval.kpd_batch_size < 2 {
            anyhow::bail!("kpd_batch_size must be at least 2");
        }

        if eval.kpd_num_batches == 0 {
            anyhow::bail!("kpd_num_batches must be greater than 0");
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.telemetry.log_level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_validation() {
        let mut config = EvalConfig::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        config.evaluation.num_w1_batches = 0;
        assert!(config.validate().is_err());
        config.evaluation.num_w1_batches = 5;

        config.evaluation.kpd_batch_size = 1;
        assert!(config.validate().is_err());
        config.evaluation.kpd_batch_size = 5_000;

        config.telemetry.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.paths.submission_dir, PathBuf::from("./submissions/"));
        assert_eq!(config.evaluation.num_samples, 50_000);
        assert_eq!(config.evaluation.num_w1_batches, 5);
        assert_eq!(config.evaluation.efp_cache_layout, EfpCacheLayout::Qualified);
        assert!(config.evaluation.cache_real_samples);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[evaluation]\nnum_w1_batches = 3\nefp_cache_layout = \"legacy\"\n\n[paths]\noutput_dir = \"out\""
        )
        .unwrap();

        let config = EvalConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.evaluation.num_w1_batches, 3);
        assert_eq!(config.evaluation.efp_cache_layout, EfpCacheLayout::Legacy);
        assert_eq!(config.paths.output_dir, PathBuf::from("out"));
        // untouched values keep their defaults
        assert_eq!(config.evaluation.num_samples, 50_000);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = EvalConfig::load(Some(Path::new("/nonexistent/jetsim.toml")));
        assert!(result.is_err());
    }
}
