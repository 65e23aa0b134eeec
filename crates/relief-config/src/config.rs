//! Configuration sections, their defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    pub images: ImagesConfig,
    pub generation: GenerationConfig,
    pub server: ServerConfig,
    pub debug: DebugConfig,
}

/// Placement scheduling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuildConfig {
    /// Block writes per build per tick.
    pub batch_size: usize,
    /// Seconds generation may run before the build is abandoned.
    pub timeout_secs: u64,
    /// World position of cell `(0, 0)` at height 0, as `(x, y, z)`.
    pub origin: (i32, i32, i32),
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            batch_size: 15,
            timeout_secs: 30,
            origin: (0, 64, 0),
        }
    }
}

/// Where source images are looked up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImagesConfig {
    /// Base directory. Relative paths resolve against the working directory.
    pub directory: PathBuf,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("images"),
        }
    }
}

/// Tuning for the randomized generators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed used when a request does not name one. `None` draws a fresh seed.
    pub seed: Option<u64>,
    /// Cellular filler brush rings.
    pub brush_strength: u32,
    /// Candidate cells sampled when a filler retargets.
    pub candidate_samples: usize,
    /// Cellular filler agent cap.
    pub max_fillers: usize,
    /// Cellular filler base spawn rate.
    pub spawn_rate: f64,
    /// Cellular filler top speed, in cells per tick.
    pub max_speed: f64,
    /// Wave-front noise sampling scale.
    pub noise_scale: f64,
    /// Wave-front cells per height before acceptance bottoms out.
    pub max_duplicates: usize,
    /// Wave-front acceptance floor.
    pub min_acceptance: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            brush_strength: 3,
            candidate_samples: 10,
            max_fillers: 256,
            spawn_rate: 0.05,
            max_speed: 0.7,
            noise_scale: 0.15,
            max_duplicates: 10,
            min_acceptance: 0.3,
        }
    }
}

/// Host tick source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host ticks per second.
    pub ticks_per_second: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter, e.g. `"info"` or `"info,relief_build=debug"`.
    /// `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Also write JSON logs under the config directory.
    pub log_to_file: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Reject values that parse but cannot drive a build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.batch_size == 0 {
            return Err(invalid("build.batch_size", "must be at least 1"));
        }
        if self.build.timeout_secs == 0 {
            return Err(invalid("build.timeout_secs", "must be at least 1"));
        }
        if self.server.ticks_per_second == 0 {
            return Err(invalid("server.ticks_per_second", "must be at least 1"));
        }
        let generation = &self.generation;
        if generation.max_fillers == 0 {
            return Err(invalid("generation.max_fillers", "must be at least 1"));
        }
        if generation.max_duplicates == 0 {
            return Err(invalid("generation.max_duplicates", "must be at least 1"));
        }
        if generation.noise_scale.is_nan() || generation.noise_scale <= 0.0 {
            return Err(invalid("generation.noise_scale", "must be positive"));
        }
        if generation.max_speed.is_nan() || generation.max_speed <= 0.0 {
            return Err(invalid("generation.max_speed", "must be positive"));
        }
        if !(generation.min_acceptance > 0.0 && generation.min_acceptance <= 1.0) {
            return Err(invalid("generation.min_acceptance", "must be in (0, 1]"));
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `config.ron` from `config_dir`, writing a default one first if
    /// none exists.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Write this config to `config_dir/config.ron`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let write_error = |source| ConfigError::Write {
            path: config_path.clone(),
            source,
        };

        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .separate_tuple_members(false)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(write_error)?;
        Ok(())
    }

    /// Re-read the file; `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let reloaded = Self::read(&config_dir.join(CONFIG_FILE))?;
        reloaded.validate()?;

        if &reloaded != self {
            log::info!("Config reloaded with changes");
            Ok(Some(reloaded))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.build.batch_size, 15);
        assert_eq!(config.build.timeout_secs, 30);
        assert_eq!(config.server.ticks_per_second, 20);
        assert_eq!(config.generation.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_serializes() {
        let ron_str = ron::ser::to_string_pretty(&Config::default(), Default::default()).unwrap();
        assert!(ron_str.contains("batch_size: 15"));
        assert!(ron_str.contains("ticks_per_second: 20"));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = ron::from_str("(build: (batch_size: 40))").unwrap();
        assert_eq!(config.build.batch_size, 40);
        assert_eq!(config.build.timeout_secs, 30);
        assert_eq!(config.generation, GenerationConfig::default());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let config: Result<Config, _> = ron::from_str("(render_distance: 12, debug: (show_fps: true))");
        assert_eq!(config.unwrap(), Config::default());
    }

    #[test]
    fn test_comments_allowed() {
        let config: Config = ron::from_str("// relief builder\n(\n  // nothing set\n)").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_seed_parses_as_option() {
        let config: Config = ron::from_str("(generation: (seed: Some(42)))").unwrap();
        assert_eq!(config.generation.seed, Some(42));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.build.origin = (100, 70, -20);
        config.images.directory = PathBuf::from("/srv/relief/images");
        config.generation.seed = Some(7);

        config.save(dir.path()).unwrap();
        assert_eq!(Config::load_or_create(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.server.ticks_per_second = 40;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.server.ticks_per_second), Some(40));
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not ron}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(build: (batch_size: 0))").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "build.batch_size",
                ..
            }
        ));

        let mut config = Config::default();
        config.generation.min_acceptance = 1.5;
        assert!(config.validate().is_err());
        config.generation.min_acceptance = f64::NAN;
        assert!(config.validate().is_err());
    }
}
