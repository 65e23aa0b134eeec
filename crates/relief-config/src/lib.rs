//! Configuration for the relief builder.
//!
//! Settings persist to disk as `config.ron`. Missing sections and fields fall
//! back to defaults, unknown fields are ignored, and command-line flags
//! override whatever was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BuildConfig, CONFIG_FILE, Config, DebugConfig, GenerationConfig, ImagesConfig, ServerConfig,
};
pub use error::ConfigError;
