//! Command-line overrides for [`Config`].

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Flags that override values loaded from `config.ron`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Config directory (defaults to the platform config dir).
    #[arg(long, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Directory holding source images.
    #[arg(long, value_name = "DIR")]
    pub images: Option<PathBuf>,

    /// Block writes per build per tick.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Seconds generation may run before the build is abandoned.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Host ticks per second.
    #[arg(long)]
    pub tps: Option<u32>,

    /// Log filter (error, warn, info, debug, trace, or a full directive list).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref dir) = args.images {
            self.images.directory = dir.clone();
        }
        if let Some(batch_size) = args.batch_size {
            self.build.batch_size = batch_size;
        }
        if let Some(timeout) = args.timeout {
            self.build.timeout_secs = timeout;
        }
        if let Some(tps) = args.tps {
            self.server.ticks_per_second = tps;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
