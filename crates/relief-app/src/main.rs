//! `relief`: generate a height field, color it from an image and place it
//! block by block.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p relief-app -- 32 32 wave_noise sunset --preview out.png`.

use std::process::ExitCode;

use clap::Parser;
use relief_app::{AppDirs, Cli};
use relief_config::Config;
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let dirs = AppDirs::resolve(cli.overrides.config.as_deref());

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&cli.overrides);

    relief_log::init_logging(Some(&dirs.log_dir), Some(&config));

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    if cli.list {
        return match relief_app::list(&config) {
            Ok(listing) => {
                println!("generators:");
                for name in &listing.generators {
                    println!("  {name}");
                }
                println!("images in {}:", config.images.directory.display());
                for name in &listing.images {
                    println!("  {name}");
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "could not list images");
                ExitCode::FAILURE
            }
        };
    }

    match relief_app::run(&cli, &config) {
        Ok(summary) => {
            info!(
                build = %summary.id,
                seed = summary.seed,
                placed = summary.placed,
                ticks = summary.ticks,
                "relief built"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "build failed");
            ExitCode::FAILURE
        }
    }
}
