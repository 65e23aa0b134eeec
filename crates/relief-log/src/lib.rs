//! Structured logging for the relief builder.
//!
//! Console output carries uptime timestamps, thread names and targets; an
//! optional JSON file captures the same events for later inspection. The
//! filter comes from `RUST_LOG` when set, otherwise from the config.

use std::fs::File;
use std::path::{Path, PathBuf};

use relief_config::Config;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file inside the log directory.
pub const LOG_FILE: &str = "relief.log";

/// Filter directives taken from `config`, falling back to [`DEFAULT_FILTER`].
pub fn filter_directives(config: Option<&Config>) -> String {
    config
        .map(|config| config.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE)
}

/// One JSON object per event, no ANSI escapes.
fn json_layer<S>(file: File) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .json()
}

/// Install the global subscriber.
///
/// A JSON file layer is added when `config.debug.log_to_file` is set and
/// `log_dir` can be created. Does nothing if a global subscriber is already
/// installed.
pub fn init_logging(log_dir: Option<&Path>, config: Option<&Config>) {
    let directives = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let to_file = config.is_some_and(|config| config.debug.log_to_file);
    if to_file
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = File::create(log_file_path(log_dir))
    {
        let _ = subscriber.with(json_layer(log_file)).try_init();
        return;
    }

    let _ = subscriber.try_init();
}
