//! Host side of the relief builder: command line, tick source, an in-memory
//! world to place into, and image previews.

mod cli;
mod paths;
pub mod preview;
mod run;
pub mod tick_loop;
pub mod world;

pub use cli::{Cli, parse_origin};
pub use paths::AppDirs;
pub use run::{
    AppError, BuildSummary, Listing, OutcomeReporter, generation_params, list, run,
    scheduler_config,
};
pub use tick_loop::TickLoop;
pub use world::BlockWorld;
