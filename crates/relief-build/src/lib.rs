//! Turning a height field and a color field into ordered block placements,
//! and feeding those placements into a world a few at a time.
//!
//! [`BuildScheduler`] runs generation on a worker thread under a timeout, then
//! drains each finished build in fixed-size batches on every host tick.

mod block;
mod error;
mod placement;
mod report;
mod scheduler;
mod task;

pub use block::{BlockKind, BlockPos, Facing};
pub use error::BuildError;
pub use placement::{Placement, PlacementSink, build_placements};
pub use report::{BuildEvent, BuildId, BuildReporter, LogReporter};
pub use scheduler::{BuildRequest, BuildScheduler, SchedulerConfig};
pub use task::PlacementTask;
