//! Build notifications and where they go.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::Sender;
use tracing::{debug, error, info, warn};

/// Identifies one submitted build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildId(pub u64);

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle notifications for a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildEvent {
    /// Generation finished and placement begins.
    Started { id: BuildId, total: usize },
    /// A 25 % milestone was crossed.
    Progress { id: BuildId, percent: u8 },
    /// Generation did not finish in time; nothing will be placed.
    Timeout { id: BuildId, after: Duration },
    /// Generation failed; nothing will be placed.
    Error { id: BuildId, message: String },
    /// Every placement has been written.
    Completed { id: BuildId, placed: usize },
}

impl BuildEvent {
    pub fn id(&self) -> BuildId {
        match self {
            BuildEvent::Started { id, .. }
            | BuildEvent::Progress { id, .. }
            | BuildEvent::Timeout { id, .. }
            | BuildEvent::Error { id, .. }
            | BuildEvent::Completed { id, .. } => *id,
        }
    }

    /// `true` for the last event a build will ever emit.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildEvent::Timeout { .. } | BuildEvent::Error { .. } | BuildEvent::Completed { .. }
        )
    }
}

/// Receives build notifications on the tick thread.
pub trait BuildReporter {
    fn report(&mut self, event: BuildEvent);
}

/// Forward events over a channel. A disconnected receiver drops them.
impl BuildReporter for Sender<BuildEvent> {
    fn report(&mut self, event: BuildEvent) {
        let _ = self.send(event);
    }
}

/// Writes every event to the `tracing` log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl BuildReporter for LogReporter {
    fn report(&mut self, event: BuildEvent) {
        match event {
            BuildEvent::Started { id, total } => info!(build = %id, total, "placement started"),
            BuildEvent::Progress { id, percent } => debug!(build = %id, percent, "placement progress"),
            BuildEvent::Timeout { id, after } => {
                warn!(build = %id, after_ms = after.as_millis() as u64, "generation timed out")
            }
            BuildEvent::Error { id, message } => error!(build = %id, %message, "generation failed"),
            BuildEvent::Completed { id, placed } => info!(build = %id, placed, "placement completed"),
        }
    }
}
