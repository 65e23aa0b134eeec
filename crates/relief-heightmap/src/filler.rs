//! Cellular filler generator: paint agents wander the grid and grow an
//! elevation surface outward from a single seed cell.
//!
//! Heights propagate only through [`BrushMask`] pairs, so every assigned cell
//! sits exactly one above an edge-adjacent predecessor. Agents multiply as the
//! grid fills up, which keeps the last scattered holes from dragging on.

mod agent;
mod brush;

pub use brush::BrushMask;

use glam::IVec2;
use rand::Rng;
use tracing::{debug, warn};

use self::agent::{Canvas, Filler};
use crate::grid::HeightField;

/// Tuning knobs for the cellular filler.
#[derive(Clone, Debug)]
pub struct FillerParams {
    /// Number of diagonal rings in the brush mask. Default: 3.
    pub brush_strength: u32,
    /// Unassigned cells sampled when an agent picks a new target. Default: 10.
    pub candidate_samples: usize,
    /// Proportional steering acceleration per tick. Default: 0.1.
    pub acceleration: f64,
    /// An agent closer than `speed * arrival_factor` to its target snaps its
    /// velocity to land exactly on it. Default: 8.
    pub arrival_factor: f64,
    /// Maximum agent speed in cells per tick. Default: 0.7.
    pub max_speed: f64,
    /// Base spawn rate scaled by grid size, unfilled fraction and agent count.
    /// Default: 0.05.
    pub spawn_rate: f64,
    /// Hard cap on simultaneously active agents. Default: 256.
    pub max_fillers: usize,
    /// Tick budget; `None` means `64 * cells + 1024`.
    pub max_ticks: Option<u64>,
    /// Consecutive ticks without a new assignment before the simulation is
    /// considered stuck; `None` means `8 * (width + height) + 256`.
    pub stall_ticks: Option<u64>,
}

impl Default for FillerParams {
    fn default() -> Self {
        Self {
            brush_strength: 3,
            candidate_samples: 10,
            acceleration: 0.1,
            arrival_factor: 8.0,
            max_speed: 0.7,
            spawn_rate: 0.05,
            max_fillers: 256,
            max_ticks: None,
            stall_ticks: None,
        }
    }
}

/// Result of a cellular filler run.
#[derive(Clone, Debug)]
pub struct FillerOutcome {
    /// The completed height field.
    pub field: HeightField,
    /// Cell that received height 0.
    pub seed: IVec2,
    /// Simulation ticks executed.
    pub ticks: u64,
    /// Agents alive when the simulation stopped.
    pub fillers: usize,
    /// Cells assigned by the neighbor completion pass rather than an agent.
    pub fallback: Vec<IVec2>,
}

/// Run the cellular filler until every cell holds a height.
///
/// The simulation stops as soon as the grid is full. If the tick budget runs
/// out, or no agent has assigned anything for a while, the remaining cells are
/// completed from their lowest assigned neighbor so the result is always full.
///
/// # Panics
///
/// Panics if `width` or `height` is zero.
pub fn generate_filled<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    params: &FillerParams,
    rng: &mut R,
) -> FillerOutcome {
    let mask = BrushMask::new(params.brush_strength, rng);
    let mut canvas = Canvas::new(width, height);

    let seed = IVec2::new(
        rng.random_range(0..width) as i32,
        rng.random_range(0..height) as i32,
    );
    canvas.assign(seed, 0);

    let cells = canvas.len() as u64;
    let max_ticks = params.max_ticks.unwrap_or(64 * cells + 1024);
    let stall_ticks = params
        .stall_ticks
        .unwrap_or(8 * (width as u64 + height as u64) + 256);

    let mut fillers = vec![Filler::spawn(seed, &mut canvas, &mask, params, rng)];
    let mut ticks = 0;
    let mut idle = 0;

    while !canvas.is_complete() && ticks < max_ticks && idle < stall_ticks {
        let before = canvas.unfilled();

        let existing = fillers.len();
        for i in 0..existing {
            if fillers.len() >= params.max_fillers {
                break;
            }
            if rng.random::<f64>() < spawn_chance(&canvas, fillers.len(), params) {
                let at = fillers[i].cell();
                let spawned = Filler::spawn(at, &mut canvas, &mask, params, rng);
                fillers.push(spawned);
            }
        }

        for filler in &mut fillers {
            filler.tick(&mut canvas, &mask, params, rng);
        }

        ticks += 1;
        idle = if canvas.unfilled() < before { 0 } else { idle + 1 };
    }

    let fallback = if canvas.is_complete() {
        Vec::new()
    } else {
        warn!(
            width,
            height,
            ticks,
            remaining = canvas.unfilled(),
            "filler simulation stopped early; completing from neighbors"
        );
        canvas.complete_from_neighbors()
    };

    debug!(width, height, ticks, fillers = fillers.len(), "filler simulation finished");

    FillerOutcome {
        field: canvas.into_field(),
        seed,
        ticks,
        fillers: fillers.len(),
        fallback,
    }
}

/// Probability that one agent spawns a sibling this tick. Rises as the unfilled
/// fraction shrinks and falls with the square of the agent count.
fn spawn_chance(canvas: &Canvas, fillers: usize, params: &FillerParams) -> f64 {
    let unfilled = canvas.unfilled_fraction();
    if unfilled <= 0.0 {
        return 0.0;
    }
    let scale = canvas.len() as f64 / 100.0;
    params.spawn_rate * (10.0 / unfilled) / 1000.0 * scale / (fillers as f64).powi(2)
}
