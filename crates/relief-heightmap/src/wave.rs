//! Wave-front noise generator: a flood fill from the grid center whose
//! expansion order follows a coherent noise field.
//!
//! High-noise cells are expanded first, so contour rings bulge through
//! high-noise regions instead of staying circular. A per-height acceptance
//! probability keeps any single ring from growing too thick.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use glam::IVec2;
use hashbrown::HashMap;
use noise::{NoiseFn, Perlin};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::grid::{Grid, HeightField, NEIGHBORS_4};

/// Tuning knobs for the wave-front generator.
#[derive(Clone, Debug)]
pub struct WaveParams {
    /// Scale applied to cell coordinates before sampling noise. Default: 0.15.
    pub noise_scale: f64,
    /// Cell count per height at which acceptance reaches its floor. Default: 10.
    pub max_duplicates: usize,
    /// Lowest acceptance probability for a neighbor. Default: 0.3.
    pub min_acceptance: f64,
    /// Iteration budget as a multiple of the cell count. Default: 3.
    pub iteration_factor: usize,
    /// Most frontier cells admitted by one respawned wave. Default: 10.
    pub max_wave: usize,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            noise_scale: 0.15,
            max_duplicates: 10,
            min_acceptance: 0.3,
            iteration_factor: 3,
            max_wave: 10,
        }
    }
}

/// Result of a wave-front run.
#[derive(Clone, Debug)]
pub struct WaveOutcome {
    /// The completed height field.
    pub field: HeightField,
    /// The center cell the flood started from (height 0).
    pub seed: IVec2,
    /// Main-loop iterations executed.
    pub iterations: usize,
    /// Cells assigned by the completion pass after the budget ran out.
    pub fallback: Vec<IVec2>,
}

/// A frontier cell waiting in the priority queue.
#[derive(Clone, Copy, Debug)]
struct WaveCandidate {
    cell: IVec2,
    height: i32,
    priority: f64,
}

impl PartialEq for WaveCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for WaveCandidate {}

impl PartialOrd for WaveCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WaveCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority)
    }
}

/// Mutable state of one flood fill.
struct Flood {
    cells: Grid<Option<i32>>,
    /// Filled cells with at least one open neighbor, keyed `(y, x)` so
    /// iteration is row-major.
    border: BTreeSet<(i32, i32)>,
    queue: BinaryHeap<WaveCandidate>,
    per_height: HashMap<i32, usize>,
    filled: usize,
    noise: Perlin,
    scale: f64,
}

impl Flood {
    /// Empty field with the center cell filled at height 0 and queued.
    fn new<R: Rng + ?Sized>(width: u32, height: u32, params: &WaveParams, rng: &mut R) -> Self {
        let mut flood = Flood {
            cells: Grid::filled(width, height, None),
            border: BTreeSet::new(),
            queue: BinaryHeap::new(),
            per_height: HashMap::new(),
            filled: 0,
            noise: Perlin::new(rng.next_u32()),
            scale: params.noise_scale,
        };
        let seed = flood.seed();
        flood.fill(seed, 0);
        let start = flood.candidate(seed, 0);
        flood.queue.push(start);
        flood
    }

    fn seed(&self) -> IVec2 {
        IVec2::new((self.cells.width() / 2) as i32, (self.cells.height() / 2) as i32)
    }

    fn priority(&self, cell: IVec2) -> f64 {
        self.noise
            .get([cell.x as f64 * self.scale, cell.y as f64 * self.scale])
    }

    fn is_open(&self, cell: IVec2) -> bool {
        matches!(self.cells.get(cell), Some(None))
    }

    fn count_at(&self, height: i32) -> usize {
        self.per_height.get(&height).copied().unwrap_or(0)
    }

    fn fill(&mut self, cell: IVec2, height: i32) {
        self.cells[cell] = Some(height);
        self.filled += 1;
        *self.per_height.entry(height).or_default() += 1;

        self.refresh_border(cell);
        for offset in NEIGHBORS_4 {
            let next = cell + offset;
            if matches!(self.cells.get(next), Some(Some(_))) {
                self.refresh_border(next);
            }
        }
    }

    fn refresh_border(&mut self, cell: IVec2) {
        let key = (cell.y, cell.x);
        if NEIGHBORS_4.iter().any(|&offset| self.is_open(cell + offset)) {
            self.border.insert(key);
        } else {
            self.border.remove(&key);
        }
    }

    fn candidate(&self, cell: IVec2, height: i32) -> WaveCandidate {
        WaveCandidate {
            cell,
            height,
            priority: self.priority(cell),
        }
    }

    /// Expand one popped cell into its open neighbors, visited in random order.
    fn expand<R: Rng + ?Sized>(&mut self, current: WaveCandidate, params: &WaveParams, rng: &mut R) {
        let mut directions = NEIGHBORS_4;
        directions.shuffle(rng);

        for offset in directions {
            let next = current.cell + offset;
            if !self.is_open(next) {
                continue;
            }

            let height = current.height + 1;
            let crowding = self.count_at(height) as f64 / params.max_duplicates as f64;
            let acceptance = (1.0 - crowding).max(params.min_acceptance);
            if rng.random::<f64>() > acceptance {
                continue;
            }

            self.fill(next, height);
            let candidate = self.candidate(next, height);
            self.queue.push(candidate);
        }
    }

    /// One main-loop iteration: respawn the front if the queue ran dry, then
    /// expand the highest-noise cell.
    fn step<R: Rng + ?Sized>(&mut self, params: &WaveParams, rng: &mut R) {
        if self.queue.is_empty() {
            self.spawn_wave(params);
        }
        if let Some(current) = self.queue.pop() {
            self.expand(current, params, rng);
        }
    }

    /// Restart an exhausted front: rank every open cell bordering the filled
    /// region by noise and admit the top fifth (at least one, at most
    /// `max_wave`), skipping heights that are already twice over capacity.
    /// If that skips everything, the best candidate goes in regardless.
    fn spawn_wave(&mut self, params: &WaveParams) -> usize {
        let mut candidates = Vec::new();
        for &(y, x) in &self.border {
            let cell = IVec2::new(x, y);
            let Some(height) = self.cells[cell] else {
                continue;
            };
            for offset in NEIGHBORS_4 {
                let next = cell + offset;
                if self.is_open(next) {
                    candidates.push(self.candidate(next, height + 1));
                }
            }
        }

        if candidates.is_empty() {
            return 0;
        }

        candidates.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        let admit = (candidates.len() / 5).clamp(1, params.max_wave.max(1));

        let best = candidates[0];
        let mut added = 0;
        for candidate in candidates.into_iter().take(admit) {
            if !self.is_open(candidate.cell) {
                continue;
            }
            if self.count_at(candidate.height) >= params.max_duplicates * 2 {
                continue;
            }
            self.fill(candidate.cell, candidate.height);
            self.queue.push(candidate);
            added += 1;
        }

        if added == 0 {
            self.fill(best.cell, best.height);
            self.queue.push(best);
            added = 1;
        }
        added
    }

    /// Give every still-open cell `1 + min(filled 4-neighbors)`, sweeping
    /// column by column and repeating until nothing is open. The seed is
    /// always filled, so each sweep makes progress.
    fn complete(&mut self) -> Vec<IVec2> {
        let mut assigned = Vec::new();
        let total = self.cells.len();
        while self.filled < total {
            let before = assigned.len();
            for x in 0..self.cells.width() as i32 {
                for y in 0..self.cells.height() as i32 {
                    let cell = IVec2::new(x, y);
                    if !self.is_open(cell) {
                        continue;
                    }
                    let lowest = NEIGHBORS_4
                        .iter()
                        .filter_map(|&offset| self.cells.get(cell + offset).copied().flatten())
                        .min();
                    if let Some(lowest) = lowest {
                        self.fill(cell, lowest + 1);
                        assigned.push(cell);
                    }
                }
            }
            if assigned.len() == before {
                break;
            }
        }
        assigned
    }
}

/// Flood-fill a `width × height` field outward from its center.
///
/// # Panics
///
/// Panics if `width` or `height` is zero.
pub fn generate_wave<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    params: &WaveParams,
    rng: &mut R,
) -> WaveOutcome {
    let mut flood = Flood::new(width, height, params, rng);
    let total = flood.cells.len();
    let seed = flood.seed();

    let budget = total * params.iteration_factor;
    let mut iterations = 0;

    while flood.filled < total && iterations < budget {
        iterations += 1;
        flood.step(params, rng);
    }

    let fallback = if flood.filled < total {
        let fallback = flood.complete();
        warn!(
            width,
            height,
            iterations,
            cells = fallback.len(),
            "wave budget exhausted; completed remaining cells from neighbors"
        );
        fallback
    } else {
        Vec::new()
    };

    debug!(width, height, iterations, "wave fill finished");

    WaveOutcome {
        field: flood.cells.map(|value| value.unwrap_or_default()),
        seed,
        iterations,
        fallback,
    }
}
