//! Paint agents and the shared canvas they fill.

use glam::{DVec2, IVec2};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::FillerParams;
use super::brush::BrushMask;
use crate::grid::{Grid, HeightField, NEIGHBORS_4, to_cell};

/// Working height grid where every cell starts unset and is assigned once.
pub(super) struct Canvas {
    cells: Grid<Option<i32>>,
    unfilled: usize,
}

impl Canvas {
    pub(super) fn new(width: u32, height: u32) -> Self {
        let cells = Grid::filled(width, height, None);
        let unfilled = cells.len();
        Self { cells, unfilled }
    }

    /// Height at `cell`, or `None` when unset or out of bounds.
    pub(super) fn height_at(&self, cell: IVec2) -> Option<i32> {
        self.cells.get(cell).copied().flatten()
    }

    /// Returns `true` for an in-bounds cell that has no height yet.
    pub(super) fn is_unset(&self, cell: IVec2) -> bool {
        matches!(self.cells.get(cell), Some(None))
    }

    /// Assign `height` to an unset in-bounds cell. Returns `false` (and leaves
    /// the cell untouched) for assigned or out-of-bounds cells.
    pub(super) fn assign(&mut self, cell: IVec2, height: i32) -> bool {
        match self.cells.get_mut(cell) {
            Some(slot @ None) => {
                *slot = Some(height);
                self.unfilled -= 1;
                true
            }
            _ => false,
        }
    }

    /// Propagate heights through every mask pair centered on `at`.
    pub(super) fn paint(&mut self, at: IVec2, mask: &BrushMask) {
        for &(previous, cell) in mask.pairs() {
            let Some(base) = self.height_at(at + previous) else {
                continue;
            };
            self.assign(at + cell, base + 1);
        }
    }

    pub(super) fn unfilled(&self) -> usize {
        self.unfilled
    }

    pub(super) fn is_complete(&self) -> bool {
        self.unfilled == 0
    }

    pub(super) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(super) fn unfilled_fraction(&self) -> f64 {
        self.unfilled as f64 / self.cells.len() as f64
    }

    /// Grid size as a continuous extent.
    fn extent(&self) -> DVec2 {
        DVec2::new(self.cells.width() as f64, self.cells.height() as f64)
    }

    fn unset_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.cells
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(cell, _)| cell)
    }

    /// Assign every remaining cell `1 + min(assigned 4-neighbors)`, sweeping
    /// until the grid is full. Returns the cells filled this way.
    pub(super) fn complete_from_neighbors(&mut self) -> Vec<IVec2> {
        let mut filled = Vec::new();
        while !self.is_complete() {
            let pending: Vec<IVec2> = self.unset_cells().collect();
            let before = filled.len();
            for cell in pending {
                let lowest = NEIGHBORS_4
                    .iter()
                    .filter_map(|&offset| self.height_at(cell + offset))
                    .min();
                if let Some(lowest) = lowest {
                    self.assign(cell, lowest + 1);
                    filled.push(cell);
                }
            }
            // Only an empty canvas has no neighbor to grow from.
            if filled.len() == before {
                break;
            }
        }
        filled
    }

    pub(super) fn into_field(self) -> HeightField {
        self.cells.map(|value| value.unwrap_or_default())
    }
}

/// A moving paint agent.
#[derive(Clone, Debug)]
pub(super) struct Filler {
    position: DVec2,
    velocity: DVec2,
    target: IVec2,
}

impl Filler {
    /// Place a new agent on `at` with a random velocity in `[-1, 1]²`, paint
    /// once and pick its first target.
    pub(super) fn spawn<R: Rng + ?Sized>(
        at: IVec2,
        canvas: &mut Canvas,
        mask: &BrushMask,
        params: &FillerParams,
        rng: &mut R,
    ) -> Self {
        let velocity = DVec2::new(
            rng.random::<f64>() * 2.0 - 1.0,
            rng.random::<f64>() * 2.0 - 1.0,
        );
        let mut filler = Self {
            position: at.as_dvec2(),
            velocity,
            target: at,
        };
        canvas.paint(at, mask);
        filler.retarget(canvas, mask, params, rng);
        filler
    }

    pub(super) fn cell(&self) -> IVec2 {
        to_cell(self.position)
    }

    /// One simulation step: move, bounce off the edges, paint, retarget on
    /// arrival and steer toward the target.
    pub(super) fn tick<R: Rng + ?Sized>(
        &mut self,
        canvas: &mut Canvas,
        mask: &BrushMask,
        params: &FillerParams,
        rng: &mut R,
    ) {
        self.position += self.velocity;

        let extent = canvas.extent();
        if self.position.x < 0.0 {
            self.position.x = 0.0;
            self.velocity.x = -self.velocity.x;
        } else if self.position.x >= extent.x {
            self.position.x = extent.x - 1.0;
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < 0.0 {
            self.position.y = 0.0;
            self.velocity.y = -self.velocity.y;
        } else if self.position.y >= extent.y {
            self.position.y = extent.y - 1.0;
            self.velocity.y = -self.velocity.y;
        }

        let here = self.cell();
        canvas.paint(here, mask);

        if here == self.target {
            self.retarget(canvas, mask, params, rng);
        }

        self.steer(params);
    }

    /// Sample up to `candidate_samples` unassigned cells and aim at the one
    /// whose brush footprint still covers the most unassigned cells.
    fn retarget<R: Rng + ?Sized>(
        &mut self,
        canvas: &Canvas,
        mask: &BrushMask,
        params: &FillerParams,
        rng: &mut R,
    ) {
        let here = self.cell();
        let open: Vec<IVec2> = canvas.unset_cells().filter(|&cell| cell != here).collect();

        let mut best: Option<(IVec2, f64)> = None;
        for &candidate in open.choose_multiple(rng, params.candidate_samples) {
            let uncovered = mask
                .footprint(candidate)
                .filter(|&cell| canvas.is_unset(cell))
                .count();
            let score = 1.0 + 1.5 * uncovered as f64;
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        self.target = best.map_or(here, |(cell, _)| cell);
    }

    /// Accelerate toward the target, snapping onto it once close enough, and
    /// cap the speed.
    fn steer(&mut self, params: &FillerParams) {
        let offset = self.target.as_dvec2() - self.position;
        let distance = offset.length();
        let direction = offset.normalize_or_zero();

        if distance < self.velocity.length() * params.arrival_factor {
            self.velocity = direction * distance;
        } else {
            self.velocity += direction * params.acceleration;
        }

        if self.velocity.length() > params.max_speed {
            self.velocity = self.velocity.normalize_or_zero() * params.max_speed;
        }
    }
}
