//! Placement lists: which block goes where, in bottom-up order.

use glam::{IVec2, IVec3};
use relief_heightmap::HeightField;
use relief_palette::ColorField;

use crate::block::{BlockKind, BlockPos, Facing};
use crate::error::BuildError;

/// Receives block writes. Implemented by whatever owns the world.
pub trait PlacementSink {
    fn write(&mut self, pos: BlockPos, block: BlockKind);
}

impl PlacementSink for Vec<Placement> {
    fn write(&mut self, pos: BlockPos, block: BlockKind) {
        self.push(Placement { pos, block });
    }
}

/// One block write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub pos: BlockPos,
    pub block: BlockKind,
}

impl Placement {
    fn new(pos: BlockPos, block: BlockKind) -> Self {
        Self { pos, block }
    }
}

/// Build the ordered placement list for a relief rooted at `origin`.
///
/// Cell `(x, y)` with height `h` maps to the column `(origin.x + x, origin.z + y)`:
/// a primary block at `origin.y + h + 1`, a torch at `origin.y + h` when
/// `h == 0`, and a wall torch in each neighbor column whose height is exactly
/// `h + 1`, at the primary block's level and facing that neighbor.
///
/// The result is stably sorted by `y`, so lower blocks are always written
/// before higher ones.
pub fn build_placements(
    origin: BlockPos,
    heights: &HeightField,
    colors: &ColorField,
) -> Result<Vec<Placement>, BuildError> {
    if heights.dimensions() != colors.dimensions() {
        return Err(BuildError::DimensionMismatch {
            heights: heights.dimensions(),
            colors: colors.dimensions(),
        });
    }

    let mut placements = Vec::with_capacity(heights.len() * 2);

    for (cell, &h) in heights.iter() {
        let column = origin + IVec3::new(cell.x, h, cell.y);
        let primary = column + IVec3::Y;

        if h == 0 {
            placements.push(Placement::new(column, BlockKind::Torch));
        }
        placements.push(Placement::new(primary, BlockKind::for_color(colors[cell])));

        for facing in Facing::ALL {
            let step = facing.offset();
            let neighbor = cell + IVec2::new(step.x, step.z);
            if heights.get(neighbor).is_some_and(|&n| n - 1 == h) {
                placements.push(Placement::new(primary + step, BlockKind::WallTorch(facing)));
            }
        }
    }

    placements.sort_by_key(|placement| placement.pos.y);
    Ok(placements)
}
