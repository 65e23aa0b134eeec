//! In-memory block store used as the placement target.

use glam::IVec3;
use hashbrown::HashMap;
use relief_build::{BlockKind, BlockPos, PlacementSink};

/// Sparse block world. Positions never written read as air.
#[derive(Debug, Default)]
pub struct BlockWorld {
    blocks: HashMap<BlockPos, BlockKind>,
    writes: usize,
}

impl BlockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block at `pos`, or [`BlockKind::Air`] if nothing solid is there.
    pub fn get(&self, pos: BlockPos) -> BlockKind {
        self.blocks.get(&pos).copied().unwrap_or(BlockKind::Air)
    }

    /// Number of non-air blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total writes received, air included.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn count(&self, kind: BlockKind) -> usize {
        self.blocks.values().filter(|&&block| block == kind).count()
    }

    /// Highest non-air `y` in the column at `(x, z)`.
    pub fn column_top(&self, x: i32, z: i32) -> Option<i32> {
        self.blocks
            .keys()
            .filter(|pos| pos.x == x && pos.z == z)
            .map(|pos| pos.y)
            .max()
    }

    /// Inclusive corners of the box holding every non-air block.
    pub fn bounds(&self) -> Option<(IVec3, IVec3)> {
        let mut positions = self.blocks.keys();
        let first = *positions.next()?;
        Some(positions.fold((first, first), |(min, max), &pos| {
            (min.min(pos), max.max(pos))
        }))
    }
}

impl PlacementSink for BlockWorld {
    fn write(&mut self, pos: BlockPos, block: BlockKind) {
        self.writes += 1;
        match block {
            BlockKind::Air => {
                self.blocks.remove(&pos);
            }
            block => {
                self.blocks.insert(pos, block);
            }
        }
    }
}
