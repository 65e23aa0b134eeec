//! Block kinds written into the world.

use std::fmt;

use glam::IVec3;
use relief_palette::ColorLabel;

/// World block position. `y` is up; height-field `y` maps onto world `z`.
pub type BlockPos = IVec3;

/// Horizontal direction a wall-mounted block points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// `+x`
    East,
    /// `-x`
    West,
    /// `+z`
    South,
    /// `-z`
    North,
}

impl Facing {
    /// Order in which wall decorations are emitted for a cell.
    pub const ALL: [Facing; 4] = [Facing::East, Facing::West, Facing::South, Facing::North];

    /// Unit step in world space.
    pub fn offset(self) -> IVec3 {
        match self {
            Facing::East => IVec3::X,
            Facing::West => IVec3::NEG_X,
            Facing::South => IVec3::Z,
            Facing::North => IVec3::NEG_Z,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Facing::East => "east",
            Facing::West => "west",
            Facing::South => "south",
            Facing::North => "north",
        }
    }
}

/// What a single placement puts into the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Free-standing light source marking a height-0 cell.
    Torch,
    /// Light source mounted on a block side, pointing the given way.
    WallTorch(Facing),
    /// Colored powder block.
    Powder(ColorLabel),
    Air,
}

impl BlockKind {
    /// The primary block for a classified color; unknown colors become air.
    pub fn for_color(label: ColorLabel) -> Self {
        match label {
            ColorLabel::Unknown => BlockKind::Air,
            label => BlockKind::Powder(label),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Torch => f.write_str("torch"),
            BlockKind::WallTorch(facing) => write!(f, "wall_torch[facing={}]", facing.name()),
            BlockKind::Powder(label) => write!(f, "{label}_concrete_powder"),
            BlockKind::Air => f.write_str("air"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_color_is_air() {
        assert_eq!(BlockKind::for_color(ColorLabel::Unknown), BlockKind::Air);
        assert_eq!(
            BlockKind::for_color(ColorLabel::Cyan),
            BlockKind::Powder(ColorLabel::Cyan)
        );
    }

    #[test]
    fn test_facing_offsets_are_unit_horizontal() {
        for facing in Facing::ALL {
            let o = facing.offset();
            assert_eq!(o.y, 0);
            assert_eq!(o.abs().element_sum(), 1);
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(BlockKind::Powder(ColorLabel::LightGray).to_string(), "light_gray_concrete_powder");
        assert_eq!(BlockKind::WallTorch(Facing::North).to_string(), "wall_torch[facing=north]");
    }
}
