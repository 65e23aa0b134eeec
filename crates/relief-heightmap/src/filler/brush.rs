//! Randomized, four-way symmetric brush masks.

use glam::IVec2;
use hashbrown::HashSet;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Quadrant flips applied cumulatively to the first-quadrant pattern.
const MIRRORS: [IVec2; 3] = [IVec2::new(-1, 1), IVec2::new(1, -1), IVec2::new(-1, -1)];

/// A set of `(predecessor, target)` offset pairs describing how one paint
/// step propagates height outward from the brush center.
///
/// Each target offset is edge-adjacent to its predecessor, and pairs are
/// ordered so that a predecessor is always painted before its own targets
/// within the same quadrant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrushMask {
    pairs: Vec<(IVec2, IVec2)>,
}

impl BrushMask {
    /// Build a mask reaching `strength - 1` diagonal rings out from the center.
    ///
    /// Every ring cell `(a, b)` picks one predecessor among `(a - 1, b)` and
    /// `(a, b - 1)`, at random when both exist, which yields a connected but
    /// irregular growth pattern instead of a rigid diamond.
    ///
    /// # Panics
    ///
    /// Panics if a ring cell has no predecessor. Every cell other than the
    /// center has one, so this indicates a broken ring enumeration.
    pub fn new<R: Rng + ?Sized>(strength: u32, rng: &mut R) -> Self {
        let strength = strength as i32;
        let mut pairs = Vec::new();

        for ring in 0..strength {
            for b in 0..=ring {
                let a = ring - b;
                if a == 0 && b == 0 {
                    continue;
                }

                let cell = IVec2::new(a, b);
                let options: Vec<IVec2> = [
                    (a > 0).then(|| IVec2::new(a - 1, b)),
                    (b > 0).then(|| IVec2::new(a, b - 1)),
                ]
                .into_iter()
                .flatten()
                .collect();

                let Some(&previous) = options.choose(rng) else {
                    panic!("brush cell {cell} has no predecessor");
                };
                pairs.push((previous, cell));
            }
        }

        for flip in MIRRORS {
            let mirrored: Vec<_> = pairs
                .iter()
                .map(|&(previous, cell)| (previous * flip, cell * flip))
                .collect();
            pairs.extend(mirrored);
        }

        let mut seen = HashSet::with_capacity(pairs.len());
        pairs.retain(|pair| seen.insert(*pair));

        Self { pairs }
    }

    /// All `(predecessor, target)` offset pairs in paint order.
    pub fn pairs(&self) -> &[(IVec2, IVec2)] {
        &self.pairs
    }

    /// Absolute target cells covered when the brush is centered on `at`.
    pub fn footprint(&self, at: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        self.pairs.iter().map(move |&(_, cell)| at + cell)
    }

    /// Number of offset pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` for a strength-0 or strength-1 brush.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
