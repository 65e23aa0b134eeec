//! The fixed block palette and nearest-color classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical color of one source pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorLabel {
    White,
    Orange,
    Magenta,
    LightGray,
    Yellow,
    Lime,
    Pink,
    Gray,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
    /// No palette entry applies. Placed as air.
    Unknown,
}

impl ColorLabel {
    /// Lowercase snake-case name, e.g. `light_gray`.
    pub fn name(self) -> &'static str {
        match self {
            ColorLabel::White => "white",
            ColorLabel::Orange => "orange",
            ColorLabel::Magenta => "magenta",
            ColorLabel::LightGray => "light_gray",
            ColorLabel::Yellow => "yellow",
            ColorLabel::Lime => "lime",
            ColorLabel::Pink => "pink",
            ColorLabel::Gray => "gray",
            ColorLabel::Cyan => "cyan",
            ColorLabel::Purple => "purple",
            ColorLabel::Blue => "blue",
            ColorLabel::Brown => "brown",
            ColorLabel::Green => "green",
            ColorLabel::Red => "red",
            ColorLabel::Black => "black",
            ColorLabel::Unknown => "unknown",
        }
    }

    /// Representative RGB for previews: the first palette entry with this
    /// label, or mid gray for [`ColorLabel::Unknown`].
    pub fn rgb(self) -> [u8; 3] {
        PALETTE
            .iter()
            .find(|(label, _)| *label == self)
            .map_or([128, 128, 128], |&(_, rgb)| rgb)
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered palette. Gray appears twice (mid and dark); order decides ties.
pub const PALETTE: [(ColorLabel, [u8; 3]); 16] = [
    (ColorLabel::White, [255, 255, 255]),
    (ColorLabel::Orange, [255, 200, 0]),
    (ColorLabel::Magenta, [255, 0, 255]),
    (ColorLabel::LightGray, [192, 192, 192]),
    (ColorLabel::Yellow, [255, 255, 0]),
    (ColorLabel::Lime, [204, 255, 0]),
    (ColorLabel::Pink, [255, 175, 175]),
    (ColorLabel::Gray, [128, 128, 128]),
    (ColorLabel::Cyan, [0, 255, 255]),
    (ColorLabel::Purple, [153, 0, 153]),
    (ColorLabel::Blue, [0, 0, 255]),
    (ColorLabel::Brown, [153, 102, 51]),
    (ColorLabel::Gray, [63, 63, 63]),
    (ColorLabel::Green, [0, 255, 0]),
    (ColorLabel::Red, [255, 0, 0]),
    (ColorLabel::Black, [0, 0, 0]),
];

#[inline]
fn distance_sq(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b)
        .map(|(&x, y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// Nearest palette label by squared RGB distance; the earlier entry wins ties.
pub fn classify(rgb: [u8; 3]) -> ColorLabel {
    let mut best = ColorLabel::Unknown;
    let mut best_distance = u32::MAX;
    for &(label, entry) in &PALETTE {
        let d = distance_sq(rgb, entry);
        if d < best_distance {
            best = label;
            best_distance = d;
        }
    }
    best
}
