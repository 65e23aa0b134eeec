//! Color classification for source images: a fixed block palette, nearest-color
//! lookup, and loading of `.png`/`.jpg` images from a base directory.

mod label;
mod source;

pub use label::{ColorLabel, PALETTE, classify};
pub use source::{ColorField, ImageSource, PaletteError, color_field, list_images};
