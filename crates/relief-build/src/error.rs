use std::io;

use relief_heightmap::GeneratorError;
use relief_palette::PaletteError;
use thiserror::Error;

/// Errors from preparing or running a build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Bad dimensions or an unknown generator name.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    /// The source image is missing or unreadable.
    #[error(transparent)]
    Palette(#[from] PaletteError),
    /// Height and color fields disagree on size.
    #[error("height field is {heights:?} but color field is {colors:?}")]
    DimensionMismatch {
        heights: (u32, u32),
        colors: (u32, u32),
    },
    /// Generation stopped because the build was abandoned.
    #[error("build cancelled")]
    Cancelled,
    /// The generation worker thread could not be started.
    #[error("failed to spawn generation worker: {0}")]
    Worker(#[from] io::Error),
}
