//! Procedural height-map generation: closed-form layouts, a cellular filler
//! simulation and a noise-guided wave-front flood fill, looked up by name.

mod analytic;
mod filler;
mod grid;
mod registry;
mod seed;
mod wave;

pub use analytic::{manhattan, radial, snake, spiral};
pub use filler::{BrushMask, FillerOutcome, FillerParams, generate_filled};
pub use grid::{Grid, HeightField, IntCoord, NEIGHBORS_4, RealCoord, to_cell};
pub use registry::{
    GenerationParams, GeneratorError, GeneratorKind, GeneratorRegistry, validate_dimensions,
};
pub use seed::{generator_rng, random_seed};
pub use wave::{WaveOutcome, WaveParams, generate_wave};
