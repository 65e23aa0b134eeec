//! Generator registry: maps user-facing names to the closed set of
//! height-field generators.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use rand::Rng;
use thiserror::Error;

use crate::analytic;
use crate::filler::{FillerParams, generate_filled};
use crate::grid::HeightField;
use crate::wave::{WaveParams, generate_wave};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised before any generation work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// No generator is registered under this name.
    #[error("unknown generator: {0}")]
    UnknownGenerator(String),
    /// A generator with the same name is already registered.
    #[error("duplicate generator name: {0}")]
    DuplicateName(String),
    /// Width or height is zero, or the grid would not be indexable.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Reject empty grids and grids whose cell count overflows `i32` heights.
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), GeneratorError> {
    let cells = width as u64 * height as u64;
    if width == 0 || height == 0 || cells > i32::MAX as u64 {
        return Err(GeneratorError::InvalidDimensions { width, height });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Generator kinds
// ---------------------------------------------------------------------------

/// Tuning for the randomized generators. Analytic variants ignore it.
#[derive(Clone, Debug, Default)]
pub struct GenerationParams {
    pub filler: FillerParams,
    pub wave: WaveParams,
}

/// Every height-field generator, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    /// `v1`: diamond pyramid centered on the grid.
    Radial,
    /// `v2`: Manhattan distance from the origin corner.
    Manhattan,
    /// `v3`: column-wise boustrophedon.
    Snake,
    /// `v4`: concentric rectangular spiral.
    Spiral,
    /// `game`: cellular filler simulation.
    Filler,
    /// `wave_noise`: noise-guided wave-front flood fill.
    WaveNoise,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 6] = [
        GeneratorKind::Radial,
        GeneratorKind::Manhattan,
        GeneratorKind::Snake,
        GeneratorKind::Spiral,
        GeneratorKind::Filler,
        GeneratorKind::WaveNoise,
    ];

    /// The name this generator is registered under by default.
    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::Radial => "v1",
            GeneratorKind::Manhattan => "v2",
            GeneratorKind::Snake => "v3",
            GeneratorKind::Spiral => "v4",
            GeneratorKind::Filler => "game",
            GeneratorKind::WaveNoise => "wave_noise",
        }
    }

    /// Returns `true` if the output depends on the random source.
    pub fn is_randomized(self) -> bool {
        matches!(self, GeneratorKind::Filler | GeneratorKind::WaveNoise)
    }

    /// Produce a fully assigned `width × height` field.
    pub fn generate<R: Rng + ?Sized>(
        self,
        width: u32,
        height: u32,
        params: &GenerationParams,
        rng: &mut R,
    ) -> Result<HeightField, GeneratorError> {
        validate_dimensions(width, height)?;

        let field = match self {
            GeneratorKind::Radial => analytic::radial(width, height),
            GeneratorKind::Manhattan => analytic::manhattan(width, height),
            GeneratorKind::Snake => analytic::snake(width, height),
            GeneratorKind::Spiral => analytic::spiral(width, height),
            GeneratorKind::Filler => generate_filled(width, height, &params.filler, rng).field,
            GeneratorKind::WaveNoise => generate_wave(width, height, &params.wave, rng).field,
        };
        Ok(field)
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeneratorKind {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeneratorKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| GeneratorError::UnknownGenerator(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Name → generator table with stable registration order.
#[derive(Clone, Debug)]
pub struct GeneratorRegistry {
    names: Vec<String>,
    by_name: HashMap<String, GeneratorKind>,
}

impl GeneratorRegistry {
    /// An empty registry. Use [`Default`] for the built-in table.
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register `kind` under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: GeneratorKind,
    ) -> Result<(), GeneratorError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(GeneratorError::DuplicateName(name));
        }
        self.by_name.insert(name.clone(), kind);
        self.names.push(name);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<GeneratorKind, GeneratorError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| GeneratorError::UnknownGenerator(name.to_string()))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in GeneratorKind::ALL {
            registry.by_name.insert(kind.name().to_string(), kind);
            registry.names.push(kind.name().to_string());
        }
        registry
    }
}
