//! Loading source images from a base directory and turning them into
//! [`ColorField`]s.

use std::io;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use image::imageops::FilterType;
use relief_heightmap::Grid;
use thiserror::Error;
use tracing::debug;

use crate::label::{ColorLabel, classify};

/// Dense grid of color labels, one per height-field cell.
pub type ColorField = Grid<ColorLabel>;

/// Extensions accepted as source images, lowercase.
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Errors raised while resolving or decoding a source image.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// No readable image with this name exists under the base directory.
    #[error("image not found: {name}")]
    NotFound { name: String },
    /// The file exists but could not be decoded.
    #[error("failed to decode image {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    /// The base directory could not be listed.
    #[error("failed to list images in {}: {source}", dir.display())]
    List {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Sorted file names of every `.png`/`.jpg` image directly inside `dir`.
pub fn list_images(dir: &Path) -> Result<Vec<String>, PaletteError> {
    let entries = std::fs::read_dir(dir).map_err(|source| PaletteError::List {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_image_extension(path))
        .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
        .collect();
    names.sort();
    Ok(names)
}

/// Resample `image` to `width × height` with nearest-neighbor sampling and
/// classify every pixel. Fully transparent pixels become [`ColorLabel::Unknown`].
pub fn color_field(image: &DynamicImage, width: u32, height: u32) -> ColorField {
    let resized = image
        .resize_exact(width, height, FilterType::Nearest)
        .to_rgba8();
    Grid::from_fn(width, height, |cell| {
        let [r, g, b, a] = resized.get_pixel(cell.x as u32, cell.y as u32).0;
        if a == 0 {
            ColorLabel::Unknown
        } else {
            classify([r, g, b])
        }
    })
}

/// Source images resolved by name relative to a base directory.
#[derive(Clone, Debug)]
pub struct ImageSource {
    base_dir: PathBuf,
}

impl ImageSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `name` to a file path. A bare name without an extension tries
    /// each accepted extension in turn. Names that would escape the base
    /// directory are never resolved.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let plain = relative.components().count() == 1
            && matches!(relative.components().next(), Some(std::path::Component::Normal(_)));
        if name.is_empty() || !plain {
            return None;
        }

        let direct = self.base_dir.join(relative);
        if relative.extension().is_some() {
            return (direct.is_file() && has_image_extension(&direct)).then_some(direct);
        }

        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| direct.with_extension(ext))
            .find(|path| path.is_file())
    }

    /// Load and decode the image called `name`.
    pub fn load(&self, name: &str) -> Result<DynamicImage, PaletteError> {
        let path = self.resolve(name).ok_or_else(|| PaletteError::NotFound {
            name: name.to_string(),
        })?;
        let image = image::open(&path).map_err(|source| PaletteError::Decode {
            name: name.to_string(),
            source,
        })?;
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "loaded source image"
        );
        Ok(image)
    }

    /// Load `name` and classify it at `width × height`.
    pub fn color_field(
        &self,
        name: &str,
        width: u32,
        height: u32,
    ) -> Result<ColorField, PaletteError> {
        Ok(color_field(&self.load(name)?, width, height))
    }

    /// Image names available under the base directory.
    pub fn list(&self) -> Result<Vec<String>, PaletteError> {
        list_images(&self.base_dir)
    }
}
