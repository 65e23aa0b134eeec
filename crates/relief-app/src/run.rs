//! One build from command line to finished world.

use std::path::PathBuf;
use std::time::Duration;

use glam::IVec3;
use image::ImageError;
use relief_build::{
    BuildError, BuildEvent, BuildId, BuildReporter, BuildRequest, BuildScheduler, LogReporter,
    SchedulerConfig,
};
use relief_config::{Config, GenerationConfig};
use relief_heightmap::{
    FillerParams, GenerationParams, GeneratorError, GeneratorRegistry, WaveParams, generator_rng,
    random_seed,
};
use relief_palette::{ImageSource, PaletteError};
use thiserror::Error;
use tracing::info;

use crate::cli::Cli;
use crate::preview::save_preview;
use crate::tick_loop::TickLoop;
use crate::world::BlockWorld;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error("failed to write preview {}: {source}", path.display())]
    Preview { path: PathBuf, source: ImageError },
    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),
    #[error("generation failed: {0}")]
    Failed(String),
    #[error("width, height, generator and image are required")]
    MissingTarget,
}

/// What a finished build produced.
#[derive(Debug)]
pub struct BuildSummary {
    pub id: BuildId,
    pub seed: u64,
    pub placed: usize,
    pub ticks: u64,
    /// Inclusive corners of the placed blocks.
    pub bounds: Option<(IVec3, IVec3)>,
}

/// Generators and images available to a build.
#[derive(Debug)]
pub struct Listing {
    pub generators: Vec<String>,
    pub images: Vec<String>,
}

/// Logs every event and keeps the one that ended the build.
#[derive(Debug, Default)]
pub struct OutcomeReporter {
    log: LogReporter,
    outcome: Option<BuildEvent>,
}

impl OutcomeReporter {
    pub fn outcome(&self) -> Option<&BuildEvent> {
        self.outcome.as_ref()
    }
}

impl BuildReporter for OutcomeReporter {
    fn report(&mut self, event: BuildEvent) {
        if event.is_terminal() {
            self.outcome = Some(event.clone());
        }
        self.log.report(event);
    }
}

pub fn scheduler_config(config: &Config) -> SchedulerConfig {
    SchedulerConfig {
        batch_size: config.build.batch_size,
        timeout: Duration::from_secs(config.build.timeout_secs),
    }
}

pub fn generation_params(config: &GenerationConfig) -> GenerationParams {
    GenerationParams {
        filler: FillerParams {
            brush_strength: config.brush_strength,
            candidate_samples: config.candidate_samples,
            max_fillers: config.max_fillers,
            spawn_rate: config.spawn_rate,
            max_speed: config.max_speed,
            ..FillerParams::default()
        },
        wave: WaveParams {
            noise_scale: config.noise_scale,
            max_duplicates: config.max_duplicates,
            min_acceptance: config.min_acceptance,
            ..WaveParams::default()
        },
    }
}

pub fn list(config: &Config) -> Result<Listing, AppError> {
    let images = ImageSource::new(&config.images.directory).list()?;
    let generators = GeneratorRegistry::default()
        .names()
        .map(str::to_string)
        .collect();
    Ok(Listing { generators, images })
}

/// Submit the build described by `cli`, tick it to completion and report
/// how it ended.
pub fn run(cli: &Cli, config: &Config) -> Result<BuildSummary, AppError> {
    let (Some(width), Some(height), Some(generator), Some(image)) =
        (cli.width, cli.height, cli.generator.as_deref(), cli.image.as_deref())
    else {
        return Err(AppError::MissingTarget);
    };

    let images = ImageSource::new(&config.images.directory);
    let params = generation_params(&config.generation);
    let seed = cli
        .seed
        .or(config.generation.seed)
        .unwrap_or_else(random_seed);
    let origin = cli.origin.unwrap_or_else(|| IVec3::from(config.build.origin));

    let mut scheduler =
        BuildScheduler::new(scheduler_config(config), images.clone(), OutcomeReporter::default())
            .with_params(params.clone());
    let request = BuildRequest::new(width, height, generator, image)
        .with_seed(seed)
        .with_origin(origin);
    let id = scheduler.submit(request)?;

    let mut world = BlockWorld::new();
    let mut tick_loop = TickLoop::new(config.server.ticks_per_second);
    tick_loop.run(|_| {
        scheduler.tick(&mut world);
        scheduler.is_subscribed()
    });

    let placed = placed_count(scheduler.reporter().outcome())?;

    // Only a build that generated within the timeout gets a preview.
    if let Some(path) = &cli.preview {
        let kind = scheduler.registry().lookup(generator)?;
        let heights = kind.generate(width, height, &params, &mut generator_rng(seed))?;
        let colors = images.color_field(image, width, height)?;
        save_preview(&heights, &colors, path).map_err(|source| AppError::Preview {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "preview written");
    }

    Ok(BuildSummary {
        id,
        seed,
        placed,
        ticks: tick_loop.tick_count(),
        bounds: world.bounds(),
    })
}

/// Blocks written by a completed build, or why the build did not complete.
fn placed_count(outcome: Option<&BuildEvent>) -> Result<usize, AppError> {
    match outcome {
        Some(BuildEvent::Completed { placed, .. }) => Ok(*placed),
        Some(BuildEvent::Timeout { after, .. }) => Err(AppError::TimedOut(*after)),
        Some(BuildEvent::Error { message, .. }) => Err(AppError::Failed(message.clone())),
        _ => Err(AppError::Failed("build ended without a result".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use image::{Rgba, RgbaImage};
    use std::path::Path;

    fn config_with_images(dir: &Path) -> Config {
        let mut config = Config::default();
        config.images.directory = dir.to_path_buf();
        config.server.ticks_per_second = 1000;
        config.build.batch_size = 50;
        config
    }

    fn write_image(dir: &Path, name: &str) {
        RgbaImage::from_pixel(6, 6, Rgba([0, 0, 255, 255]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_generation_params_follow_config() {
        let mut generation = GenerationConfig::default();
        generation.brush_strength = 5;
        generation.noise_scale = 0.4;
        generation.max_duplicates = 3;

        let params = generation_params(&generation);
        assert_eq!(params.filler.brush_strength, 5);
        assert_eq!(params.wave.noise_scale, 0.4);
        assert_eq!(params.wave.max_duplicates, 3);
        assert_eq!(params.filler.acceleration, FillerParams::default().acceleration);
    }

    #[test]
    fn test_scheduler_config_follows_config() {
        let mut config = Config::default();
        config.build.batch_size = 40;
        config.build.timeout_secs = 5;
        let scheduler = scheduler_config(&config);
        assert_eq!(scheduler.batch_size, 40);
        assert_eq!(scheduler.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_outcome_keeps_terminal_event() {
        let mut reporter = OutcomeReporter::default();
        let id = BuildId(0);
        reporter.report(BuildEvent::Started { id, total: 4 });
        assert!(reporter.outcome().is_none());
        reporter.report(BuildEvent::Completed { id, placed: 4 });
        assert_eq!(reporter.outcome(), Some(&BuildEvent::Completed { id, placed: 4 }));
    }

    #[test]
    fn test_only_completed_builds_count() {
        let id = BuildId(2);
        assert_eq!(
            placed_count(Some(&BuildEvent::Completed { id, placed: 9 })).unwrap(),
            9
        );

        let timeout = BuildEvent::Timeout {
            id,
            after: Duration::from_secs(30),
        };
        assert!(matches!(
            placed_count(Some(&timeout)),
            Err(AppError::TimedOut(after)) if after == Duration::from_secs(30)
        ));

        let error = BuildEvent::Error {
            id,
            message: "worker exited".to_string(),
        };
        assert!(matches!(placed_count(Some(&error)), Err(AppError::Failed(_))));
        assert!(matches!(placed_count(None), Err(AppError::Failed(_))));
        assert!(matches!(
            placed_count(Some(&BuildEvent::Started { id, total: 3 })),
            Err(AppError::Failed(_))
        ));
    }

    #[test]
    fn test_list() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png");
        write_image(dir.path(), "a.png");

        let listing = list(&config_with_images(dir.path())).unwrap();
        assert_eq!(listing.images, vec!["a.png", "b.png"]);
        assert_eq!(listing.generators.len(), 6);
        assert!(listing.generators.iter().any(|name| name == "wave_noise"));
    }

    #[test]
    fn test_full_build_with_preview() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "sea.png");
        let preview = dir.path().join("preview.png");
        let preview_arg = preview.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "relief", "4", "4", "v1", "sea", "--origin", "0,10,0", "--preview", &preview_arg,
        ])
        .unwrap();
        let summary = run(&cli, &config_with_images(dir.path())).unwrap();

        // 16 primaries and one torch at the single zero cell of the 4x4 radial field.
        assert!(summary.placed >= 17);
        assert!(summary.ticks >= 1);
        let (min, max) = summary.bounds.unwrap();
        assert_eq!(min, IVec3::new(0, 10, 0));
        assert_eq!(max.y, 10 + 4 + 1);
        assert!(preview.exists());
    }

    #[test]
    fn test_seeded_randomized_build() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "sea.png");
        let config = config_with_images(dir.path());

        let cli = Cli::try_parse_from(["relief", "6", "5", "wave_noise", "sea", "--seed", "11"])
            .unwrap();
        let first = run(&cli, &config).unwrap();
        let second = run(&cli, &config).unwrap();
        assert_eq!(first.seed, 11);
        assert_eq!(first.placed, second.placed);
        assert_eq!(first.bounds, second.bounds);
    }

    #[test]
    fn test_unknown_generator_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "sea.png");
        let cli = Cli::try_parse_from(["relief", "4", "4", "v9", "sea"]).unwrap();

        let err = run(&cli, &config_with_images(dir.path())).unwrap_err();
        assert!(matches!(
            err,
            AppError::Build(BuildError::Generator(GeneratorError::UnknownGenerator(_)))
        ));
    }

    #[test]
    fn test_missing_image_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["relief", "4", "4", "v2", "nowhere"]).unwrap();

        let err = run(&cli, &config_with_images(dir.path())).unwrap_err();
        assert!(matches!(err, AppError::Build(BuildError::Palette(_))));
    }
}
