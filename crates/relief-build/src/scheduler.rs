//! Two-phase build scheduling.
//!
//! Generation runs on a dedicated worker thread per build and must finish
//! within the configured timeout. Finished builds become [`PlacementTask`]s
//! that the host drains a fixed batch at a time, once per tick. Everything
//! except the generation job itself runs on the thread that calls
//! [`BuildScheduler::tick`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use glam::IVec3;
use relief_heightmap::{
    GenerationParams, GeneratorRegistry, generator_rng, random_seed, validate_dimensions,
};
use relief_palette::{ImageSource, color_field};
use tracing::{debug, info};

use crate::block::BlockPos;
use crate::error::BuildError;
use crate::placement::{Placement, PlacementSink, build_placements};
use crate::report::{BuildEvent, BuildId, BuildReporter};
use crate::task::PlacementTask;

/// Scheduler tuning.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Writes applied per task per tick. Default: 15.
    pub batch_size: usize,
    /// Longest generation may take before the build is abandoned. Default: 30 s.
    pub timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 15,
            timeout: Duration::from_secs(30),
        }
    }
}

/// What to build and where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildRequest {
    pub width: u32,
    pub height: u32,
    /// Registered generator name, e.g. `v1` or `game`.
    pub generator: String,
    /// Image name relative to the scheduler's image directory.
    pub image: String,
    /// Seed for randomized generators; `None` draws a fresh one.
    pub seed: Option<u64>,
    /// World position of cell `(0, 0)` at height 0.
    pub origin: BlockPos,
}

impl BuildRequest {
    pub fn new(
        width: u32,
        height: u32,
        generator: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            width,
            height,
            generator: generator.into(),
            image: image.into(),
            seed: None,
            origin: IVec3::ZERO,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_origin(mut self, origin: BlockPos) -> Self {
        self.origin = origin;
        self
    }
}

/// What a generation worker hands back, stamped with when it finished.
type JobResult = (Result<Vec<Placement>, BuildError>, Instant);

/// A build whose generation job has not reported back yet.
struct PendingBuild {
    id: BuildId,
    receiver: Receiver<JobResult>,
    cancelled: Arc<AtomicBool>,
    deadline: Instant,
}

/// Owns in-flight builds and advances them on each host tick.
pub struct BuildScheduler<R: BuildReporter> {
    config: SchedulerConfig,
    registry: GeneratorRegistry,
    params: GenerationParams,
    images: ImageSource,
    reporter: R,
    pending: Vec<PendingBuild>,
    tasks: Vec<PlacementTask>,
    subscribed: bool,
    next_id: u64,
}

impl<R: BuildReporter> BuildScheduler<R> {
    /// Create a scheduler with the built-in generators and default tuning.
    pub fn new(config: SchedulerConfig, images: ImageSource, reporter: R) -> Self {
        Self {
            config,
            registry: GeneratorRegistry::default(),
            params: GenerationParams::default(),
            images,
            reporter,
            pending: Vec::new(),
            tasks: Vec::new(),
            subscribed: false,
            next_id: 0,
        }
    }

    pub fn with_registry(mut self, registry: GeneratorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    pub fn images(&self) -> &ImageSource {
        &self.images
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Validate `request` and start generating it in the background.
    ///
    /// Dimension, generator and image problems are reported here, before any
    /// thread is spawned; in that case no build is registered.
    pub fn submit(&mut self, request: BuildRequest) -> Result<BuildId, BuildError> {
        validate_dimensions(request.width, request.height)?;
        let kind = self.registry.lookup(&request.generator)?;
        let image = self.images.load(&request.image)?;

        let seed = request.seed.unwrap_or_else(random_seed);
        let params = self.params.clone();
        let BuildRequest {
            width,
            height,
            origin,
            ..
        } = request;

        let id = self.submit_job(move |cancelled| {
            let colors = color_field(&image, width, height);
            if cancelled.load(Ordering::Relaxed) {
                return Err(BuildError::Cancelled);
            }
            let mut rng = generator_rng(seed);
            let heights = kind.generate(width, height, &params, &mut rng)?;
            if cancelled.load(Ordering::Relaxed) {
                return Err(BuildError::Cancelled);
            }
            build_placements(origin, &heights, &colors)
        })?;

        info!(
            build = %id,
            generator = %kind,
            image = %request.image,
            width,
            height,
            seed,
            "build submitted"
        );
        Ok(id)
    }

    /// Run an arbitrary generation job on a worker thread under the timeout.
    ///
    /// The job receives the cancellation flag, which is raised when the build
    /// times out; a cancelled job's result is never applied.
    pub fn submit_job<F>(&mut self, job: F) -> Result<BuildId, BuildError>
    where
        F: FnOnce(&AtomicBool) -> Result<Vec<Placement>, BuildError> + Send + 'static,
    {
        let id = BuildId(self.next_id);
        let (sender, receiver) = bounded::<JobResult>(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        std::thread::Builder::new()
            .name(format!("relief-build-{}", id.0))
            .spawn(move || {
                let result = job(&flag);
                let finished = Instant::now();
                if !flag.load(Ordering::Relaxed) {
                    let _ = sender.send((result, finished));
                }
            })?;

        self.next_id += 1;
        self.pending.push(PendingBuild {
            id,
            receiver,
            cancelled,
            deadline: Instant::now() + self.config.timeout,
        });
        self.subscribed = true;
        Ok(id)
    }

    /// Advance every build by one host tick: collect finished generation
    /// jobs, expire overdue ones, then apply one batch of writes per task.
    pub fn tick(&mut self, sink: &mut dyn PlacementSink) {
        self.poll_pending();

        let batch_size = self.config.batch_size;
        let reporter = &mut self.reporter;
        self.tasks
            .retain_mut(|task| !task.process_next_batch(batch_size, sink, reporter));

        if self.subscribed && self.pending.is_empty() && self.tasks.is_empty() {
            self.subscribed = false;
            debug!("no builds in flight; leaving the tick loop");
        }
    }

    fn poll_pending(&mut self) {
        let now = Instant::now();
        let timeout = self.config.timeout;

        for pending in std::mem::take(&mut self.pending) {
            let id = pending.id;
            match pending.receiver.try_recv() {
                Ok((Ok(placements), finished)) if finished <= pending.deadline => {
                    self.reporter.report(BuildEvent::Started {
                        id,
                        total: placements.len(),
                    });
                    self.tasks.push(PlacementTask::new(id, placements));
                }
                Ok((Err(err), finished)) if finished <= pending.deadline => {
                    self.reporter.report(BuildEvent::Error {
                        id,
                        message: err.to_string(),
                    });
                }
                Ok(_) => {
                    self.reporter.report(BuildEvent::Timeout { id, after: timeout });
                }
                Err(TryRecvError::Empty) if now >= pending.deadline => {
                    pending.cancelled.store(true, Ordering::Relaxed);
                    self.reporter.report(BuildEvent::Timeout { id, after: timeout });
                }
                Err(TryRecvError::Empty) => self.pending.push(pending),
                Err(TryRecvError::Disconnected) => {
                    self.reporter.report(BuildEvent::Error {
                        id,
                        message: "generation worker exited without a result".to_string(),
                    });
                }
            }
        }
    }

    /// Builds still generating.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Builds currently placing blocks.
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the scheduler still needs host ticks.
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crossbeam_channel::{Sender, unbounded};
    use image::{Rgba, RgbaImage};
    use relief_heightmap::GeneratorError;
    use relief_palette::PaletteError;
    use std::path::Path;

    type TestScheduler = BuildScheduler<Sender<BuildEvent>>;

    fn write_image(dir: &Path) {
        RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))
            .save(dir.join("red.png"))
            .unwrap();
    }

    fn scheduler(dir: &Path, config: SchedulerConfig) -> (TestScheduler, Receiver<BuildEvent>) {
        let (tx, rx) = unbounded();
        (BuildScheduler::new(config, ImageSource::new(dir), tx), rx)
    }

    fn drive(scheduler: &mut TestScheduler, sink: &mut Vec<Placement>) -> usize {
        let mut ticks = 0;
        while scheduler.is_subscribed() && ticks < 2000 {
            scheduler.tick(sink);
            ticks += 1;
            std::thread::sleep(Duration::from_millis(2));
        }
        ticks
    }

    fn column(y: i32) -> Placement {
        Placement {
            pos: IVec3::new(0, y, 0),
            block: BlockKind::Air,
        }
    }

    #[test]
    fn test_unknown_generator_registers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path());
        let (mut scheduler, rx) = scheduler(dir.path(), SchedulerConfig::default());

        let err = scheduler
            .submit(BuildRequest::new(4, 4, "v9", "red.png"))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Generator(GeneratorError::UnknownGenerator(ref name)) if name == "v9"
        ));
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.active_count(), 0);
        assert!(!scheduler.is_subscribed());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path());
        let (mut scheduler, _rx) = scheduler(dir.path(), SchedulerConfig::default());
        let err = scheduler
            .submit(BuildRequest::new(0, 4, "v1", "red.png"))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Generator(GeneratorError::InvalidDimensions { .. })
        ));
        assert!(!scheduler.is_subscribed());
    }

    #[test]
    fn test_missing_image_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut scheduler, _rx) = scheduler(dir.path(), SchedulerConfig::default());
        let err = scheduler
            .submit(BuildRequest::new(4, 4, "v1", "absent.png"))
            .unwrap_err();
        assert!(matches!(err, BuildError::Palette(PaletteError::NotFound { .. })));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_full_build_places_everything_bottom_up() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path());
        let (mut scheduler, rx) = scheduler(dir.path(), SchedulerConfig::default());

        let id = scheduler
            .submit(BuildRequest::new(5, 5, "v1", "red.png").with_origin(IVec3::new(0, 60, 0)))
            .unwrap();
        assert!(scheduler.is_subscribed());

        let mut sink = Vec::new();
        drive(&mut scheduler, &mut sink);
        assert!(!scheduler.is_subscribed());

        let events: Vec<BuildEvent> = rx.try_iter().collect();
        let Some(BuildEvent::Started { total, .. }) = events.first().cloned() else {
            panic!("expected Started first, got {events:?}");
        };
        assert_eq!(sink.len(), total);
        assert_eq!(
            events.last(),
            Some(&BuildEvent::Completed { id, placed: total })
        );
        assert!(sink.windows(2).all(|w| w[0].pos.y <= w[1].pos.y));
        assert_eq!(sink[0].block, BlockKind::Torch);
        assert_eq!(sink[0].pos, IVec3::new(2, 60, 2));
    }

    #[test]
    fn test_seeded_builds_are_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path());

        let mut runs = Vec::new();
        for _ in 0..2 {
            let (mut scheduler, _rx) = scheduler(dir.path(), SchedulerConfig::default());
            scheduler
                .submit(BuildRequest::new(8, 6, "game", "red.png").with_seed(99))
                .unwrap();
            let mut sink = Vec::new();
            drive(&mut scheduler, &mut sink);
            runs.push(sink);
        }
        assert_eq!(runs[0], runs[1]);
    }

    #[test]
    fn test_job_batches_across_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let (mut scheduler, rx) = scheduler(dir.path(), SchedulerConfig::default());
        let id = scheduler
            .submit_job(|_| Ok((0..100).map(column).collect()))
            .unwrap();

        let mut sink = Vec::new();
        while scheduler.active_count() == 0 && scheduler.is_subscribed() {
            scheduler.tick(&mut sink);
            std::thread::sleep(Duration::from_millis(1));
        }
        // The tick that picked up the result also applied the first batch.
        let mut ticks = 1;
        while scheduler.is_subscribed() {
            scheduler.tick(&mut sink);
            ticks += 1;
        }

        assert_eq!(ticks, 7);
        assert_eq!(sink.len(), 100);
        let events: Vec<BuildEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                BuildEvent::Started { id, total: 100 },
                BuildEvent::Progress { id, percent: 25 },
                BuildEvent::Progress { id, percent: 50 },
                BuildEvent::Progress { id, percent: 75 },
                BuildEvent::Completed { id, placed: 100 },
            ]
        );
    }

    #[test]
    fn test_slow_generation_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let config = SchedulerConfig {
            timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let (mut scheduler, rx) = scheduler(dir.path(), config);

        let id = scheduler
            .submit_job(|_| {
                std::thread::sleep(Duration::from_millis(300));
                Ok(vec![column(0)])
            })
            .unwrap();

        std::thread::sleep(Duration::from_millis(80));
        let mut sink = Vec::new();
        scheduler.tick(&mut sink);

        assert_eq!(
            rx.try_recv().unwrap(),
            BuildEvent::Timeout {
                id,
                after: Duration::from_millis(20)
            }
        );
        assert_eq!(scheduler.active_count(), 0);
        assert!(!scheduler.is_subscribed());

        // The late result is never applied.
        std::thread::sleep(Duration::from_millis(350));
        scheduler.tick(&mut sink);
        assert!(sink.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_job_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut scheduler, rx) = scheduler(dir.path(), SchedulerConfig::default());
        let id = scheduler
            .submit_job(|_| Err(BuildError::Generator(GeneratorError::UnknownGenerator("x".into()))))
            .unwrap();

        drive(&mut scheduler, &mut Vec::new());
        assert_eq!(
            rx.try_recv().unwrap(),
            BuildEvent::Error {
                id,
                message: "unknown generator: x".to_string()
            }
        );
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_panicking_job_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut scheduler, rx) = scheduler(dir.path(), SchedulerConfig::default());
        scheduler
            .submit_job(|_| panic!("generation blew up"))
            .unwrap();

        drive(&mut scheduler, &mut Vec::new());
        assert!(matches!(rx.try_recv().unwrap(), BuildEvent::Error { .. }));
        assert!(!scheduler.is_subscribed());
    }

    #[test]
    fn test_build_ids_increase() {
        let dir = tempfile::tempdir().unwrap();
        let (mut scheduler, _rx) = scheduler(dir.path(), SchedulerConfig::default());
        let a = scheduler.submit_job(|_| Ok(Vec::new())).unwrap();
        let b = scheduler.submit_job(|_| Ok(Vec::new())).unwrap();
        assert!(a < b);
        assert_eq!(scheduler.pending_count(), 2);
    }
}
