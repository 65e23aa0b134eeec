//! A build in its placement phase: a cursor over an ordered write list.

use crate::placement::{Placement, PlacementSink};
use crate::report::{BuildEvent, BuildId, BuildReporter};

/// Progress percentages reported while a task drains.
const MILESTONES: [u8; 3] = [25, 50, 75];

/// Ordered writes plus the cursor and reporting state for one build.
#[derive(Debug)]
pub struct PlacementTask {
    id: BuildId,
    placements: Vec<Placement>,
    cursor: usize,
    last_milestone: u8,
    completed: bool,
}

impl PlacementTask {
    pub fn new(id: BuildId, placements: Vec<Placement>) -> Self {
        Self {
            id,
            placements,
            cursor: 0,
            last_milestone: 0,
            completed: false,
        }
    }

    pub fn id(&self) -> BuildId {
        self.id
    }

    pub fn total(&self) -> usize {
        self.placements.len()
    }

    /// Writes applied so far.
    pub fn placed(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Whole percent of writes applied; an empty task is 100 %.
    pub fn percent(&self) -> u8 {
        if self.placements.is_empty() {
            return 100;
        }
        (self.cursor * 100 / self.placements.len()) as u8
    }

    /// Apply up to `batch_size` writes, then report every milestone crossed
    /// and, once drained, completion. Each notification fires exactly once.
    ///
    /// Returns `true` when the task has nothing left to write.
    pub fn process_next_batch(
        &mut self,
        batch_size: usize,
        sink: &mut dyn PlacementSink,
        reporter: &mut dyn BuildReporter,
    ) -> bool {
        if self.completed {
            return true;
        }

        let end = (self.cursor + batch_size).min(self.placements.len());
        for placement in &self.placements[self.cursor..end] {
            sink.write(placement.pos, placement.block);
        }
        self.cursor = end;

        if !self.placements.is_empty() {
            let percent = self.percent();
            for milestone in MILESTONES {
                if milestone > self.last_milestone && percent >= milestone {
                    self.last_milestone = milestone;
                    reporter.report(BuildEvent::Progress {
                        id: self.id,
                        percent: milestone,
                    });
                }
            }
        }

        if self.cursor == self.placements.len() {
            self.completed = true;
            reporter.report(BuildEvent::Completed {
                id: self.id,
                placed: self.cursor,
            });
        }

        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use glam::IVec3;

    #[derive(Default)]
    struct Recorder(Vec<BuildEvent>);

    impl BuildReporter for Recorder {
        fn report(&mut self, event: BuildEvent) {
            self.0.push(event);
        }
    }

    fn task_of(len: usize) -> PlacementTask {
        let placements = (0..len)
            .map(|i| Placement {
                pos: IVec3::new(0, i as i32, 0),
                block: BlockKind::Air,
            })
            .collect();
        PlacementTask::new(BuildId(7), placements)
    }

    fn progress(percent: u8) -> BuildEvent {
        BuildEvent::Progress {
            id: BuildId(7),
            percent,
        }
    }

    #[test]
    fn test_hundred_writes_in_batches_of_fifteen() {
        let mut task = task_of(100);
        let mut sink: Vec<Placement> = Vec::new();
        let mut recorder = Recorder::default();

        let mut per_tick = Vec::new();
        let mut ticks = 0;
        loop {
            ticks += 1;
            let before = recorder.0.len();
            let done = task.process_next_batch(15, &mut sink, &mut recorder);
            per_tick.push(recorder.0[before..].to_vec());
            if done {
                break;
            }
        }

        assert_eq!(ticks, 7);
        assert_eq!(sink.len(), 100);
        assert!(per_tick[0].is_empty());
        assert_eq!(per_tick[1], vec![progress(25)]);
        assert!(per_tick[2].is_empty());
        assert_eq!(per_tick[3], vec![progress(50)]);
        assert_eq!(per_tick[4], vec![progress(75)]);
        assert!(per_tick[5].is_empty());
        assert_eq!(
            per_tick[6],
            vec![BuildEvent::Completed {
                id: BuildId(7),
                placed: 100
            }]
        );
    }

    #[test]
    fn test_writes_follow_list_order() {
        let mut task = task_of(10);
        let mut sink: Vec<Placement> = Vec::new();
        let mut recorder = Recorder::default();
        while !task.process_next_batch(3, &mut sink, &mut recorder) {}
        let ys: Vec<i32> = sink.iter().map(|p| p.pos.y).collect();
        assert_eq!(ys, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_batch_reports_milestones_then_completion() {
        let mut task = task_of(8);
        let mut recorder = Recorder::default();
        assert!(task.process_next_batch(100, &mut Vec::<Placement>::new(), &mut recorder));
        assert_eq!(recorder.0.len(), 4);
        assert_eq!(recorder.0[..3], [progress(25), progress(50), progress(75)]);
        assert!(recorder.0[3].is_terminal());
    }

    #[test]
    fn test_one_batch_crossing_several_milestones_reports_each() {
        let mut task = task_of(8);
        let mut recorder = Recorder::default();
        task.process_next_batch(7, &mut Vec::<Placement>::new(), &mut recorder);
        assert_eq!(recorder.0, vec![progress(25), progress(50), progress(75)]);
    }

    #[test]
    fn test_empty_task_completes_immediately() {
        let mut task = task_of(0);
        let mut recorder = Recorder::default();
        assert!(task.process_next_batch(15, &mut Vec::<Placement>::new(), &mut recorder));
        assert_eq!(task.percent(), 100);
        assert_eq!(
            recorder.0,
            vec![BuildEvent::Completed {
                id: BuildId(7),
                placed: 0
            }]
        );
        // Further calls are no-ops.
        assert!(task.process_next_batch(15, &mut Vec::<Placement>::new(), &mut recorder));
        assert_eq!(recorder.0.len(), 1);
    }
}
