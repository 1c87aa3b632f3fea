use lanebeat_chart::{Chart, Lane};

use crate::judge::LaneJudge;
use crate::layout::LaneLayout;
use crate::note::{MIN_TRAVEL_DURATION, NoteField, NoteId};

/// Walks a chart in time order and spawns each note `lead_time` before its hit time.
///
/// All times passed in are corrected clock readings; the scheduler derives
/// song time from the reading captured by [`SpawnScheduler::start`].
#[derive(Debug)]
pub struct SpawnScheduler {
    chart: Chart,
    cursor: usize,
    lead_time: f64,
    run_start: f64,
    running: bool,
}

impl SpawnScheduler {
    pub fn new(chart: Chart, lead_time: f64) -> Self {
        Self {
            chart,
            cursor: 0,
            lead_time,
            run_start: 0.0,
            running: false,
        }
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn start(&mut self, clock_now: f64) {
        self.cursor = 0;
        self.run_start = clock_now;
        self.running = true;
        log::info!(
            "scheduler: start notes={} lead_time={:.3}",
            self.chart.len(),
            self.lead_time
        );
    }

    pub fn song_time(&self, clock_now: f64) -> f64 {
        clock_now - self.run_start
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Notes not yet spawned.
    pub fn remaining(&self) -> usize {
        self.chart.len() - self.cursor
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.run_start = 0.0;
        self.running = false;
    }

    /// Travel time handed to spawned notes; never below [`MIN_TRAVEL_DURATION`].
    pub fn travel_duration(&self) -> f64 {
        self.lead_time.max(MIN_TRAVEL_DURATION)
    }

    /// Spawn every note that is due at `clock_now` and register it with the judge.
    pub fn tick(
        &mut self,
        clock_now: f64,
        layout: &LaneLayout,
        notes: &mut NoteField,
        judge: &mut LaneJudge,
    ) -> Vec<(NoteId, Lane)> {
        let mut spawned = Vec::new();
        if !self.running {
            return spawned;
        }

        let song_time = self.song_time(clock_now);
        let lead = self.lead_time.max(0.0);
        let travel = self.travel_duration();

        while let Some(spec) = self.chart.notes().get(self.cursor) {
            if song_time < spec.hit_time - lead {
                break;
            }
            self.cursor += 1;

            let Some(points) = layout.get(spec.lane) else {
                log::warn!("scheduler: lane {} has no spawn/judge points", spec.lane);
                continue;
            };
            let id = notes.spawn(spec.lane, points, spec.hit_time, song_time, travel);
            judge.register(spec.lane, id);
            log::trace!(
                "scheduler: spawned {id:?} lane={} hit={:.3} at song_time={song_time:.3}",
                spec.lane,
                spec.hit_time
            );
            spawned.push((id, spec.lane));
        }
        spawned
    }

    /// True once every note has been spawned and the music has stopped.
    /// Also ends spawning at that point.
    pub fn is_finished(&mut self, audio_playing: bool) -> bool {
        let finished = self.cursor >= self.chart.len() && !audio_playing;
        if finished && self.running {
            log::debug!("scheduler: chart exhausted");
            self.running = false;
        }
        finished
    }
}
