//! One run of a chart: countdown, spawning, judgement and the terminal outcome.

use lanebeat_chart::{Chart, Lane};
use lanebeat_timing::CorrectedClock;

use crate::audio::AudioSource;
use crate::config::PlayConfig;
use crate::judge::{Judgement, LaneJudge, PressOutcome, TimingDirection, TimingStats};
use crate::layout::LaneLayout;
use crate::note::{NoteField, NoteId, NoteLimits};
use crate::run_state::{RunOutcome, RunSnapshot, RunState};
use crate::scheduler::SpawnScheduler;

/// Session phase. Pausing is tracked by the clock and can overlay
/// `Countdown` or `Playing`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayPhase {
    /// Input disabled; counts down in frame time before the music starts.
    Countdown { remaining: f64 },
    Playing,
    Finished(RunOutcome),
    /// Left without an outcome.
    Aborted,
}

/// Something that happened during an update or press, for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunEvent {
    Spawned {
        id: NoteId,
        lane: Lane,
    },
    Judged {
        lane: Lane,
        judgement: Judgement,
        error: f64,
        direction: TimingDirection,
    },
    OutOfWindow {
        lane: Lane,
        error: f64,
    },
    Phantom {
        lane: Lane,
    },
    Missed {
        lane: Lane,
    },
    Finished(RunOutcome),
}

/// Owns every per-run component and drives them once per frame.
pub struct PlaySession<A: AudioSource> {
    clock: CorrectedClock<A>,
    scheduler: SpawnScheduler,
    notes: NoteField,
    judge: LaneJudge,
    run: RunState,
    layout: LaneLayout,
    limits: NoteLimits,
    phase: PlayPhase,
    started: bool,
}

impl<A: AudioSource> PlaySession<A> {
    pub fn new(chart: Chart, config: &PlayConfig, layout: LaneLayout, audio: A) -> Self {
        let mut clock = CorrectedClock::new(audio);
        clock.reset();
        log::info!(
            "session: '{}' [{}] notes={} lanes_wired={}",
            chart.title,
            chart.difficulty,
            chart.len(),
            layout.wired_lanes()
        );
        Self {
            clock,
            scheduler: SpawnScheduler::new(chart, config.lead_time),
            notes: NoteField::new(),
            judge: LaneJudge::new(config.windows, config.scores, config.input_lock),
            run: RunState::new(config.max_health, config.miss_allowance),
            layout,
            limits: config.note_limits(),
            phase: PlayPhase::Countdown {
                remaining: config.countdown_duration(),
            },
            started: false,
        }
    }

    pub fn phase(&self) -> PlayPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.run.snapshot()
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.run.outcome()
    }

    pub fn timing(&self) -> &TimingStats {
        self.judge.timing()
    }

    pub fn notes(&self) -> &NoteField {
        &self.notes
    }

    pub fn judge(&self) -> &LaneJudge {
        &self.judge
    }

    pub fn chart(&self) -> &Chart {
        self.scheduler.chart()
    }

    pub fn audio(&self) -> &A {
        self.clock.source()
    }

    pub fn clock(&self) -> &CorrectedClock<A> {
        &self.clock
    }

    /// Seconds since the music started; zero before that.
    pub fn song_time(&self) -> f64 {
        if !self.started {
            return 0.0;
        }
        self.scheduler.song_time(self.clock.now())
    }

    /// Whole seconds left in the countdown, rounded up, for display.
    pub fn countdown_display(&self) -> Option<u32> {
        match self.phase {
            PlayPhase::Countdown { remaining } => Some(remaining.max(0.0).ceil() as u32),
            _ => None,
        }
    }

    /// Advance one frame. `frame_dt` only drives the countdown; gameplay
    /// reads the corrected clock.
    pub fn update(&mut self, frame_dt: f64) -> Vec<RunEvent> {
        let mut events = Vec::new();

        for (id, lane) in self.notes.sweep() {
            self.judge.unregister(lane, id);
        }

        if self.clock.is_paused() {
            return events;
        }

        match self.phase {
            PlayPhase::Countdown { remaining } => {
                let remaining = remaining - frame_dt.max(0.0);
                if remaining <= 0.0 {
                    self.begin_playing();
                } else {
                    self.phase = PlayPhase::Countdown { remaining };
                }
            }
            PlayPhase::Playing => self.advance(&mut events),
            PlayPhase::Finished(_) | PlayPhase::Aborted => {}
        }
        events
    }

    /// Feed a press on `lane` into the judge.
    pub fn press_lane(&mut self, lane: Lane) -> Vec<RunEvent> {
        let mut events = Vec::new();
        if self.phase != PlayPhase::Playing {
            return events;
        }

        let song_time = self.song_time();
        let outcome = self
            .judge
            .on_lane_pressed(lane, song_time, &mut self.notes, &mut self.run);
        match outcome {
            PressOutcome::Locked => return events,
            PressOutcome::Phantom => events.push(RunEvent::Phantom { lane }),
            PressOutcome::Judged {
                judgement,
                error,
                direction,
                ..
            } => events.push(RunEvent::Judged {
                lane,
                judgement,
                error,
                direction,
            }),
            PressOutcome::OutOfWindow { error, .. } => {
                events.push(RunEvent::OutOfWindow { lane, error })
            }
        }

        if self.run.is_failed() {
            self.finish(RunOutcome::Fail, &mut events);
        }
        events
    }

    pub fn pause(&mut self) {
        if self.clock.is_paused() || !self.is_live() {
            return;
        }
        self.clock.pause();
        self.clock.source_mut().pause();
        self.judge.set_paused(true);
        log::info!("session: paused at song_time={:.3}", self.song_time());
    }

    pub fn resume(&mut self) {
        if !self.clock.is_paused() {
            return;
        }
        self.clock.resume();
        self.clock.source_mut().resume();
        self.judge.set_paused(false);
        log::info!(
            "session: resumed, paused_total={:.3}",
            self.clock.paused_total()
        );
    }

    /// Unconditionally close any open pause and unfreeze input and audio.
    pub fn force_resume(&mut self) {
        self.clock.force_resume();
        self.clock.source_mut().resume();
        self.judge.set_paused(false);
    }

    /// Leave the run without an outcome.
    pub fn abort(&mut self) {
        self.force_resume();
        self.scheduler.stop();
        self.clock.source_mut().stop();
        self.judge.set_input_enabled(false);
        if self.is_live() {
            self.phase = PlayPhase::Aborted;
            log::info!("session: aborted");
        }
    }

    fn is_live(&self) -> bool {
        matches!(
            self.phase,
            PlayPhase::Countdown { .. } | PlayPhase::Playing
        )
    }

    fn begin_playing(&mut self) {
        self.scheduler.start(self.clock.now());
        self.clock.source_mut().play();
        self.judge.set_input_enabled(true);
        self.started = true;
        self.phase = PlayPhase::Playing;
        log::info!("session: countdown over, playing");
    }

    fn advance(&mut self, events: &mut Vec<RunEvent>) {
        let now = self.clock.now();
        let spawned = self
            .scheduler
            .tick(now, &self.layout, &mut self.notes, &mut self.judge);
        events.extend(
            spawned
                .into_iter()
                .map(|(id, lane)| RunEvent::Spawned { id, lane }),
        );

        let song_time = self.scheduler.song_time(now);
        for (id, lane) in self.notes.tick(song_time, &self.limits) {
            self.judge.on_note_missed(lane, id, &mut self.run);
            events.push(RunEvent::Missed { lane });
        }

        if self.run.is_failed() {
            self.finish(RunOutcome::Fail, events);
            return;
        }

        let audio_playing = self.clock.source().is_playing();
        if self.scheduler.is_finished(audio_playing) && self.notes.unresolved_count() == 0 {
            self.finish(RunOutcome::Success, events);
        }
    }

    fn finish(&mut self, outcome: RunOutcome, events: &mut Vec<RunEvent>) {
        let Some(outcome) = self.run.finish(outcome) else {
            return;
        };
        self.scheduler.stop();
        self.clock.source_mut().stop();
        self.judge.set_input_enabled(false);
        self.phase = PlayPhase::Finished(outcome);

        let snapshot = self.run.snapshot();
        log::info!(
            "session: finished {outcome:?} score={} misses={} max_combo={} grade={}",
            snapshot.score,
            snapshot.miss_count,
            snapshot.max_combo,
            snapshot.grade()
        );
        events.push(RunEvent::Finished(outcome));
    }
}
