use std::collections::VecDeque;

use lanebeat_chart::{LANE_COUNT, Lane};
use serde::{Deserialize, Serialize};

use crate::note::{NoteField, NoteId};
use crate::run_state::RunState;

/// Scoring tier of an accepted hit, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgement {
    Perfect,
    Good,
    Bad,
}

impl Judgement {
    /// Bad hits are folded into the good counter for display.
    pub fn counts_as_perfect(self) -> bool {
        self == Self::Perfect
    }
}

/// Early/late direction of a hit relative to its target time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimingDirection {
    Early,
    Exact,
    Late,
}

impl TimingDirection {
    const EXACT_THRESHOLD_S: f64 = 0.001;

    /// `time_to_judge` is `target - song_time`: positive means the press came early.
    pub fn from_time_to_judge(time_to_judge: f64) -> Self {
        if time_to_judge > Self::EXACT_THRESHOLD_S {
            TimingDirection::Early
        } else if time_to_judge < -Self::EXACT_THRESHOLD_S {
            TimingDirection::Late
        } else {
            TimingDirection::Exact
        }
    }
}

/// Cumulative early/late statistics during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimingStats {
    pub early_count: u32,
    pub late_count: u32,
}

impl TimingStats {
    pub fn record(&mut self, judgement: Judgement, direction: TimingDirection) {
        // Perfect hits are not split into early/late.
        if judgement == Judgement::Perfect {
            return;
        }
        match direction {
            TimingDirection::Early => self.early_count += 1,
            TimingDirection::Late => self.late_count += 1,
            TimingDirection::Exact => {}
        }
    }
}

/// Judge windows in seconds of absolute timing error, nested `perfect <= good <= bad`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeWindows {
    pub perfect: f64,
    pub good: f64,
    pub bad: f64,
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self {
            perfect: 0.08,
            good: 0.15,
            bad: 0.25,
        }
    }
}

impl JudgeWindows {
    /// Tier for a timing error. An error exactly on a boundary belongs to the
    /// tighter tier. `None` means the press is outside every window.
    pub fn judge(&self, error: f64) -> Option<Judgement> {
        let error = error.abs();
        if error <= self.perfect {
            Some(Judgement::Perfect)
        } else if error <= self.good {
            Some(Judgement::Good)
        } else if error <= self.bad {
            Some(Judgement::Bad)
        } else {
            None
        }
    }

    pub fn is_ordered(&self) -> bool {
        0.0 <= self.perfect && self.perfect <= self.good && self.good <= self.bad
    }
}

/// Fixed score awarded per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierScores {
    pub perfect: i64,
    pub good: i64,
    pub bad: i64,
}

impl Default for TierScores {
    fn default() -> Self {
        Self {
            perfect: 100,
            good: 60,
            bad: 30,
        }
    }
}

impl TierScores {
    pub fn score_for(&self, judgement: Judgement) -> i64 {
        match judgement {
            Judgement::Perfect => self.perfect,
            Judgement::Good => self.good,
            Judgement::Bad => self.bad,
        }
    }
}

/// What a lane press resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressOutcome {
    /// Rejected: paused, input disabled, or inside the debounce interval.
    Locked,
    /// Nothing queued in the lane; penalized as a miss.
    Phantom,
    /// The head note was hit inside a window.
    Judged {
        note: NoteId,
        judgement: Judgement,
        error: f64,
        direction: TimingDirection,
    },
    /// The head note was too far away; penalized, note left to time out.
    OutOfWindow { note: NoteId, error: f64 },
}

/// Per-lane FIFO of active notes and the press judgement algorithm.
#[derive(Debug)]
pub struct LaneJudge {
    queues: [VecDeque<NoteId>; LANE_COUNT],
    windows: JudgeWindows,
    scores: TierScores,
    input_lock: f64,
    last_press: [Option<f64>; LANE_COUNT],
    input_enabled: bool,
    paused: bool,
    timing: TimingStats,
}

impl LaneJudge {
    pub fn new(windows: JudgeWindows, scores: TierScores, input_lock: f64) -> Self {
        Self {
            queues: Default::default(),
            windows,
            scores,
            input_lock: input_lock.max(0.0),
            last_press: [None; LANE_COUNT],
            input_enabled: false,
            paused: false,
            timing: TimingStats::default(),
        }
    }

    pub fn windows(&self) -> &JudgeWindows {
        &self.windows
    }

    pub fn timing(&self) -> &TimingStats {
        &self.timing
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn accepts_input(&self) -> bool {
        self.input_enabled && !self.paused
    }

    /// Append a note to the tail of its lane. Registering twice is a no-op.
    pub fn register(&mut self, lane: Lane, note: NoteId) {
        let queue = &mut self.queues[lane.index()];
        if !queue.contains(&note) {
            queue.push_back(note);
        }
    }

    /// Remove a note from its lane. Absent notes are ignored.
    pub fn unregister(&mut self, lane: Lane, note: NoteId) {
        let queue = &mut self.queues[lane.index()];
        if let Some(pos) = queue.iter().position(|&id| id == note) {
            queue.remove(pos);
        }
    }

    /// The next judgeable note in a lane.
    pub fn head(&self, lane: Lane) -> Option<NoteId> {
        self.queues[lane.index()].front().copied()
    }

    pub fn queued(&self, lane: Lane) -> usize {
        self.queues[lane.index()].len()
    }

    pub fn queued_total(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// Judge a press on `lane` at `song_time` against the head of its queue.
    pub fn on_lane_pressed(
        &mut self,
        lane: Lane,
        song_time: f64,
        notes: &mut NoteField,
        run: &mut RunState,
    ) -> PressOutcome {
        if !self.accepts_input() {
            return PressOutcome::Locked;
        }
        if let Some(last) = self.last_press[lane.index()]
            && song_time - last < self.input_lock
        {
            log::trace!("lane {lane}: press debounced");
            return PressOutcome::Locked;
        }
        self.last_press[lane.index()] = Some(song_time);

        let Some(id) = self.head(lane) else {
            log::debug!("lane {lane}: phantom press");
            run.record_miss();
            return PressOutcome::Phantom;
        };

        let Some(time_to_judge) = notes.get(id).map(|n| n.time_to_judge(song_time)) else {
            // Queue entry without a live note: drop it and treat the lane as empty.
            log::warn!("lane {lane}: queued note {id:?} no longer exists");
            self.unregister(lane, id);
            run.record_miss();
            return PressOutcome::Phantom;
        };
        let error = time_to_judge.abs();

        match self.windows.judge(error) {
            Some(judgement) => {
                let direction = TimingDirection::from_time_to_judge(time_to_judge);
                run.record_hit(judgement, self.scores.score_for(judgement));
                self.timing.record(judgement, direction);
                notes.hit(id, song_time);
                self.unregister(lane, id);
                log::debug!("lane {lane}: {judgement:?} error={error:.4}");
                PressOutcome::Judged {
                    note: id,
                    judgement,
                    error,
                    direction,
                }
            }
            None => {
                log::debug!("lane {lane}: out of window error={error:.4}");
                run.record_miss();
                PressOutcome::OutOfWindow { note: id, error }
            }
        }
    }

    /// A note timed out without being pressed: unregister it and apply one miss.
    pub fn on_note_missed(&mut self, lane: Lane, note: NoteId, run: &mut RunState) {
        self.unregister(lane, note);
        run.record_miss();
    }

    /// Drop every queued note and reset debounce state.
    pub fn clear(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
        self.last_press = [None; LANE_COUNT];
    }
}
