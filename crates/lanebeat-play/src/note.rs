use std::collections::BTreeMap;

use glam::Vec3;
use lanebeat_chart::Lane;

use crate::layout::LanePoints;

/// Target times at or below this are treated as "not set".
pub const TARGET_EPSILON: f64 = 1e-4;

/// Lower bound on travel duration so speed never divides by zero.
pub const MIN_TRAVEL_DURATION: f64 = 1e-4;

/// Squared length below which spawn and judge points are considered coincident.
const DEGENERATE_LENGTH_SQ: f32 = 1e-6;

/// Speed used when spawn and judge points coincide or there is no travel time.
const FALLBACK_SPEED: f32 = 1.0;

/// Identity of a spawned note. Ids increase in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Traveling,
    Hit,
    Missed,
}

impl NoteState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Traveling)
    }
}

/// Miss and cleanup thresholds applied on every note tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteLimits {
    pub miss_grace: f64,
    pub post_judge_distance: f32,
    pub cleanup_margin: f32,
    pub cleanup_delay: f64,
}

/// What a single tick did to a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteTick {
    /// The note transitioned to `Missed` during this tick.
    pub missed: bool,
    /// The note was marked for removal during this tick.
    pub destroyed: bool,
}

/// One spawned note travelling from its spawn point to its judge point.
#[derive(Debug, Clone)]
pub struct NoteEntity {
    id: NoteId,
    lane: Lane,
    target_hit_time: f64,
    spawn_song_time: f64,
    travel_duration: f64,
    spawn_pos: Vec3,
    judge_pos: Vec3,
    direction: Vec3,
    speed: f32,
    state: NoteState,
    resolved_at: Option<f64>,
    destroyed: bool,
}

impl NoteEntity {
    pub fn new(
        id: NoteId,
        lane: Lane,
        points: &LanePoints,
        target_hit_time: f64,
        spawn_song_time: f64,
        travel_duration: f64,
    ) -> Self {
        let travel_duration = travel_duration.max(MIN_TRAVEL_DURATION);

        // Travel stays on the ground plane.
        let mut to_judge = points.judge - points.spawn;
        to_judge.y = 0.0;
        let direction = if to_judge.length_squared() < DEGENERATE_LENGTH_SQ {
            Vec3::Z
        } else {
            to_judge.normalize()
        };

        let distance = points.spawn.distance(points.judge);
        let speed = if distance * distance < DEGENERATE_LENGTH_SQ
            || travel_duration <= MIN_TRAVEL_DURATION
        {
            FALLBACK_SPEED
        } else {
            (distance as f64 / travel_duration) as f32
        };

        Self {
            id,
            lane,
            target_hit_time,
            spawn_song_time,
            travel_duration,
            spawn_pos: points.spawn,
            judge_pos: points.judge,
            direction,
            speed,
            state: NoteState::Traveling,
            resolved_at: None,
            destroyed: false,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    pub fn target_hit_time(&self) -> f64 {
        self.target_hit_time
    }

    /// Song time at which the note was created at its spawn point.
    pub fn spawn_song_time(&self) -> f64 {
        self.spawn_song_time
    }

    pub fn travel_duration(&self) -> f64 {
        self.travel_duration
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn has_target(&self) -> bool {
        self.target_hit_time > TARGET_EPSILON
    }

    /// Position at `song_time`. Song time does not advance while paused, so neither does the note.
    pub fn position(&self, song_time: f64) -> Vec3 {
        let elapsed = (song_time - self.spawn_song_time).max(0.0) as f32;
        self.spawn_pos + self.direction * (self.speed * elapsed)
    }

    /// Signed distance travelled past the judge point along the travel direction.
    pub fn passed(&self, song_time: f64) -> f32 {
        (self.position(song_time) - self.judge_pos).dot(self.direction)
    }

    /// `target - song_time`; zero for notes without a target time.
    pub fn time_to_judge(&self, song_time: f64) -> f64 {
        if !self.has_target() {
            return 0.0;
        }
        self.target_hit_time - song_time
    }

    /// Returns true only for the call that performed the transition.
    pub fn hit(&mut self, song_time: f64) -> bool {
        self.resolve(NoteState::Hit, song_time)
    }

    /// Returns true only for the call that performed the transition.
    pub fn miss(&mut self, song_time: f64) -> bool {
        self.resolve(NoteState::Missed, song_time)
    }

    fn resolve(&mut self, to: NoteState, song_time: f64) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = to;
        self.resolved_at = Some(song_time);
        true
    }

    /// Apply the miss policies, then destroy resolved notes once they have
    /// lingered `cleanup_delay` or travelled past the cleanup distance.
    ///
    /// A timed note only ever misses by time, however far it has travelled.
    pub fn tick(&mut self, song_time: f64, limits: &NoteLimits) -> NoteTick {
        let mut result = NoteTick::default();
        if self.destroyed {
            return result;
        }

        let passed = self.passed(song_time);

        if self.state == NoteState::Traveling {
            let late = if self.has_target() {
                song_time > self.target_hit_time + limits.miss_grace
            } else {
                passed > limits.post_judge_distance
            };
            if late {
                result.missed = self.miss(song_time);
            }
        }

        if let Some(at) = self.resolved_at {
            let out_of_field = passed > limits.post_judge_distance + limits.cleanup_margin;
            if out_of_field || song_time - at >= limits.cleanup_delay {
                self.destroyed = true;
            }
        }

        result.destroyed = self.destroyed;
        result
    }
}

/// Owner of every live note in a run, iterated in spawn order.
#[derive(Debug, Default)]
pub struct NoteField {
    notes: BTreeMap<NoteId, NoteEntity>,
    next_id: u64,
}

impl NoteField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a note that should be hit at `target_hit_time`.
    pub fn spawn(
        &mut self,
        lane: Lane,
        points: &LanePoints,
        target_hit_time: f64,
        spawn_song_time: f64,
        travel_duration: f64,
    ) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        let note = NoteEntity::new(
            id,
            lane,
            points,
            target_hit_time,
            spawn_song_time,
            travel_duration,
        );
        self.notes.insert(id, note);
        id
    }

    /// Spawn a note with no target time; it misses by distance instead of time.
    pub fn spawn_untimed(
        &mut self,
        lane: Lane,
        points: &LanePoints,
        spawn_song_time: f64,
        travel_duration: f64,
    ) -> NoteId {
        self.spawn(lane, points, 0.0, spawn_song_time, travel_duration)
    }

    pub fn get(&self, id: NoteId) -> Option<&NoteEntity> {
        self.notes.get(&id)
    }

    pub fn hit(&mut self, id: NoteId, song_time: f64) -> bool {
        self.notes
            .get_mut(&id)
            .is_some_and(|note| note.hit(song_time))
    }

    pub fn miss(&mut self, id: NoteId, song_time: f64) -> bool {
        self.notes
            .get_mut(&id)
            .is_some_and(|note| note.miss(song_time))
    }

    /// Tick every note. Returns the notes that missed during this tick.
    pub fn tick(&mut self, song_time: f64, limits: &NoteLimits) -> Vec<(NoteId, Lane)> {
        let mut missed = Vec::new();
        for note in self.notes.values_mut() {
            if note.tick(song_time, limits).missed {
                missed.push((note.id, note.lane));
            }
        }
        missed
    }

    /// Remove destroyed notes. Returns what was removed.
    pub fn sweep(&mut self) -> Vec<(NoteId, Lane)> {
        let mut removed = Vec::new();
        self.notes.retain(|&id, note| {
            if note.destroyed {
                removed.push((id, note.lane));
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn unresolved_count(&self) -> usize {
        self.notes
            .values()
            .filter(|n| n.state == NoteState::Traveling)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEntity> {
        self.notes.values()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}
