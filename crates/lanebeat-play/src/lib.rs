//! Spawn scheduling, note lifecycle, lane judgement and run bookkeeping.

pub mod audio;
pub mod autoplay;
pub mod config;
pub mod judge;
pub mod layout;
pub mod note;
pub mod run_state;
pub mod scheduler;
pub mod session;

pub use audio::{AudioSource, SimulatedAudio};
pub use autoplay::Autoplay;
pub use config::PlayConfig;
pub use judge::{
    JudgeWindows, Judgement, LaneJudge, PressOutcome, TierScores, TimingDirection, TimingStats,
};
pub use layout::{LaneLayout, LanePoints};
pub use note::{NoteEntity, NoteField, NoteId, NoteLimits, NoteState, NoteTick};
pub use run_state::{RunOutcome, RunSnapshot, RunState};
pub use scheduler::SpawnScheduler;
pub use session::{PlayPhase, PlaySession, RunEvent};
