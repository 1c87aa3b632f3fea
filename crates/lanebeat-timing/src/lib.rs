//! Audio clock sampling and pause-compensated song time.
//!
//! The hardware audio clock keeps running while gameplay is paused, so every
//! consumer reads time through a single [`CorrectedClock`] that subtracts the
//! accumulated pause time.

pub mod audio_clock;
pub mod corrected_clock;

pub use audio_clock::{AudioClock, ManualAudioClock, SystemAudioClock};
pub use corrected_clock::CorrectedClock;
