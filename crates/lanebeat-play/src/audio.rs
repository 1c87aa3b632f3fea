use lanebeat_timing::{AudioClock, ManualAudioClock};

/// Abstraction over the music playback device.
/// Implementations: a real audio backend (outside this crate), SimulatedAudio (testing, headless runs).
///
/// The device's clock keeps running regardless of playback state.
pub trait AudioSource: AudioClock {
    /// Start playback from the beginning.
    fn play(&mut self);
    fn stop(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn is_playing(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Playback {
    Stopped,
    Playing { started_at: f64, offset: f64 },
    Paused { position: f64 },
}

/// A song of fixed length played against a manually driven clock.
#[derive(Debug, Clone)]
pub struct SimulatedAudio {
    clock: ManualAudioClock,
    length: f64,
    playback: Playback,
}

impl SimulatedAudio {
    pub fn new(clock: ManualAudioClock, length: f64) -> Self {
        Self {
            clock,
            length: length.max(0.0),
            playback: Playback::Stopped,
        }
    }

    pub fn clock(&self) -> &ManualAudioClock {
        &self.clock
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Playback position in seconds, capped at the song length.
    pub fn position(&self) -> f64 {
        let position = match self.playback {
            Playback::Stopped => 0.0,
            Playback::Playing { started_at, offset } => offset + (self.clock.now_s() - started_at),
            Playback::Paused { position } => position,
        };
        position.min(self.length)
    }
}

impl AudioClock for SimulatedAudio {
    fn now_s(&self) -> f64 {
        self.clock.now_s()
    }
}

impl AudioSource for SimulatedAudio {
    fn play(&mut self) {
        self.playback = Playback::Playing {
            started_at: self.clock.now_s(),
            offset: 0.0,
        };
        log::debug!("audio: play ({:.2}s)", self.length);
    }

    fn stop(&mut self) {
        self.playback = Playback::Stopped;
    }

    fn pause(&mut self) {
        if let Playback::Playing { .. } = self.playback {
            self.playback = Playback::Paused {
                position: self.position(),
            };
        }
    }

    fn resume(&mut self) {
        if let Playback::Paused { position } = self.playback {
            self.playback = Playback::Playing {
                started_at: self.clock.now_s(),
                offset: position,
            };
        }
    }

    fn is_playing(&self) -> bool {
        matches!(self.playback, Playback::Playing { .. }) && self.position() < self.length
    }
}
