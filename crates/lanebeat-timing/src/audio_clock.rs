use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Abstraction over free-running audio clocks.
/// Implementations: SystemAudioClock (production), ManualAudioClock (testing, simulation).
///
/// The clock is owned by the audio driver; it is only ever sampled, never written.
pub trait AudioClock {
    /// Current clock reading in seconds from an arbitrary epoch.
    fn now_s(&self) -> f64;
}

impl<C: AudioClock + ?Sized> AudioClock for &C {
    fn now_s(&self) -> f64 {
        (**self).now_s()
    }
}

impl<C: AudioClock + ?Sized> AudioClock for Box<C> {
    fn now_s(&self) -> f64 {
        (**self).now_s()
    }
}

/// Audio clock backed by std::time::Instant.
#[derive(Debug)]
pub struct SystemAudioClock {
    start: Instant,
}

impl SystemAudioClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemAudioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for SystemAudioClock {
    fn now_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Manually driven clock for deterministic tests and headless simulation.
///
/// Clones share the same underlying reading, so a test can keep a handle
/// and advance time while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualAudioClock {
    current_s: Rc<Cell<f64>>,
}

impl ManualAudioClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, s: f64) {
        self.current_s.set(s);
    }

    /// Advance the reading. Negative deltas are ignored so the clock stays monotonic.
    pub fn advance(&self, delta_s: f64) {
        if delta_s > 0.0 {
            self.current_s.set(self.current_s.get() + delta_s);
        }
    }
}

impl AudioClock for ManualAudioClock {
    fn now_s(&self) -> f64 {
        self.current_s.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advance() {
        let clock = ManualAudioClock::new();
        assert_eq!(clock.now_s(), 0.0);
        clock.advance(1.0);
        assert_eq!(clock.now_s(), 1.0);
        clock.advance(0.5);
        assert_eq!(clock.now_s(), 1.5);
    }

    #[test]
    fn manual_clock_ignores_negative_advance() {
        let clock = ManualAudioClock::new();
        clock.set_time(2.0);
        clock.advance(-1.0);
        assert_eq!(clock.now_s(), 2.0);
    }

    #[test]
    fn manual_clock_clones_share_reading() {
        let clock = ManualAudioClock::new();
        let handle = clock.clone();
        handle.advance(3.0);
        assert_eq!(clock.now_s(), 3.0);
    }

    #[test]
    fn system_clock_monotonic() {
        let clock = SystemAudioClock::new();
        let t1 = clock.now_s();
        let t2 = clock.now_s();
        assert!(t2 >= t1);
    }
}
