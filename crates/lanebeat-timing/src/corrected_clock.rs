use crate::audio_clock::AudioClock;

/// Pause-compensated view over a free-running audio clock.
///
/// Pause and resume are additive on a ledger (`paused_total`) rather than
/// corrections applied by each reader, so the scheduler, notes and judge all
/// observe the same song time. While paused, [`now`](Self::now) is frozen at
/// the value it had when the pause began.
#[derive(Debug)]
pub struct CorrectedClock<C: AudioClock> {
    source: C,
    paused_total: f64,
    pause_started_at: Option<f64>,
}

impl<C: AudioClock> CorrectedClock<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            paused_total: 0.0,
            pause_started_at: None,
        }
    }

    /// Corrected time in seconds. Side-effect free.
    pub fn now(&self) -> f64 {
        let raw = match self.pause_started_at {
            Some(started) => started,
            None => self.source.now_s(),
        };
        raw - self.paused_total
    }

    /// Uncorrected reading of the underlying clock.
    pub fn raw_now(&self) -> f64 {
        self.source.now_s()
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    /// Total raw time spent paused in this run, excluding an in-progress pause.
    pub fn paused_total(&self) -> f64 {
        self.paused_total
    }

    pub fn pause(&mut self) {
        if self.pause_started_at.is_some() {
            log::trace!("clock already paused");
            return;
        }
        let raw = self.source.now_s();
        self.pause_started_at = Some(raw);
        log::debug!("clock paused at raw={raw:.4}");
    }

    pub fn resume(&mut self) {
        if self.pause_started_at.is_none() {
            log::trace!("clock not paused, resume ignored");
            return;
        }
        self.close_pause();
    }

    /// Same accounting as [`resume`](Self::resume), but always leaves the clock
    /// unpaused. Used on hard exits where the pause flag must not be stranded.
    pub fn force_resume(&mut self) {
        self.close_pause();
    }

    /// Clear the ledger for a new run.
    pub fn reset(&mut self) {
        self.paused_total = 0.0;
        self.pause_started_at = None;
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut C {
        &mut self.source
    }

    fn close_pause(&mut self) {
        if let Some(started) = self.pause_started_at.take() {
            // A clock that went backwards must not shrink the ledger.
            let paused_for = (self.source.now_s() - started).max(0.0);
            self.paused_total += paused_for;
            log::debug!(
                "clock resumed after {paused_for:.4}s, paused_total={:.4}",
                self.paused_total
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_clock::ManualAudioClock;

    const EPS: f64 = 1e-9;

    fn clock() -> (ManualAudioClock, CorrectedClock<ManualAudioClock>) {
        let source = ManualAudioClock::new();
        let clock = CorrectedClock::new(source.clone());
        (source, clock)
    }

    #[test]
    fn follows_source_when_never_paused() {
        let (source, clock) = clock();
        source.set_time(4.25);
        assert!((clock.now() - 4.25).abs() < EPS);
    }

    #[test]
    fn pause_for_five_seconds_is_invisible() {
        let (source, mut clock) = clock();
        source.set_time(10.0);
        let before = clock.now();

        clock.pause();
        source.advance(5.0);
        assert!((clock.now() - before).abs() < EPS);
        clock.resume();

        assert!((clock.now() - before).abs() < EPS);
        assert!((clock.paused_total() - 5.0).abs() < EPS);
    }

    #[test]
    fn redundant_pause_keeps_first_start() {
        let (source, mut clock) = clock();
        source.set_time(1.0);
        clock.pause();
        source.advance(2.0);
        clock.pause();
        source.advance(2.0);
        clock.resume();
        assert!((clock.paused_total() - 4.0).abs() < EPS);
        assert!((clock.now() - 1.0).abs() < EPS);
    }

    #[test]
    fn resume_without_pause_is_noop() {
        let (source, mut clock) = clock();
        source.set_time(3.0);
        clock.resume();
        assert_eq!(clock.paused_total(), 0.0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn force_resume_clears_flag_and_accounts() {
        let (source, mut clock) = clock();
        source.set_time(2.0);
        clock.pause();
        source.advance(1.5);
        clock.force_resume();
        assert!(!clock.is_paused());
        assert!((clock.paused_total() - 1.5).abs() < EPS);

        // Redundant call does nothing further.
        source.advance(1.0);
        clock.force_resume();
        assert!((clock.paused_total() - 1.5).abs() < EPS);
        assert!((clock.now() - 3.0).abs() < EPS);
    }

    #[test]
    fn reset_clears_ledger() {
        let (source, mut clock) = clock();
        clock.pause();
        source.advance(3.0);
        clock.resume();
        clock.reset();
        assert_eq!(clock.paused_total(), 0.0);
        assert!((clock.now() - 3.0).abs() < EPS);
    }
}
