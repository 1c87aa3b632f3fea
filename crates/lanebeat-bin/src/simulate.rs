use lanebeat_chart::Chart;
use lanebeat_play::{
    Autoplay, LaneLayout, PlayConfig, PlayPhase, PlaySession, RunOutcome, RunSnapshot,
    SimulatedAudio,
};
use lanebeat_timing::ManualAudioClock;
use serde::Serialize;

/// Extra simulated seconds before a stuck run is abandoned.
const FRAME_BUDGET_SLACK_S: f64 = 10.0;

pub struct SimulateOptions {
    pub fps: u32,
    pub offset: f64,
    /// Seconds of music after the last note.
    pub tail: f64,
    /// `(song_time, raw_seconds)` pause to inject once.
    pub pause: Option<(f64, f64)>,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub title: String,
    pub difficulty: String,
    pub notes: usize,
    /// `None` when the frame budget ran out first.
    pub outcome: Option<RunOutcome>,
    pub snapshot: RunSnapshot,
    pub accuracy: f64,
    pub grade: &'static str,
    pub early: u32,
    pub late: u32,
    pub frames: u64,
    pub paused_total: f64,
}

/// Run a chart against simulated audio, pressing every note with autoplay.
pub fn run_simulation(
    chart: Chart,
    config: &PlayConfig,
    layout: LaneLayout,
    options: &SimulateOptions,
) -> SimulationReport {
    let title = chart.title.clone();
    let difficulty = chart.difficulty.clone();
    let notes = chart.len();
    let length = chart.last_hit_time() + options.tail.max(0.0);

    let mut autoplay = Autoplay::new(&chart, options.offset);
    let clock = ManualAudioClock::new();
    let audio = SimulatedAudio::new(clock.clone(), length);
    let mut session = PlaySession::new(chart, config, layout, audio);

    let dt = 1.0 / f64::from(options.fps.max(1));
    let pause_s = options.pause.map_or(0.0, |(_, d)| d.max(0.0));
    let budget_s = config.countdown_duration() + length + pause_s + FRAME_BUDGET_SLACK_S;
    let max_frames = (budget_s / dt).ceil() as u64;
    let mut pending_pause = options.pause;
    let mut frames = 0;

    while frames < max_frames {
        frames += 1;
        clock.advance(dt);
        session.update(dt);

        if let Some((at, duration)) = pending_pause
            && session.phase() == PlayPhase::Playing
            && session.song_time() >= at
        {
            pending_pause = None;
            session.pause();
            clock.advance(duration);
            session.update(dt);
            session.resume();
        }

        for lane in autoplay.poll_up_to(session.song_time()) {
            session.press_lane(lane);
        }

        if !matches!(
            session.phase(),
            PlayPhase::Countdown { .. } | PlayPhase::Playing
        ) {
            break;
        }
    }

    if session.outcome().is_none() {
        log::warn!("simulation stopped after {frames} frames without an outcome");
        session.abort();
    }

    let snapshot = session.snapshot();
    SimulationReport {
        title,
        difficulty,
        notes,
        outcome: session.outcome(),
        snapshot,
        accuracy: snapshot.accuracy(),
        grade: snapshot.grade(),
        early: session.timing().early_count,
        late: session.timing().late_count,
        frames,
        paused_total: session.clock().paused_total(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanebeat_chart::{LoadOptions, load_chart_file};
    use std::fs;
    use tempfile::tempdir;

    const CHART: &str = r#"{
        "songName": "Demo",
        "difficulty": "Normal",
        "notes": [
            { "time": 1.0, "trackIndex": 0 },
            { "time": 1.5, "trackIndex": 1 },
            { "time": 2.0, "trackIndex": 2 },
            { "time": 2.0, "trackIndex": 3 },
            { "time": 2.5, "trackIndex": 9 }
        ]
    }"#;

    fn options() -> SimulateOptions {
        SimulateOptions {
            fps: 60,
            offset: 0.0,
            tail: 1.0,
            pause: None,
        }
    }

    fn load() -> Chart {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.json");
        fs::write(&path, CHART).unwrap();
        load_chart_file(&path, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn autoplay_run_succeeds() {
        let report = run_simulation(
            load(),
            &PlayConfig::default(),
            LaneLayout::straight(4.0, 1.0),
            &options(),
        );
        assert_eq!(report.title, "Demo");
        assert_eq!(report.notes, 4);
        assert_eq!(report.outcome, Some(RunOutcome::Success));
        assert_eq!(report.snapshot.perfect_count, 4);
        assert_eq!(report.grade, "MAX");
    }

    #[test]
    fn pause_does_not_change_result() {
        let report = run_simulation(
            load(),
            &PlayConfig::default(),
            LaneLayout::straight(4.0, 1.0),
            &SimulateOptions {
                pause: Some((1.2, 5.0)),
                ..options()
            },
        );
        assert_eq!(report.outcome, Some(RunOutcome::Success));
        assert_eq!(report.snapshot.miss_count, 0);
        assert!((report.paused_total - 5.0).abs() < 1e-9);
    }

    #[test]
    fn late_offset_misses_everything() {
        let report = run_simulation(
            load(),
            &PlayConfig::default(),
            LaneLayout::straight(4.0, 1.0),
            &SimulateOptions {
                offset: 0.5,
                ..options()
            },
        );
        assert_eq!(report.snapshot.perfect_count, 0);
        assert_eq!(report.snapshot.good_count, 0);
        assert!(report.snapshot.miss_count >= 4);
    }
}
