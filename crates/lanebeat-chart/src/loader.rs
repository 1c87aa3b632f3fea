use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ChartError;
use crate::model::{Chart, Lane, NoteSpec};

/// On-disk chart record. Field names follow the chart authoring tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChart {
    song_name: Option<Value>,
    difficulty: Option<Value>,
    notes: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNote {
    time: f64,
    track_index: i64,
}

/// Options applied while loading a chart.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Notes earlier than this song time (seconds) are dropped, so nothing
    /// spawns right on top of the judge line at song start.
    pub skip_before: f64,
}

/// Parse a chart with default options.
pub fn parse_chart(json: &str) -> Result<Chart, ChartError> {
    parse_chart_with(json, &LoadOptions::default())
}

/// Parse a chart from JSON.
///
/// Fails only when the document itself is unusable. Individual entries that
/// are malformed or name a lane outside the lane range are skipped.
pub fn parse_chart_with(json: &str, options: &LoadOptions) -> Result<Chart, ChartError> {
    let raw: RawChart = serde_json::from_str(json)?;
    let entries = raw.notes.ok_or(ChartError::MissingNotes)?;

    let mut notes = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    let mut early = 0usize;

    for (i, entry) in entries.into_iter().enumerate() {
        let Some(note) = convert_note(i, entry) else {
            skipped += 1;
            continue;
        };
        if note.hit_time < options.skip_before {
            early += 1;
            continue;
        }
        notes.push(note);
    }

    if skipped > 0 {
        log::warn!("chart: skipped {skipped} invalid note entries");
    }
    if early > 0 {
        log::info!(
            "chart: dropped {early} notes before {:.2}s",
            options.skip_before
        );
    }

    let chart = Chart::new(
        label("songName", raw.song_name),
        label("difficulty", raw.difficulty),
        notes,
    );
    log::debug!(
        "chart loaded: title={:?} difficulty={:?} notes={}",
        chart.title,
        chart.difficulty,
        chart.len()
    );
    Ok(chart)
}

/// A text field of the chart header. Anything but a string is dropped.
fn label(field: &str, value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => {
            log::warn!("chart: {field} is not a string: {other}");
            String::new()
        }
    }
}

fn convert_note(index: usize, entry: Value) -> Option<NoteSpec> {
    let raw: RawNote = match serde_json::from_value(entry) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("chart: note #{index} malformed: {e}");
            return None;
        }
    };
    if !raw.time.is_finite() || raw.time < 0.0 {
        log::warn!("chart: note #{index} has invalid time {}", raw.time);
        return None;
    }
    let lane = usize::try_from(raw.track_index).ok().and_then(Lane::new);
    let Some(lane) = lane else {
        log::warn!("chart: note #{index} lane {} out of range", raw.track_index);
        return None;
    };
    // -0.0 would sort ahead of 0.0 and break source order for ties.
    let time = if raw.time == 0.0 { 0.0 } else { raw.time };
    Some(NoteSpec::new(lane, time))
}

/// Parse a chart, treating any document-level failure as an empty chart.
pub fn load_chart_or_empty(json: &str, options: &LoadOptions) -> Chart {
    match parse_chart_with(json, options) {
        Ok(chart) => chart,
        Err(e) => {
            log::error!("chart unusable, running with an empty chart: {e}");
            Chart::empty()
        }
    }
}

/// Read and parse a chart file.
pub fn load_chart_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Chart, ChartError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| ChartError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_chart_with(&json, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_sorts() {
        let json = r#"{
            "songName": "sun",
            "difficulty": "Hard",
            "notes": [
                {"time": 3.0, "trackIndex": 1},
                {"time": 1.5, "trackIndex": 0},
                {"time": 2.0, "trackIndex": 3}
            ]
        }"#;
        let chart = parse_chart(json).unwrap();
        assert_eq!(chart.title, "sun");
        assert_eq!(chart.difficulty, "Hard");
        let times: Vec<f64> = chart.notes().iter().map(|n| n.hit_time).collect();
        assert_eq!(times, vec![1.5, 2.0, 3.0]);
    }

    #[test]
    fn skips_out_of_range_lanes() {
        let json = r#"{"notes": [
            {"time": 1.0, "trackIndex": 4},
            {"time": 2.0, "trackIndex": -1},
            {"time": 3.0, "trackIndex": 2}
        ]}"#;
        let chart = parse_chart(json).unwrap();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart.notes()[0].lane.index(), 2);
    }

    #[test]
    fn skips_malformed_entries() {
        let json = r#"{"notes": [
            {"time": "soon", "trackIndex": 0},
            {"trackIndex": 1},
            {"time": 1.0},
            null,
            {"time": -0.5, "trackIndex": 0},
            {"time": 2.0, "trackIndex": 1}
        ]}"#;
        let chart = parse_chart(json).unwrap();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart.notes()[0].hit_time, 2.0);
    }

    #[test]
    fn missing_notes_is_error() {
        assert!(matches!(
            parse_chart(r#"{"songName": "x"}"#),
            Err(ChartError::MissingNotes)
        ));
        assert!(matches!(
            parse_chart(r#"{"notes": null}"#),
            Err(ChartError::MissingNotes)
        ));
    }

    #[test]
    fn unparseable_is_error() {
        assert!(matches!(parse_chart("not json"), Err(ChartError::Json(_))));
    }

    #[test]
    fn mistyped_labels_keep_notes() {
        let json = r#"{
            "songName": 7,
            "difficulty": ["hard"],
            "notes": [{"time": 1.0, "trackIndex": 0}]
        }"#;
        let chart = load_chart_or_empty(json, &LoadOptions::default());
        assert_eq!(chart.len(), 1);
        assert_eq!(chart.title, "");
        assert_eq!(chart.difficulty, "");
    }

    #[test]
    fn negative_zero_keeps_source_order() {
        let json = r#"{"notes": [
            {"time": 0.0, "trackIndex": 1},
            {"time": -0.0, "trackIndex": 2}
        ]}"#;
        let chart = parse_chart(json).unwrap();
        let lanes: Vec<usize> = chart.notes().iter().map(|n| n.lane.index()).collect();
        assert_eq!(lanes, vec![1, 2]);
        assert!(chart.notes()[1].hit_time.is_sign_positive());
    }

    #[test]
    fn or_empty_absorbs_errors() {
        let chart = load_chart_or_empty("{", &LoadOptions::default());
        assert!(chart.is_empty());
    }

    #[test]
    fn skip_before_drops_early_notes() {
        let json = r#"{"notes": [
            {"time": 0.5, "trackIndex": 0},
            {"time": 1.99, "trackIndex": 1},
            {"time": 2.0, "trackIndex": 2}
        ]}"#;
        let options = LoadOptions { skip_before: 2.0 };
        let chart = parse_chart_with(json, &options).unwrap();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart.notes()[0].hit_time, 2.0);
    }
}
