use std::fs;

use lanebeat_chart::{ChartError, LoadOptions, load_chart_file, parse_chart};
use proptest::prelude::*;
use tempfile::tempdir;

#[test]
fn test_load_chart_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tutorial.json");
    fs::write(
        &path,
        r#"{"songName":"tutorial","difficulty":"Easy","notes":[
            {"time":4.0,"trackIndex":2},
            {"time":2.0,"trackIndex":0}
        ]}"#,
    )
    .unwrap();

    let chart = load_chart_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(chart.len(), 2);
    assert_eq!(chart.notes()[0].hit_time, 2.0);
    assert_eq!(chart.notes()[0].lane.index(), 0);
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let result = load_chart_file(dir.path().join("nope.json"), &LoadOptions::default());
    assert!(matches!(result, Err(ChartError::FileRead { .. })));
}

#[test]
fn test_shared_hit_time_across_lanes() {
    let json = r#"{"notes":[
        {"time":1.0,"trackIndex":2},
        {"time":1.0,"trackIndex":0},
        {"time":1.0,"trackIndex":1}
    ]}"#;
    let chart = parse_chart(json).unwrap();
    let lanes: Vec<usize> = chart.notes().iter().map(|n| n.lane.index()).collect();
    assert_eq!(lanes, vec![2, 0, 1]);
}

proptest! {
    #[test]
    fn loaded_chart_is_sorted_and_in_range(
        entries in prop::collection::vec((0.0f64..300.0, -2i64..8), 0..64)
    ) {
        let notes: Vec<String> = entries
            .iter()
            .map(|(t, lane)| format!(r#"{{"time":{t},"trackIndex":{lane}}}"#))
            .collect();
        let json = format!(r#"{{"notes":[{}]}}"#, notes.join(","));
        let chart = parse_chart(&json).unwrap();

        let expected = entries.iter().filter(|(_, lane)| (0..4).contains(lane)).count();
        prop_assert_eq!(chart.len(), expected);
        for pair in chart.notes().windows(2) {
            prop_assert!(pair[0].hit_time <= pair[1].hit_time);
        }
    }
}
