use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of parallel input/judgement lanes.
pub const LANE_COUNT: usize = 4;

/// A lane index, guaranteed to be in `0..LANE_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Lane(u8);

impl Lane {
    /// Returns `None` when the index is outside the lane range.
    pub fn new(index: usize) -> Option<Self> {
        if index < LANE_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Lane index for array indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All lanes in index order.
    pub fn all() -> impl Iterator<Item = Lane> {
        (0..LANE_COUNT).map(|i| Lane(i as u8))
    }
}

impl TryFrom<usize> for Lane {
    type Error = String;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Lane::new(index).ok_or_else(|| format!("lane {index} out of range 0..{LANE_COUNT}"))
    }
}

impl From<Lane> for usize {
    fn from(lane: Lane) -> usize {
        lane.index()
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single chart entry: which lane, and the song time (seconds) of a perfect hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    pub lane: Lane,
    pub hit_time: f64,
}

impl NoteSpec {
    pub fn new(lane: Lane, hit_time: f64) -> Self {
        Self { lane, hit_time }
    }
}

/// An immutable, time-sorted chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub difficulty: String,
    notes: Vec<NoteSpec>,
}

impl Chart {
    /// Build a chart, stable-sorting notes by hit time so that entries sharing
    /// a hit time keep their source order.
    pub fn new(title: impl Into<String>, difficulty: impl Into<String>, mut notes: Vec<NoteSpec>) -> Self {
        notes.sort_by(|a, b| a.hit_time.total_cmp(&b.hit_time));
        Self {
            title: title.into(),
            difficulty: difficulty.into(),
            notes,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[NoteSpec] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Hit time of the last note, or 0 for an empty chart.
    pub fn last_hit_time(&self) -> f64 {
        self.notes.last().map_or(0.0, |n| n.hit_time)
    }

    pub fn lane_counts(&self) -> [usize; LANE_COUNT] {
        let mut counts = [0; LANE_COUNT];
        for note in &self.notes {
            counts[note.lane.index()] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(i: usize) -> Lane {
        Lane::new(i).unwrap()
    }

    #[test]
    fn lane_bounds() {
        assert!(Lane::new(0).is_some());
        assert!(Lane::new(LANE_COUNT - 1).is_some());
        assert!(Lane::new(LANE_COUNT).is_none());
        assert_eq!(Lane::all().count(), LANE_COUNT);
    }

    #[test]
    fn lane_serde_rejects_out_of_range() {
        assert_eq!(serde_json::from_str::<Lane>("2").unwrap(), lane(2));
        assert!(serde_json::from_str::<Lane>("9").is_err());
        assert_eq!(serde_json::to_string(&lane(3)).unwrap(), "3");
    }

    #[test]
    fn new_sorts_by_time() {
        let chart = Chart::new(
            "t",
            "d",
            vec![
                NoteSpec::new(lane(0), 3.0),
                NoteSpec::new(lane(1), 1.0),
                NoteSpec::new(lane(2), 2.0),
            ],
        );
        let times: Vec<f64> = chart.notes().iter().map(|n| n.hit_time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert_eq!(chart.last_hit_time(), 3.0);
    }

    #[test]
    fn ties_keep_source_order() {
        let chart = Chart::new(
            "t",
            "d",
            vec![
                NoteSpec::new(lane(3), 1.0),
                NoteSpec::new(lane(0), 0.5),
                NoteSpec::new(lane(1), 1.0),
                NoteSpec::new(lane(2), 1.0),
            ],
        );
        let lanes: Vec<usize> = chart.notes().iter().map(|n| n.lane.index()).collect();
        assert_eq!(lanes, vec![0, 3, 1, 2]);
    }

    #[test]
    fn lane_counts() {
        let chart = Chart::new(
            "t",
            "d",
            vec![
                NoteSpec::new(lane(0), 1.0),
                NoteSpec::new(lane(0), 2.0),
                NoteSpec::new(lane(3), 3.0),
            ],
        );
        assert_eq!(chart.lane_counts(), [2, 0, 0, 1]);
    }

    #[test]
    fn empty_chart() {
        let chart = Chart::empty();
        assert!(chart.is_empty());
        assert_eq!(chart.last_hit_time(), 0.0);
    }
}
