use glam::Vec3;
use lanebeat_chart::{LANE_COUNT, Lane};
use serde::{Deserialize, Serialize};

/// Where notes in one lane spawn and where they should be hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanePoints {
    pub spawn: Vec3,
    pub judge: Vec3,
}

impl LanePoints {
    pub fn new(spawn: Vec3, judge: Vec3) -> Self {
        Self { spawn, judge }
    }
}

/// Per-lane spawn/judge wiring. A lane without points cannot spawn notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneLayout {
    lanes: [Option<LanePoints>; LANE_COUNT],
}

impl LaneLayout {
    /// Parallel lanes `spacing` apart, spawning `distance` in front of a judge
    /// line at the origin and travelling towards -Z.
    pub fn straight(distance: f32, spacing: f32) -> Self {
        let mut layout = Self::default();
        let center = (LANE_COUNT as f32 - 1.0) / 2.0;
        for lane in Lane::all() {
            let x = (lane.index() as f32 - center) * spacing;
            layout.set(
                lane,
                LanePoints::new(Vec3::new(x, 0.0, distance), Vec3::new(x, 0.0, 0.0)),
            );
        }
        layout
    }

    pub fn get(&self, lane: Lane) -> Option<&LanePoints> {
        self.lanes[lane.index()].as_ref()
    }

    pub fn set(&mut self, lane: Lane, points: LanePoints) {
        self.lanes[lane.index()] = Some(points);
    }

    pub fn clear(&mut self, lane: Lane) {
        self.lanes[lane.index()] = None;
    }

    pub fn wired_lanes(&self) -> usize {
        self.lanes.iter().filter(|l| l.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_layout_wires_every_lane() {
        let layout = LaneLayout::straight(4.0, 1.0);
        assert_eq!(layout.wired_lanes(), LANE_COUNT);
        let first = layout.get(Lane::new(0).unwrap()).unwrap();
        let last = layout.get(Lane::new(LANE_COUNT - 1).unwrap()).unwrap();
        assert_eq!(first.spawn.z, 4.0);
        assert_eq!(first.judge.z, 0.0);
        assert!((first.spawn.x + last.spawn.x).abs() < 1e-6);
    }

    #[test]
    fn clear_unwires_lane() {
        let mut layout = LaneLayout::straight(4.0, 1.0);
        let lane = Lane::new(2).unwrap();
        layout.clear(lane);
        assert!(layout.get(lane).is_none());
        assert_eq!(layout.wired_lanes(), LANE_COUNT - 1);
    }
}
