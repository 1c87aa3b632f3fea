//! Autoplay: presses every lane exactly at its notes' hit times.

use lanebeat_chart::{Chart, Lane};

/// Pre-computed autoplay press.
#[derive(Debug, Clone, Copy)]
struct AutoplayPress {
    song_time: f64,
    lane: Lane,
}

/// Yields one press per chart note once song time reaches it.
#[derive(Debug, Clone)]
pub struct Autoplay {
    presses: Vec<AutoplayPress>,
    current_index: usize,
}

impl Autoplay {
    /// `offset` shifts every press; negative values press early.
    pub fn new(chart: &Chart, offset: f64) -> Self {
        // Chart notes are already sorted, and a constant offset keeps them sorted.
        let presses = chart
            .notes()
            .iter()
            .map(|n| AutoplayPress {
                song_time: n.hit_time + offset,
                lane: n.lane,
            })
            .collect();
        Self {
            presses,
            current_index: 0,
        }
    }

    /// Lanes whose press time is at or before `song_time`, in press order.
    pub fn poll_up_to(&mut self, song_time: f64) -> Vec<Lane> {
        let mut due = Vec::new();
        while let Some(press) = self.presses.get(self.current_index) {
            if press.song_time > song_time {
                break;
            }
            due.push(press.lane);
            self.current_index += 1;
        }
        due
    }

    pub fn is_done(&self) -> bool {
        self.current_index >= self.presses.len()
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanebeat_chart::NoteSpec;

    fn chart() -> Chart {
        let lane = |i| Lane::new(i).unwrap();
        Chart::new(
            "auto",
            "easy",
            vec![
                NoteSpec::new(lane(0), 1.0),
                NoteSpec::new(lane(3), 1.0),
                NoteSpec::new(lane(1), 2.0),
            ],
        )
    }

    #[test]
    fn polls_due_presses() {
        let mut auto = Autoplay::new(&chart(), 0.0);
        assert!(auto.poll_up_to(0.99).is_empty());
        let due = auto.poll_up_to(1.0);
        assert_eq!(due.iter().map(|l| l.index()).collect::<Vec<_>>(), vec![0, 3]);
        assert!(!auto.is_done());
        assert_eq!(auto.poll_up_to(5.0).len(), 1);
        assert!(auto.is_done());
        assert!(auto.poll_up_to(6.0).is_empty());
    }

    #[test]
    fn offset_shifts_presses() {
        let mut auto = Autoplay::new(&chart(), 0.05);
        assert!(auto.poll_up_to(1.04).is_empty());
        assert_eq!(auto.poll_up_to(1.06).len(), 2);

        auto.reset();
        assert_eq!(auto.poll_up_to(1.06).len(), 2);
    }
}
