use serde::{Deserialize, Serialize};

use crate::judge::Judgement;

/// Terminal result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Success,
    Fail,
}

/// Score, health and counters for a single run, with a first-wins terminal latch.
#[derive(Debug, Clone)]
pub struct RunState {
    score: u64,
    health: u32,
    max_health: u32,
    miss_count: u32,
    perfect_count: u32,
    good_count: u32,
    combo: u32,
    max_combo: u32,
    miss_allowance: u32,
    outcome: Option<RunOutcome>,
}

impl RunState {
    pub fn new(max_health: u32, miss_allowance: u32) -> Self {
        Self {
            score: 0,
            health: max_health,
            max_health,
            miss_count: 0,
            perfect_count: 0,
            good_count: 0,
            combo: 0,
            max_combo: 0,
            miss_allowance,
            outcome: None,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Add a signed delta; the total never drops below zero.
    pub fn add_score(&mut self, delta: i64) {
        self.score = self.score.saturating_add_signed(delta);
    }

    /// Remove health. The sign of `amount` is ignored.
    pub fn damage(&mut self, amount: i64) {
        let amount = u32::try_from(amount.unsigned_abs()).unwrap_or(u32::MAX);
        self.health = self.health.saturating_sub(amount).min(self.max_health);
    }

    pub fn record_miss(&mut self) {
        self.miss_count += 1;
        self.combo = 0;
        self.damage(1);
    }

    pub fn record_hit(&mut self, judgement: Judgement, score: i64) {
        if judgement.counts_as_perfect() {
            self.perfect_count += 1;
        } else {
            self.good_count += 1;
        }
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.add_score(score);
    }

    pub fn is_failed(&self) -> bool {
        self.health == 0 || self.miss_count > self.miss_allowance
    }

    /// Latch the terminal outcome. Only the first call returns `Some`.
    pub fn finish(&mut self, outcome: RunOutcome) -> Option<RunOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        self.outcome = Some(outcome);
        Some(outcome)
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            score: self.score,
            health: self.health,
            max_health: self.max_health,
            miss_count: self.miss_count,
            perfect_count: self.perfect_count,
            good_count: self.good_count,
            combo: self.combo,
            max_combo: self.max_combo,
        }
    }
}

/// Read-only view of a run for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub score: u64,
    pub health: u32,
    pub max_health: u32,
    pub miss_count: u32,
    pub perfect_count: u32,
    pub good_count: u32,
    pub combo: u32,
    pub max_combo: u32,
}

impl RunSnapshot {
    /// Percentage of the best possible weighting: perfect counts 2, good 1, miss 0.
    pub fn accuracy(&self) -> f64 {
        let judged = self.perfect_count + self.good_count + self.miss_count;
        if judged == 0 {
            return 0.0;
        }
        let weighted = self.perfect_count * 2 + self.good_count;
        weighted as f64 / (judged * 2) as f64 * 100.0
    }

    pub fn grade(&self) -> &'static str {
        let acc = self.accuracy();
        if acc >= 100.0 {
            "MAX"
        } else if acc >= 94.44 {
            "AAA"
        } else if acc >= 88.88 {
            "AA"
        } else if acc >= 77.77 {
            "A"
        } else if acc >= 66.66 {
            "B"
        } else if acc >= 55.55 {
            "C"
        } else if acc >= 44.44 {
            "D"
        } else if acc >= 33.33 {
            "E"
        } else {
            "F"
        }
    }
}
