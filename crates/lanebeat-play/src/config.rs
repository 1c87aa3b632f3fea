use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::judge::{JudgeWindows, TierScores};
use crate::note::NoteLimits;

/// Gameplay tuning for a run. All times are in seconds, distances in layout units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayConfig {
    /// Travel time from spawn point to judge point; notes spawn this long before their hit time.
    pub lead_time: f64,
    /// Distance past the judge point after which an untimed note counts as missed.
    pub post_judge_distance: f32,
    /// Grace after the hit time before a timed note counts as missed.
    pub miss_grace: f64,
    /// Extra distance past `post_judge_distance` before any note is destroyed.
    pub cleanup_margin: f32,
    /// Song time a resolved note lingers before it is destroyed.
    pub cleanup_delay: f64,
    pub windows: JudgeWindows,
    pub scores: TierScores,
    /// Debounce interval between accepted presses on one lane.
    pub input_lock: f64,
    pub max_health: u32,
    /// Misses tolerated; the next one fails the run.
    pub miss_allowance: u32,
    pub countdown_seconds: u32,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            lead_time: 2.0,
            post_judge_distance: 0.6,
            miss_grace: 0.25,
            cleanup_margin: 0.5,
            cleanup_delay: 0.0,
            windows: JudgeWindows::default(),
            scores: TierScores::default(),
            input_lock: 0.08,
            max_health: 10,
            miss_allowance: 10,
            countdown_seconds: 3,
        }
    }
}

impl PlayConfig {
    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.windows.is_ordered() {
            bail!(
                "judge windows must satisfy 0 <= perfect <= good <= bad, got {:?}",
                self.windows
            );
        }
        if self.max_health == 0 {
            bail!("max_health must be at least 1");
        }
        if self.miss_grace < 0.0 || self.input_lock < 0.0 || self.cleanup_delay < 0.0 {
            bail!("miss_grace, input_lock and cleanup_delay must not be negative");
        }
        Ok(())
    }

    /// Countdown length, never shorter than one second.
    pub fn countdown_duration(&self) -> f64 {
        self.countdown_seconds.max(1) as f64
    }

    pub fn note_limits(&self) -> NoteLimits {
        NoteLimits {
            miss_grace: self.miss_grace,
            post_judge_distance: self.post_judge_distance,
            cleanup_margin: self.cleanup_margin,
            cleanup_delay: self.cleanup_delay,
        }
    }
}
