use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Selectable levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Level {
    #[default]
    Tutorial,
    Medium,
    Hard,
}

/// Asset locations for one level, relative to the asset root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelAssets {
    pub chart_path: &'static str,
    pub music_path: &'static str,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Tutorial, Level::Medium, Level::Hard];

    pub fn assets(self) -> LevelAssets {
        match self {
            Level::Tutorial => LevelAssets {
                chart_path: "charts/tutorial.json",
                music_path: "music/tutorial.ogg",
            },
            Level::Medium => LevelAssets {
                chart_path: "charts/medium.json",
                music_path: "music/medium.ogg",
            },
            Level::Hard => LevelAssets {
                chart_path: "charts/hard.json",
                music_path: "music/hard.ogg",
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Tutorial => "tutorial",
            Level::Medium => "medium",
            Level::Hard => "hard",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown level: {s}"))
    }
}
