//! Chart model and tolerant JSON chart loading.

pub mod error;
pub mod level;
pub mod loader;
pub mod model;

pub use error::ChartError;
pub use level::{Level, LevelAssets};
pub use loader::{LoadOptions, load_chart_file, load_chart_or_empty, parse_chart, parse_chart_with};
pub use model::{Chart, LANE_COUNT, Lane, NoteSpec};
