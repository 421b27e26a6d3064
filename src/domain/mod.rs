//! Domain types and the lap data pipeline
//!
//! Everything in this module is pure: normalization, windowing, grouping,
//! ranking and selection are plain functions over values, so each fetch cycle
//! can rebuild its state from scratch.

pub mod combo;
pub mod errors;
pub mod fallback;
pub mod lap;
pub mod normalizer;
pub mod ranking;
pub mod selection;
pub mod test_data;
pub mod types;
pub mod week_window;

pub use combo::{aggregate, Combo, ComboKey};
pub use errors::{FeedError, PipelineError};
pub use fallback::FallbackLapData;
pub use lap::Lap;
pub use normalizer::{normalize_records, RecordRejection};
pub use ranking::{format_lap_time, rank, rank_laps, Gap, RankedRow, LEADER_LABEL};
pub use selection::{Selection, SelectionError};
pub use types::{CarName, DriverName, LapSeconds, TrackName};
pub use week_window::WeekWindow;
