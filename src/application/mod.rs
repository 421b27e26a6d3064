//! Application services and orchestration
//!
//! The board state, the fetch pipeline feeding it, the scheduler driving the
//! pipeline and the `Application` tying them to the HTTP surface.

pub mod app;
pub mod board;
pub mod pipeline;
pub mod scheduler;

pub use app::Application;
pub use board::{ApplyOutcome, BoardReading, BoardSnapshot, BoardState, CycleId, DataSource};
pub use pipeline::{CycleReport, RefreshPipeline, RefreshTrigger};
pub use scheduler::{RefreshInterval, RefreshScheduler};
