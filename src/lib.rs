//! Lap Board - a weekly sim-racing leaderboard service
//!
//! Periodically pulls lap submissions from a feed proxy, keeps the laps of the
//! current Sunday-to-Sunday week, groups them by car and track and ranks each
//! group by fastest lap.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;

pub use application::Application;
pub use error::{Error, Result};
