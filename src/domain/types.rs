//! Validated value types for lap records
//!
//! Names arriving from the feed are trimmed before validation so that a
//! whitespace-only field is treated the same as a missing one.

use nutype::nutype;
#[allow(unused_imports)] // These are used by nutype derive macros
use serde::{Deserialize, Serialize};

/// Display name of the driver who set a lap
///
/// Defaults to the placeholder shown for records without a usable name.
#[nutype(
    sanitize(trim),
    validate(not_empty),
    default = "Unknown driver",
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Default,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct DriverName(String);

/// Car name as published by the feed (half of a combo key)
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct CarName(String);

/// Track name as published by the feed (half of a combo key)
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct TrackName(String);

/// Elapsed lap time in seconds
///
/// Only finiteness is enforced; the feed is trusted for plausibility.
#[nutype(
    validate(finite),
    derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)
)]
pub struct LapSeconds(f64);

impl Eq for LapSeconds {} // Safe since validation ensures finite values

impl LapSeconds {
    /// Gap from `leader` to this time, in seconds
    pub fn gap_to(self, leader: LapSeconds) -> f64 {
        self.into_inner() - leader.into_inner()
    }
}
