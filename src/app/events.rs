use std::fmt;

use bevy::prelude::*;

use crate::wheel::SpinOutcome;

/// Ask the wheel to spin. Dropped while a spin or its result is still pending.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SpinRequested;

/// The user dismissed the result dialog.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct WinnerAcknowledged;

/// Emitted once per spin, on the settle's final frame.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SpinCompleted(pub SpinOutcome);

/// Non-fatal messages meant for the user.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum WheelNotice {
    SpinIgnored,
    TooFewSegments { found: usize },
    Removed { label: String, remaining: usize },
    RemovalSkipped { remaining: usize },
    SaveFailed(String),
}

impl fmt::Display for WheelNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelNotice::SpinIgnored => f.write_str("the wheel is already spinning"),
            WheelNotice::TooFewSegments { found } => {
                write!(f, "at least 2 segments are required (have {found})")
            }
            WheelNotice::Removed { label, remaining } => {
                write!(f, "removed '{label}', {remaining} segments left")
            }
            WheelNotice::RemovalSkipped { remaining } => {
                write!(f, "kept the winner: only {remaining} segments left")
            }
            WheelNotice::SaveFailed(e) => write!(f, "could not save segments: {e}"),
        }
    }
}
