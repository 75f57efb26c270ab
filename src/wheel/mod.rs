//! The wheel itself: weighted draw, spin trajectory and the session state machine.

pub mod animator;
pub mod error;
pub mod geometry;
pub mod selector;
pub mod settle;
pub mod state;

pub use animator::{plan_spin, SpinPlan, SpinTrajectory};
pub use error::WheelError;
pub use geometry::{index_from_rotation, WheelGeometry};
pub use selector::{choose_index, probabilities, Draw};
pub use settle::SettlePlan;
pub use state::{RemovalOutcome, SpinOutcome, SpinPhase, SpinStart, WheelEvent, WheelState};
