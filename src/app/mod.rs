pub mod events;
pub mod history;
pub mod wheel_plugin;

pub use events::{SpinCompleted, SpinRequested, WheelNotice, WinnerAcknowledged};
pub use history::{HistoryEntry, HistoryKind, WheelHistory};
pub use wheel_plugin::{WheelFlowSet, WheelPlugin, WheelRng, WheelStore};
