pub mod app;
pub mod core;
pub mod debug;
pub mod store;
pub mod wheel;

// Curated re-exports
pub use app::wheel_plugin::{WheelPlugin, WheelRng, WheelStore};
pub use crate::core::config::WheelConfig;
pub use crate::core::segment::Segment;
pub use store::{JsonFileStore, MemoryStore, SegmentStore, StoreError};
pub use wheel::{choose_index, WheelError, WheelState};
