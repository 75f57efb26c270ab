pub mod config;

pub use config::{SettleConfig, SpinConfig, ValueRange, WheelConfig};
