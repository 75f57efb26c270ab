//! Debug module: throttled wheel logging.
//! Built only when compiled with `--features debug` (on by default).

#[cfg(feature = "debug")]
mod logging;

#[cfg(feature = "debug")]
pub use logging::DebugLogState;

#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use crate::app::wheel_plugin::WheelFlowSet;
#[cfg(feature = "debug")]
use crate::core::config::WheelConfig;

#[cfg(feature = "debug")]
pub struct DebugPlugin;
#[cfg(feature = "debug")]
impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        use logging::wheel_debug_logging_system;

        let interval = app
            .world()
            .get_resource::<WheelConfig>()
            .map(|c| c.debug_log_interval)
            .unwrap_or(0.5);
        app.insert_resource(DebugLogState::new(interval)).add_systems(
            Update,
            wheel_debug_logging_system.after(WheelFlowSet::Resolve),
        );
    }
}

#[cfg(not(feature = "debug"))]
pub struct DebugPlugin;
#[cfg(not(feature = "debug"))]
impl bevy::prelude::Plugin for DebugPlugin {
    fn build(&self, _app: &mut bevy::prelude::App) {}
}
