#[cfg(feature = "debug")]
use bevy::prelude::*;

#[cfg(feature = "debug")]
use crate::wheel::WheelState;

#[cfg(feature = "debug")]
#[derive(Resource, Debug, Clone)]
pub struct DebugLogState {
    pub log_interval: f32,
    pub time_accum: f32,
    pub frame_counter: u64,
}

#[cfg(feature = "debug")]
impl DebugLogState {
    pub fn new(log_interval: f32) -> Self {
        Self {
            log_interval,
            time_accum: 0.0,
            frame_counter: 0,
        }
    }
}

#[cfg(feature = "debug")]
pub fn wheel_debug_logging_system(
    time: Res<Time>,
    mut state: ResMut<DebugLogState>,
    wheel: Option<Res<WheelState>>,
) {
    state.frame_counter += 1;
    state.time_accum += time.delta_secs();
    if state.time_accum < state.log_interval {
        return;
    }
    state.time_accum = 0.0;
    let Some(wheel) = wheel else { return };
    // quiet while idle; one line per interval while something is happening
    if wheel.is_idle() {
        return;
    }
    info!(target: "wheel",
        "WHEEL frame={} t={:.3}s phase={} rotation={:.4} under_pointer={:?} segments={}",
        state.frame_counter,
        time.elapsed_secs(),
        wheel.phase_name(),
        wheel.current_rotation(),
        wheel.index_under_pointer(),
        wheel.segments().len());
}
