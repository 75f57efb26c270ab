use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::app::events::{SpinCompleted, SpinRequested, WheelNotice, WinnerAcknowledged};
use crate::app::history::{HistoryKind, WheelHistory};
use crate::core::config::WheelConfig;
use crate::debug::DebugPlugin;
use crate::store::{load_segments, MemoryStore, SegmentStore};
use crate::wheel::{RemovalOutcome, SpinStart, WheelError, WheelEvent, WheelState};

/// Update stages, run in this order every frame.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum WheelFlowSet {
    /// Spin requests become trajectories.
    Input,
    /// Rotation follows the clock.
    Animate,
    /// Acknowledgement and auto-remove.
    Resolve,
}

/// Random source for draws and trajectories.
#[derive(Resource, Deref, DerefMut)]
pub struct WheelRng(pub StdRng);

impl WheelRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for WheelRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// Persistence backend shared by the wheel systems.
#[derive(Resource)]
pub struct WheelStore(pub Box<dyn SegmentStore + Send + Sync>);

impl WheelStore {
    pub fn new(store: impl SegmentStore + Send + Sync + 'static) -> Self {
        Self(Box::new(store))
    }
}

/// Wires the wheel into a Bevy app. Insert `WheelConfig`, `WheelRng`,
/// `WheelStore` or a ready `WheelState` before adding the plugin to override
/// the defaults (default config, entropy seed, in-memory store, state loaded
/// from the store at startup).
pub struct WheelPlugin {
    pub history_capacity: usize,
}

impl Default for WheelPlugin {
    fn default() -> Self {
        Self {
            history_capacity: 64,
        }
    }
}

impl Plugin for WheelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WheelConfig>().init_resource::<WheelRng>();
        if !app.world().contains_resource::<WheelStore>() {
            app.insert_resource(WheelStore::new(MemoryStore::new()));
        }
        app.insert_resource(WheelHistory::with_capacity(self.history_capacity))
            .add_event::<SpinRequested>()
            .add_event::<WinnerAcknowledged>()
            .add_event::<SpinCompleted>()
            .add_event::<WheelNotice>()
            .configure_sets(
                Update,
                (
                    WheelFlowSet::Input,
                    WheelFlowSet::Animate,
                    WheelFlowSet::Resolve,
                )
                    .chain(),
            )
            .add_systems(Startup, load_wheel_state)
            .add_systems(
                Update,
                (
                    handle_spin_requests.in_set(WheelFlowSet::Input),
                    advance_wheel.in_set(WheelFlowSet::Animate),
                    (handle_acknowledgements, run_auto_remove)
                        .chain()
                        .in_set(WheelFlowSet::Resolve),
                ),
            )
            .add_plugins(DebugPlugin);
    }
}

fn now_ms(time: &Time) -> f64 {
    time.elapsed_secs_f64() * 1000.0
}

fn load_wheel_state(
    mut commands: Commands,
    existing: Option<Res<WheelState>>,
    cfg: Res<WheelConfig>,
    mut store: ResMut<WheelStore>,
    mut rng: ResMut<WheelRng>,
) {
    if existing.is_some() {
        return;
    }
    let segments = load_segments(store.0.as_mut(), &mut rng.0);
    let auto_remove = match store.0.load_auto_remove() {
        Ok(stored) => stored.unwrap_or(cfg.auto_remove),
        Err(e) => {
            warn!(target: "wheel", "reading auto-remove preference failed: {e}");
            cfg.auto_remove
        }
    };
    info!(
        target: "wheel",
        "wheel ready with {} segments (auto-remove {})",
        segments.len(),
        if auto_remove { "on" } else { "off" }
    );
    commands.insert_resource(WheelState::new(segments, &cfg).with_auto_remove(auto_remove));
}

fn handle_spin_requests(
    mut requests: EventReader<SpinRequested>,
    mut wheel: ResMut<WheelState>,
    cfg: Res<WheelConfig>,
    mut rng: ResMut<WheelRng>,
    time: Res<Time>,
    mut history: ResMut<WheelHistory>,
    mut notices: EventWriter<WheelNotice>,
) {
    let now = now_ms(&time);
    for _ in requests.read() {
        match wheel.spin(now, &cfg, &mut rng.0) {
            Ok(SpinStart::Started(trajectory)) => history.push(
                now,
                HistoryKind::SpinStarted {
                    target_index: trajectory.spin.target_index,
                },
            ),
            Ok(SpinStart::Ignored) => {
                notices.write(WheelNotice::SpinIgnored);
            }
            Err(WheelError::TooFewSegments { found }) => {
                warn!(target: "wheel", "spin refused: only {found} segments");
                notices.write(WheelNotice::TooFewSegments { found });
            }
            Err(e) => warn!(target: "wheel", "spin failed: {e}"),
        }
    }
}

fn advance_wheel(
    mut wheel: ResMut<WheelState>,
    time: Res<Time>,
    mut history: ResMut<WheelHistory>,
    mut completed: EventWriter<SpinCompleted>,
) {
    if !wheel.is_spinning() {
        return;
    }
    let now = now_ms(&time);
    match wheel.advance(now) {
        Some(WheelEvent::SettleStarted { end }) => {
            debug!(target: "wheel", "settling at rotation {end:.4}");
        }
        Some(WheelEvent::SpinCompleted(outcome)) => {
            history.push(now, HistoryKind::SpinCompleted(outcome.clone()));
            completed.write(SpinCompleted(outcome));
        }
        None => {}
    }
}

fn handle_acknowledgements(
    mut acks: EventReader<WinnerAcknowledged>,
    mut wheel: ResMut<WheelState>,
    time: Res<Time>,
    mut history: ResMut<WheelHistory>,
) {
    for _ in acks.read() {
        match wheel.acknowledge() {
            Some(outcome) => history.push(
                now_ms(&time),
                HistoryKind::Acknowledged {
                    index: outcome.index,
                },
            ),
            None => debug!(target: "wheel", "acknowledgement with no pending result"),
        }
    }
}

fn run_auto_remove(
    mut wheel: ResMut<WheelState>,
    mut store: ResMut<WheelStore>,
    time: Res<Time>,
    mut history: ResMut<WheelHistory>,
    mut notices: EventWriter<WheelNotice>,
) {
    if !wheel.is_removing() {
        return;
    }
    let now = now_ms(&time);
    match wheel.finish_removal(store.0.as_mut()) {
        Ok(Some(RemovalOutcome::Removed { segment, remaining })) => {
            record_removal(&mut history, &mut notices, now, segment.text, remaining);
        }
        Err(WheelError::RemovalNotSaved {
            segment,
            remaining,
            source,
        }) => {
            record_removal(&mut history, &mut notices, now, segment.text, remaining);
            notices.write(WheelNotice::SaveFailed(source.to_string()));
        }
        Ok(Some(RemovalOutcome::Skipped { remaining })) => {
            history.push(now, HistoryKind::RemovalSkipped { remaining });
            notices.write(WheelNotice::RemovalSkipped { remaining });
        }
        Ok(None) => {}
        Err(e) => {
            notices.write(WheelNotice::SaveFailed(e.to_string()));
        }
    }
}

fn record_removal(
    history: &mut WheelHistory,
    notices: &mut EventWriter<WheelNotice>,
    now: f64,
    label: String,
    remaining: usize,
) {
    history.push(
        now,
        HistoryKind::Removed {
            label: label.clone(),
            remaining,
        },
    );
    notices.write(WheelNotice::Removed { label, remaining });
}
