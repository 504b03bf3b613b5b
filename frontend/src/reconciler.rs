//! Heartbeat reconciler.
//!
//! Applies one full-state snapshot to every rendered channel it covers. Only
//! meter text, meter band and the remote mute flag are written here; gain,
//! slider position and the on/off lamps belong to the command dispatcher.

use crate::addressing::ChannelKey;
use crate::surface::{ChannelPanel, Surface};
use crate::util::format_level;
use faderdeck_types::mixer::{LEVEL_RED_DB, LEVEL_YELLOW_DB};
use faderdeck_types::{ChannelState, StateSnapshot};

/// Color classification of a meter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelBand {
    Green,
    Yellow,
    Red,
}

impl LevelBand {
    /// Classify a rounded level. First match wins: red, then yellow, else green.
    pub fn classify(rounded: i64) -> Self {
        if rounded >= LEVEL_RED_DB {
            LevelBand::Red
        } else if rounded >= LEVEL_YELLOW_DB {
            LevelBand::Yellow
        } else {
            LevelBand::Green
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            LevelBand::Green => "green",
            LevelBand::Yellow => "yellow",
            LevelBand::Red => "red",
        }
    }
}

/// Round a meter reading to whole decibels for display, halves rounding up
/// (`-2.5` becomes `-2`). Non-finite readings display as 0.
pub fn round_level(level: f64) -> i64 {
    if !level.is_finite() {
        return 0;
    }
    (level + 0.5).floor() as i64
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries applied to a rendered channel
    pub applied: usize,
    /// Entries without a rendered channel
    pub skipped: usize,
}

/// Apply a snapshot to the surface. Idempotent.
pub fn apply_snapshot(surface: &mut Surface, snapshot: &StateSnapshot) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for (group, position, state) in snapshot.entries() {
        let panel = ChannelKey::from_position(group.clone(), position)
            .ok()
            .and_then(|key| surface.panel_mut(&key));

        match panel {
            Some(panel) => {
                apply_channel(panel, state);
                report.applied += 1;
            }
            None => {
                tracing::trace!(
                    "Snapshot entry {} #{} has no rendered channel",
                    group,
                    position
                );
                report.skipped += 1;
            }
        }
    }

    report
}

fn apply_channel(panel: &mut ChannelPanel, state: &ChannelState) {
    panel.remote_muted = state.muted;

    if state.muted {
        // Band stays whatever it last was
        panel.meter_text.clear();
        return;
    }

    let rounded = round_level(state.level);
    panel.meter_text = format_level(rounded);
    panel.meter_band = Some(LevelBand::classify(rounded));
}
