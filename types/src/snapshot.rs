//! Full-state snapshot returned by the engine's poll endpoint.

use crate::channel::{ChannelDescriptor, Group};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Live state of one channel as reported by a poll.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelState {
    /// Meter reading in dB. Not bounded by the gain domain.
    pub level: f64,
    pub muted: bool,
    /// Channel label, when the engine reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Current gain in dB, when the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f32>,
}

/// One full-state reply from the poll endpoint.
///
/// Channels are listed per group in index order; the entry at position 0 is
/// channel 1.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub channels: BTreeMap<Group, Vec<ChannelState>>,
}

impl StateSnapshot {
    /// Iterate over every entry as `(group, 0-based position, state)`.
    pub fn entries(&self) -> impl Iterator<Item = (&Group, usize, &ChannelState)> + '_ {
        self.channels.iter().flat_map(|(group, states)| {
            states
                .iter()
                .enumerate()
                .map(move |(position, state)| (group, position, state))
        })
    }

    /// Total number of channel entries across all groups.
    pub fn channel_count(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    /// Build initial descriptors from this snapshot.
    ///
    /// Missing labels become empty (the surface derives a default), missing
    /// gains become unity.
    pub fn descriptors(&self) -> Vec<(Group, usize, ChannelDescriptor)> {
        self.entries()
            .map(|(group, position, state)| {
                (
                    group.clone(),
                    position,
                    ChannelDescriptor {
                        label: state.label.clone().unwrap_or_default(),
                        gain: state.gain.unwrap_or(0.0),
                        muted: state.muted,
                    },
                )
            })
            .collect()
    }
}
