//! Reply ordering.
//!
//! Replies can arrive out of send order. By default every reply is applied as
//! it arrives (last applied wins). With [`OrderingPolicy::Sequenced`] each
//! request carries a monotonic [`Ticket`] and a reply older than the newest
//! one already applied to the same field is dropped.

use crate::addressing::ChannelKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Monotonic request token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Issues increasing tickets.
#[derive(Debug, Default)]
pub struct TicketCounter {
    last: u64,
}

impl TicketCounter {
    pub fn issue(&mut self) -> Ticket {
        self.last += 1;
        Ticket(self.last)
    }
}

/// How replies that arrive out of order are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
    /// Apply every reply in arrival order
    #[default]
    LastApplied,
    /// Drop replies older than the last applied one for the same field
    Sequenced,
}

/// A field written by replies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncField {
    Gain(ChannelKey),
    Mute(ChannelKey),
    Snapshot,
}

/// Tracks the newest applied ticket per field.
#[derive(Debug, Default)]
pub struct Sequencer {
    policy: OrderingPolicy,
    applied: HashMap<SyncField, Ticket>,
}

impl Sequencer {
    pub fn new(policy: OrderingPolicy) -> Self {
        Self {
            policy,
            applied: HashMap::new(),
        }
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    /// Decide whether a successful reply may be applied, recording it if so.
    pub fn admit(&mut self, field: SyncField, ticket: Ticket) -> bool {
        match self.policy {
            OrderingPolicy::LastApplied => true,
            OrderingPolicy::Sequenced => match self.applied.get(&field) {
                Some(last) if *last > ticket => false,
                _ => {
                    self.applied.insert(field, ticket);
                    true
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faderdeck_types::Group;

    fn gain_field(index: u32) -> SyncField {
        SyncField::Gain(ChannelKey::new(Group::Input, index).unwrap())
    }

    #[test]
    fn test_counter_is_monotonic() {
        let mut counter = TicketCounter::default();
        let a = counter.issue();
        let b = counter.issue();
        assert!(b > a);
        assert_eq!(a.value(), 1);
    }

    #[test]
    fn test_last_applied_admits_everything() {
        let mut sequencer = Sequencer::new(OrderingPolicy::LastApplied);
        assert!(sequencer.admit(gain_field(1), Ticket::new(5)));
        assert!(sequencer.admit(gain_field(1), Ticket::new(2)));
    }

    #[test]
    fn test_sequenced_drops_stale() {
        let mut sequencer = Sequencer::new(OrderingPolicy::Sequenced);
        assert!(sequencer.admit(gain_field(1), Ticket::new(5)));
        assert!(!sequencer.admit(gain_field(1), Ticket::new(2)));
        assert!(sequencer.admit(gain_field(1), Ticket::new(6)));
    }

    #[test]
    fn test_sequenced_fields_independent() {
        let mut sequencer = Sequencer::new(OrderingPolicy::Sequenced);
        let key = ChannelKey::new(Group::Input, 1).unwrap();
        assert!(sequencer.admit(SyncField::Gain(key.clone()), Ticket::new(9)));
        assert!(sequencer.admit(SyncField::Mute(key), Ticket::new(3)));
        assert!(sequencer.admit(gain_field(2), Ticket::new(1)));
        assert!(sequencer.admit(SyncField::Snapshot, Ticket::new(1)));
    }

    #[test]
    fn test_policy_names() {
        let policy: OrderingPolicy = serde_json::from_str("\"last-applied\"").unwrap();
        assert_eq!(policy, OrderingPolicy::LastApplied);
        let policy: OrderingPolicy = serde_json::from_str("\"sequenced\"").unwrap();
        assert_eq!(policy, OrderingPolicy::Sequenced);
    }
}
