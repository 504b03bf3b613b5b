//! Channel-based IPC between async requests and the UI thread.
//!
//! Every reply is posted here and applied on the UI thread in arrival order,
//! so no two writes to the surface ever run concurrently.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::addressing::ChannelKey;
use crate::api::ApiResult;
use crate::sequencing::Ticket;
use faderdeck_types::StateSnapshot;

/// Messages sent from async operations to the main UI thread.
#[derive(Debug)]
pub enum AppMessage {
    /// Reply to a gain-set request
    GainReply {
        key: ChannelKey,
        ticket: Ticket,
        result: ApiResult<f32>,
    },
    /// Reply to a mute-set request
    MuteReply {
        key: ChannelKey,
        ticket: Ticket,
        muted: bool,
        result: ApiResult<()>,
    },
    /// Reply to one state poll
    Heartbeat {
        ticket: Ticket,
        result: ApiResult<StateSnapshot>,
    },
}

/// Application state with channel-based communication.
pub struct AppStateChannels {
    /// Sender for app messages (cloned for each async operation)
    pub tx: Sender<AppMessage>,
    /// Receiver for app messages (owned by main UI thread)
    pub rx: Receiver<AppMessage>,
}

impl AppStateChannels {
    /// Create new application state channels.
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Get a clone of the sender for use in async operations.
    pub fn sender(&self) -> Sender<AppMessage> {
        self.tx.clone()
    }
}

impl Default for AppStateChannels {
    fn default() -> Self {
        Self::new()
    }
}
