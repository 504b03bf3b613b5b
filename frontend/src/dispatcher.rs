//! Command dispatcher.
//!
//! Sends gain and mute commands to the engine. Nothing is shown before the
//! engine answers: each reply travels back to the UI thread as an
//! [`AppMessage`] and only a successful one is applied to the surface, with
//! the value the engine confirmed. Failed commands are not retried.

use std::sync::mpsc::Sender;

use faderdeck_types::mixer::UNITY_GAIN_DB;

use crate::addressing::ChannelKey;
use crate::api::ApiClient;
use crate::app::spawn_task;
use crate::sequencing::{Ticket, TicketCounter};
use crate::state::AppMessage;
use crate::surface::{MuteLamp, Surface};

/// A user gesture on one channel's controls.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// Slider released at the given position (once per drag gesture)
    SliderCommitted(ChannelKey, f32),
    /// Reset gesture on the slider: unity gain regardless of its position
    ResetGain(ChannelKey),
    /// "On" pressed: unmute
    OnPressed(ChannelKey),
    /// "Off" pressed: mute
    OffPressed(ChannelKey),
}

/// Issues commands against the engine.
pub struct CommandDispatcher {
    api: ApiClient,
    tx: Sender<AppMessage>,
    tickets: TicketCounter,
    repaint: Option<egui::Context>,
}

impl CommandDispatcher {
    pub fn new(api: ApiClient, tx: Sender<AppMessage>) -> Self {
        Self {
            api,
            tx,
            tickets: TicketCounter::default(),
            repaint: None,
        }
    }

    /// Wake this context whenever a reply is posted.
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Translate a user gesture into a command.
    pub fn perform(&mut self, action: UserAction) -> Ticket {
        match action {
            UserAction::SliderCommitted(key, value) => self.set_gain(&key, value.round() as i32),
            UserAction::ResetGain(key) => self.reset_gain(&key),
            UserAction::OnPressed(key) => self.set_mute(&key, false),
            UserAction::OffPressed(key) => self.set_mute(&key, true),
        }
    }

    /// Request a gain. The value is passed through unclamped; the engine owns
    /// the range.
    pub fn set_gain(&mut self, key: &ChannelKey, value: i32) -> Ticket {
        let ticket = self.tickets.issue();
        let api = self.api.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let key = key.clone();

        tracing::debug!("Gain request {} -> {} (#{})", key, value, ticket.value());

        spawn_task(async move {
            let result = api.set_gain(&key, value).await;
            if tx
                .send(AppMessage::GainReply {
                    key,
                    ticket,
                    result,
                })
                .is_err()
            {
                tracing::debug!("UI closed, dropping gain reply");
            }
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });

        ticket
    }

    /// Request unity gain.
    pub fn reset_gain(&mut self, key: &ChannelKey) -> Ticket {
        self.set_gain(key, UNITY_GAIN_DB)
    }

    pub fn set_mute(&mut self, key: &ChannelKey, muted: bool) -> Ticket {
        let ticket = self.tickets.issue();
        let api = self.api.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let key = key.clone();

        tracing::debug!("Mute request {} -> {} (#{})", key, muted, ticket.value());

        spawn_task(async move {
            let result = api.set_mute(&key, muted).await;
            if tx
                .send(AppMessage::MuteReply {
                    key,
                    ticket,
                    muted,
                    result,
                })
                .is_err()
            {
                tracing::debug!("UI closed, dropping mute reply");
            }
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });

        ticket
    }
}

/// Show an engine-confirmed gain: slider position and its readout.
/// Returns false if the channel has no panel.
pub fn apply_gain_reply(surface: &mut Surface, key: &ChannelKey, confirmed: f32) -> bool {
    match surface.panel_mut(key) {
        Some(panel) => {
            panel.gain = confirmed;
            true
        }
        None => false,
    }
}

/// Light the control matching an engine-confirmed mute state.
/// Returns false if the channel has no panel.
pub fn apply_mute_reply(surface: &mut Surface, key: &ChannelKey, muted: bool) -> bool {
    match surface.panel_mut(key) {
        Some(panel) => {
            panel.lamp = MuteLamp::from_muted(muted);
            true
        }
        None => false,
    }
}
