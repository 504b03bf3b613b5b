//! The control surface core: rendered panels plus the synchronization state
//! that keeps them in line with the engine.
//!
//! All writes to the surface happen in [`Console::handle_message`], on the
//! thread that owns the console, in the order replies arrive.

use std::time::Duration;

use faderdeck_types::mixer::{DEFAULT_HEARTBEAT_MS, DEFAULT_STALE_AFTER};
use faderdeck_types::{ChannelDescriptor, StateSnapshot};

use crate::addressing::ChannelKey;
use crate::api::ApiClient;
use crate::dispatcher::{apply_gain_reply, apply_mute_reply, CommandDispatcher, UserAction};
use crate::heartbeat::{start_polling, LinkMonitor, LinkStatus, PollHandle};
use crate::reconciler::apply_snapshot;
use crate::sequencing::{OrderingPolicy, Sequencer, SyncField, Ticket};
use crate::state::{AppMessage, AppStateChannels};
use crate::surface::Surface;

/// Runtime settings of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub heartbeat_interval: Duration,
    pub stale_after: u32,
    pub ordering: OrderingPolicy,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_millis(DEFAULT_HEARTBEAT_MS),
            stale_after: DEFAULT_STALE_AFTER,
            ordering: OrderingPolicy::default(),
        }
    }
}

pub struct Console {
    surface: Surface,
    dispatcher: CommandDispatcher,
    sequencer: Sequencer,
    link: LinkMonitor,
    channels: AppStateChannels,
    settings: ConsoleSettings,
    poller: Option<PollHandle>,
    repaint: Option<egui::Context>,
}

impl Console {
    pub fn new(api: ApiClient, settings: ConsoleSettings) -> Self {
        let channels = AppStateChannels::new();
        let dispatcher = CommandDispatcher::new(api, channels.sender());

        Self {
            surface: Surface::new(),
            dispatcher,
            sequencer: Sequencer::new(settings.ordering),
            link: LinkMonitor::new(settings.stale_after),
            channels,
            settings,
            poller: None,
            repaint: None,
        }
    }

    /// Build the channel panels from initial descriptors.
    ///
    /// If this is never called, the first successful poll is used instead.
    pub fn render<I>(&mut self, descriptors: I) -> usize
    where
        I: IntoIterator<Item = (ChannelKey, ChannelDescriptor)>,
    {
        let created = self.surface.render(descriptors);
        tracing::info!("Rendered {} channels", created);
        created
    }

    /// Wake this context whenever a reply arrives.
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.dispatcher.set_repaint_context(ctx.clone());
        self.repaint = Some(ctx);
    }

    /// Start the heartbeat. Calling it again restarts the poll loop.
    pub fn start(&mut self) {
        self.stop();
        self.poller = Some(start_polling(
            self.dispatcher.api().clone(),
            self.channels.sender(),
            self.settings.heartbeat_interval,
            self.repaint.clone(),
        ));
    }

    pub fn stop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
            tracing::info!("Heartbeat stopped");
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn link_status(&self) -> LinkStatus {
        self.link.status()
    }

    pub fn link(&self) -> &LinkMonitor {
        &self.link
    }

    /// Base URL of the engine this console talks to.
    pub fn engine_url(&self) -> &str {
        self.dispatcher.api().base_url()
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    pub fn dispatcher_mut(&mut self) -> &mut CommandDispatcher {
        &mut self.dispatcher
    }

    /// Forward a user gesture to the dispatcher.
    pub fn perform(&mut self, action: UserAction) -> Ticket {
        self.dispatcher.perform(action)
    }

    /// Apply every reply that has arrived so far. Returns how many were handled.
    pub fn process_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.channels.rx.try_recv() {
            self.handle_message(msg);
            handled += 1;
        }
        handled
    }

    /// Apply one reply. Failed replies leave the surface untouched.
    pub fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::GainReply {
                key,
                ticket,
                result,
            } => match result {
                Ok(confirmed) => {
                    if !self.sequencer.admit(SyncField::Gain(key.clone()), ticket) {
                        tracing::debug!("Dropping stale gain reply #{} for {}", ticket.value(), key);
                        return;
                    }
                    tracing::debug!("Gain confirmed {} = {}", key, confirmed);
                    apply_gain_reply(&mut self.surface, &key, confirmed);
                }
                Err(e) => {
                    tracing::warn!("Gain command for {} failed ({}): {}", key, e.kind(), e);
                }
            },
            AppMessage::MuteReply {
                key,
                ticket,
                muted,
                result,
            } => match result {
                Ok(()) => {
                    if !self.sequencer.admit(SyncField::Mute(key.clone()), ticket) {
                        tracing::debug!("Dropping stale mute reply #{} for {}", ticket.value(), key);
                        return;
                    }
                    tracing::debug!("Mute confirmed {} = {}", key, muted);
                    apply_mute_reply(&mut self.surface, &key, muted);
                }
                Err(e) => {
                    tracing::warn!("Mute command for {} failed ({}): {}", key, e.kind(), e);
                }
            },
            AppMessage::Heartbeat { ticket, result } => match result {
                Ok(snapshot) => {
                    self.link.record_success();
                    if !self.sequencer.admit(SyncField::Snapshot, ticket) {
                        tracing::debug!("Dropping stale heartbeat #{}", ticket.value());
                        return;
                    }
                    self.reconcile(&snapshot);
                }
                Err(e) => self.link.record_failure(&e),
            },
        }
    }

    fn reconcile(&mut self, snapshot: &StateSnapshot) {
        if !self.surface.is_rendered() {
            tracing::info!(
                "Building surface from first snapshot ({} channels)",
                snapshot.channel_count()
            );
            let descriptors = snapshot
                .descriptors()
                .into_iter()
                .filter_map(|(group, position, desc)| {
                    ChannelKey::from_position(group, position)
                        .ok()
                        .map(|key| (key, desc))
                });
            self.render(descriptors);
        }

        let report = apply_snapshot(&mut self.surface, snapshot);
        tracing::trace!(
            "Heartbeat applied to {} channels ({} skipped)",
            report.applied,
            report.skipped
        );
    }
}
