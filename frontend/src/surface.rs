//! Display surface: the rendered state of every channel panel.
//!
//! This is the control surface's "live DOM". Panels are created once by
//! [`Surface::render`]; afterwards only the dispatcher (gain, lamps) and the
//! reconciler (meter, remote mute flag) write to them.

use crate::addressing::{ChannelKey, ElementId, ElementRole};
use crate::reconciler::LevelBand;
use crate::util::format_db;
use faderdeck_types::ChannelDescriptor;
use std::collections::BTreeMap;

/// Which of the two mute controls is lit.
///
/// A single value, so exactly one of on/off is lit at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteLamp {
    /// "On" lit: channel passes audio
    On,
    /// "Off" lit: channel muted
    Off,
}

impl MuteLamp {
    pub fn from_muted(muted: bool) -> Self {
        if muted {
            MuteLamp::Off
        } else {
            MuteLamp::On
        }
    }

    pub fn is_muted(&self) -> bool {
        matches!(self, MuteLamp::Off)
    }

    pub fn on_lit(&self) -> bool {
        matches!(self, MuteLamp::On)
    }

    pub fn off_lit(&self) -> bool {
        matches!(self, MuteLamp::Off)
    }
}

/// Rendered state of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPanel {
    key: ChannelKey,
    label: String,
    /// Last gain echoed by the engine (or the initial descriptor)
    pub(crate) gain: f32,
    pub(crate) meter_text: String,
    pub(crate) meter_band: Option<LevelBand>,
    pub(crate) lamp: MuteLamp,
    /// Mute flag from the latest applied snapshot
    pub(crate) remote_muted: bool,
}

impl ChannelPanel {
    fn new(key: ChannelKey, descriptor: ChannelDescriptor) -> Self {
        let label = if descriptor.label.is_empty() {
            key.default_label()
        } else {
            descriptor.label
        };

        Self {
            key,
            label,
            gain: descriptor.gain,
            meter_text: String::new(),
            meter_band: None,
            lamp: MuteLamp::from_muted(descriptor.muted),
            remote_muted: descriptor.muted,
        }
    }

    pub fn key(&self) -> &ChannelKey {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Slider position: the confirmed gain.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Numeric readout next to the slider.
    pub fn fader_label(&self) -> String {
        format_db(self.gain)
    }

    pub fn meter_text(&self) -> &str {
        &self.meter_text
    }

    pub fn meter_band(&self) -> Option<LevelBand> {
        self.meter_band
    }

    pub fn lamp(&self) -> MuteLamp {
        self.lamp
    }

    pub fn remote_muted(&self) -> bool {
        self.remote_muted
    }
}

/// All rendered channel panels, ordered by group then index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    panels: BTreeMap<ChannelKey, ChannelPanel>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one panel per descriptor. Returns the number of panels created.
    ///
    /// A descriptor for a channel that already has a panel is ignored; panels
    /// are never replaced or removed.
    pub fn render<I>(&mut self, descriptors: I) -> usize
    where
        I: IntoIterator<Item = (ChannelKey, ChannelDescriptor)>,
    {
        let mut created = 0;
        for (key, descriptor) in descriptors {
            if self.panels.contains_key(&key) {
                tracing::warn!("Channel {} already rendered, ignoring descriptor", key);
                continue;
            }
            self.panels
                .insert(key.clone(), ChannelPanel::new(key, descriptor));
            created += 1;
        }
        created
    }

    pub fn is_rendered(&self) -> bool {
        !self.panels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panel(&self, key: &ChannelKey) -> Option<&ChannelPanel> {
        self.panels.get(key)
    }

    pub(crate) fn panel_mut(&mut self, key: &ChannelKey) -> Option<&mut ChannelPanel> {
        self.panels.get_mut(key)
    }

    pub fn panels(&self) -> impl Iterator<Item = &ChannelPanel> {
        self.panels.values()
    }

    /// Text content of an element, as a DOM lookup would return it.
    pub fn text(&self, id: &ElementId) -> Option<String> {
        let panel = self.panels.get(&id.key)?;
        let text = match id.role {
            ElementRole::Panel => panel.label.clone(),
            ElementRole::Level => panel.meter_text.clone(),
            ElementRole::FaderLevel => panel.fader_label(),
            ElementRole::Slider => panel.gain.to_string(),
            ElementRole::On => "On".to_string(),
            ElementRole::Off => "Off".to_string(),
        };
        Some(text)
    }

    /// Class list of an element, as a DOM lookup would return it.
    pub fn class_name(&self, id: &ElementId) -> Option<String> {
        let panel = self.panels.get(&id.key)?;
        let class = match id.role {
            ElementRole::Panel => "channel".to_string(),
            ElementRole::Level => match panel.meter_band {
                Some(band) => format!("level {}", band.class_name()),
                None => "level".to_string(),
            },
            ElementRole::FaderLevel => "faderLevel".to_string(),
            ElementRole::Slider => "slider".to_string(),
            ElementRole::On if panel.lamp.on_lit() => "on lit".to_string(),
            ElementRole::On => "on".to_string(),
            ElementRole::Off if panel.lamp.off_lit() => "off lit".to_string(),
            ElementRole::Off => "off".to_string(),
        };
        Some(class)
    }
}
