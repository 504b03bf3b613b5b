//! Channel addressing.
//!
//! Deterministic mapping from a channel identity (group + 1-based index) to
//! the handles of its display/control elements and to its resource path on
//! the engine's control API.
//!
//! Every control carries its [`ElementId`] as bound context, so UI events never
//! need to parse a string to find their channel. The string form exists for
//! DOM-style lookups and logging, and parses back to the same handle.

use faderdeck_types::Group;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PANEL_PREFIX: &str = "channel_";

/// Addressing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Channel indices are 1-based
    #[error("channel index must be 1 or greater")]
    ZeroIndex,
    /// Snapshot position with no representable channel index
    #[error("snapshot position {0} out of range")]
    PositionOutOfRange(usize),
    /// A string handle that does not follow the element naming scheme
    #[error("malformed element id: {0}")]
    Malformed(String),
}

/// Identity of one channel. Unique per `(group, index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelKey {
    group: Group,
    index: u32,
}

impl ChannelKey {
    pub fn new(group: Group, index: u32) -> Result<Self, AddressError> {
        if index == 0 {
            return Err(AddressError::ZeroIndex);
        }
        Ok(Self { group, index })
    }

    /// Key of the entry at a 0-based position in a group's snapshot list.
    pub fn from_position(group: Group, position: usize) -> Result<Self, AddressError> {
        let index = u32::try_from(position)
            .ok()
            .and_then(|p| p.checked_add(1))
            .ok_or(AddressError::PositionOutOfRange(position))?;
        Self::new(group, index)
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Handle of one of this channel's elements.
    pub fn element(&self, role: ElementRole) -> ElementId {
        ElementId {
            key: self.clone(),
            role,
        }
    }

    /// Label used when the channel has none, e.g. "Input 3".
    pub fn default_label(&self) -> String {
        format!("{} {}", self.group.pretty_name(), self.index)
    }

    /// Resource path of this channel on the given device: `/{device}/{group}/{index}`.
    pub fn resource_path(&self, device: u8) -> String {
        format!(
            "/{}/{}/{}",
            device,
            urlencoding::encode(self.group.code()),
            self.index
        )
    }

    pub fn gain_path(&self, device: u8) -> String {
        format!("{}/gain", self.resource_path(device))
    }

    pub fn mute_path(&self, device: u8) -> String {
        format!("{}/mute", self.resource_path(device))
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.group, self.index)
    }
}

/// The elements that make up one channel panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementRole {
    /// The panel container
    Panel,
    /// Live meter readout
    Level,
    /// Confirmed gain readout next to the slider
    FaderLevel,
    /// Gain slider
    Slider,
    /// "On" (unmuted) control
    On,
    /// "Off" (muted) control
    Off,
}

impl ElementRole {
    /// All roles that carry a suffix in the string form.
    pub const CONTROLS: [ElementRole; 5] = [
        ElementRole::Level,
        ElementRole::FaderLevel,
        ElementRole::Slider,
        ElementRole::On,
        ElementRole::Off,
    ];

    fn suffix(&self) -> Option<&'static str> {
        match self {
            ElementRole::Panel => None,
            ElementRole::Level => Some("level"),
            ElementRole::FaderLevel => Some("faderLevel"),
            ElementRole::Slider => Some("slider"),
            ElementRole::On => Some("on"),
            ElementRole::Off => Some("off"),
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Self::CONTROLS
            .into_iter()
            .find(|role| role.suffix() == Some(suffix))
    }
}

/// Structured handle of one element: the channel it belongs to plus its role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    pub key: ChannelKey,
    pub role: ElementRole,
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role.suffix() {
            Some(suffix) => write!(f, "{}_{}", self.key, suffix),
            None => write!(f, "{}{}", PANEL_PREFIX, self.key),
        }
    }
}

impl FromStr for ElementId {
    type Err = AddressError;

    /// Control ids end in a role suffix, panel ids end in the numeric index.
    /// Group codes may themselves contain underscores, so both forms are
    /// split from the right.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AddressError::Malformed(s.to_string());

        let (rest, last) = s.rsplit_once('_').ok_or_else(malformed)?;

        if let Some(role) = ElementRole::from_suffix(last) {
            let (group, index) = rest.rsplit_once('_').ok_or_else(malformed)?;
            let index = index.parse::<u32>().map_err(|_| malformed())?;
            let key = ChannelKey::new(Group::from_code(group), index)?;
            return Ok(key.element(role));
        }

        let body = s.strip_prefix(PANEL_PREFIX).ok_or_else(malformed)?;
        let (group, index) = body.rsplit_once('_').ok_or_else(malformed)?;
        let index = index.parse::<u32>().map_err(|_| malformed())?;
        let key = ChannelKey::new(Group::from_code(group), index)?;
        Ok(key.element(ElementRole::Panel))
    }
}
