//! Channel groups and initial channel descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel category used in addressing and display naming.
///
/// The engine encodes groups as short codes (`"I"`, `"O"`). Any other code is
/// carried verbatim in [`Group::Other`]; unknown groups are not an error.
/// Groups are built from codes, so every code maps to exactly one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Group {
    Input,
    Output,
    Other(OtherCode),
}

/// Code of a group other than input or output. Only [`Group::from_code`]
/// creates one, so it never holds `"I"` or `"O"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OtherCode(String);

impl OtherCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Group {
    /// Parse a group from its wire code.
    pub fn from_code(code: &str) -> Self {
        Group::from(code.to_string())
    }

    /// Wire code of this group.
    pub fn code(&self) -> &str {
        match self {
            Group::Input => "I",
            Group::Output => "O",
            Group::Other(code) => code.as_str(),
        }
    }

    /// Human readable group name, used only for fallback labels.
    /// Unknown codes are returned unchanged.
    pub fn pretty_name(&self) -> &str {
        match self {
            Group::Input => "Input",
            Group::Output => "Output",
            Group::Other(code) => code.as_str(),
        }
    }
}

impl From<String> for Group {
    fn from(code: String) -> Self {
        match code.as_str() {
            "I" => Group::Input,
            "O" => Group::Output,
            _ => Group::Other(OtherCode(code)),
        }
    }
}

impl From<&str> for Group {
    fn from(code: &str) -> Self {
        Group::from_code(code)
    }
}

impl From<Group> for String {
    fn from(group: Group) -> Self {
        group.code().to_string()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Initial state of one channel, used once to build its panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Display label; empty means "derive from group and index".
    #[serde(default)]
    pub label: String,
    /// Initial gain in dB
    #[serde(default)]
    pub gain: f32,
    /// Initial mute state
    #[serde(default)]
    pub muted: bool,
}
