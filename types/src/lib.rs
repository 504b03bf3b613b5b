//! Shared types for the Faderdeck control surface.
//!
//! This crate contains the domain models and wire types of the mixing
//! engine's control API, shared by the control surface and its test harness.

/// Default base URL of the mixing engine's control API.
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:1776";

/// Default device id (first path segment of every control request).
pub const DEFAULT_DEVICE: u8 = 0;

/// Highest device id the engine addresses.
pub const MAX_DEVICE: u8 = 7;

pub mod channel;
pub mod mixer;
pub mod snapshot;

// Re-export commonly used types
pub use channel::{ChannelDescriptor, Group, OtherCode};
pub use snapshot::{ChannelState, StateSnapshot};
