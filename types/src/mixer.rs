//! Default values and limits for the control surface.
//!
//! Single source of truth shared by the surface, the dispatcher and the tests.

// ── Gain domain ─────────────────────────────────────────────────────
pub const GAIN_MIN_DB: i32 = -65;
pub const GAIN_MAX_DB: i32 = 20;
/// Gain issued by the reset gesture.
pub const UNITY_GAIN_DB: i32 = 0;

// ── Meter bands ─────────────────────────────────────────────────────
/// Rounded levels at or above this are shown red.
pub const LEVEL_RED_DB: i64 = 20;
/// Rounded levels at or above this (and below red) are shown yellow.
pub const LEVEL_YELLOW_DB: i64 = 10;

/// Unit suffix appended to every displayed decibel value.
pub const DB_SUFFIX: &str = "db";

// ── Polling / transport defaults ────────────────────────────────────
pub const DEFAULT_HEARTBEAT_MS: u64 = 1000;
/// Consecutive failed polls before the link is reported stale.
pub const DEFAULT_STALE_AFTER: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2000;
