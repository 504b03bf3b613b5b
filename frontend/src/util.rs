//! Utility functions for decibel formatting and meter colors.

use crate::reconciler::LevelBand;
use egui::Color32;
use faderdeck_types::mixer::DB_SUFFIX;

/// Format a confirmed gain as shown next to the slider, e.g. "-10db".
pub(crate) fn format_db(gain: f32) -> String {
    format!("{}{}", gain, DB_SUFFIX)
}

/// Format a rounded meter level, e.g. "19db".
pub(crate) fn format_level(rounded: i64) -> String {
    format!("{}{}", rounded, DB_SUFFIX)
}

/// Get color for a meter band.
pub(crate) fn band_color(band: Option<LevelBand>) -> Color32 {
    match band {
        Some(LevelBand::Green) => Color32::from_rgb(0, 200, 0),
        Some(LevelBand::Yellow) => Color32::from_rgb(255, 220, 0),
        Some(LevelBand::Red) => Color32::from_rgb(255, 0, 0),
        None => Color32::GRAY,
    }
}
