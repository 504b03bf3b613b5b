//! Channel renderer: one strip per panel, gestures turned into [`UserAction`]s.
//!
//! The renderer only reads the surface. The slider shows the confirmed gain
//! except while the user is dragging it.

use std::collections::HashMap;

use egui::{RichText, Ui};
use faderdeck_types::mixer::{GAIN_MAX_DB, GAIN_MIN_DB};
use faderdeck_types::Group;

use crate::addressing::ChannelKey;
use crate::dispatcher::UserAction;
use crate::surface::{ChannelPanel, Surface};
use crate::util::band_color;

const STRIP_WIDTH: f32 = 64.0;
const SLIDER_HEIGHT: f32 = 220.0;

#[derive(Debug, Default)]
pub struct ChannelView {
    /// Slider positions of drags in progress
    drafts: HashMap<ChannelKey, f32>,
}

impl ChannelView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw all panels, returning the gestures made this frame.
    pub fn show(&mut self, ui: &mut Ui, surface: &Surface) -> Vec<UserAction> {
        let mut actions = Vec::new();

        let mut groups: Vec<(&Group, Vec<&ChannelPanel>)> = Vec::new();
        for panel in surface.panels() {
            let same_group = groups
                .last()
                .is_some_and(|(group, _)| *group == panel.key().group());
            if same_group {
                if let Some((_, panels)) = groups.last_mut() {
                    panels.push(panel);
                }
            } else {
                groups.push((panel.key().group(), vec![panel]));
            }
        }

        egui::ScrollArea::both().show(ui, |ui| {
            for (group, panels) in groups {
                ui.heading(group.pretty_name());
                ui.horizontal_top(|ui| {
                    for panel in panels {
                        self.strip(ui, panel, &mut actions);
                    }
                });
                ui.add_space(8.0);
            }
        });

        actions
    }

    fn strip(&mut self, ui: &mut Ui, panel: &ChannelPanel, actions: &mut Vec<UserAction>) {
        let key = panel.key();

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(STRIP_WIDTH);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(key.index().to_string()).small().weak());
                ui.label(RichText::new(panel.label()).strong());

                ui.label(
                    RichText::new(panel.meter_text())
                        .monospace()
                        .color(band_color(panel.meter_band())),
                );
                ui.label(RichText::new(panel.fader_label()).monospace());
                if panel.remote_muted() {
                    ui.label(RichText::new("muted").small().weak());
                }

                let mut value = self.drafts.get(key).copied().unwrap_or(panel.gain());
                ui.spacing_mut().slider_width = SLIDER_HEIGHT;
                let response = ui.add(
                    egui::Slider::new(&mut value, GAIN_MIN_DB as f32..=GAIN_MAX_DB as f32)
                        .vertical()
                        .step_by(1.0)
                        .show_value(false),
                );

                // Plain clicks do nothing; only a finished drag or a reset commits
                if response.double_clicked() {
                    self.drafts.remove(key);
                    actions.push(UserAction::ResetGain(key.clone()));
                } else if response.drag_stopped() {
                    self.drafts.remove(key);
                    actions.push(UserAction::SliderCommitted(key.clone(), value));
                } else if response.dragged() {
                    self.drafts.insert(key.clone(), value);
                }

                let lamp = panel.lamp();
                if ui
                    .add(egui::Button::new("On").selected(lamp.on_lit()))
                    .clicked()
                {
                    actions.push(UserAction::OnPressed(key.clone()));
                }
                if ui
                    .add(egui::Button::new("Off").selected(lamp.off_lit()))
                    .clicked()
                {
                    actions.push(UserAction::OffPressed(key.clone()));
                }
            });
        });
    }
}
