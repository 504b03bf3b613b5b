//! eframe application hosting the console.

use egui::{Color32, Context, RichText};

use crate::console::Console;
use crate::heartbeat::LinkStatus;
use crate::view::ChannelView;

#[cfg(target_arch = "wasm32")]
pub fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// The main Faderdeck application.
pub struct ConsoleApp {
    console: Console,
    view: ChannelView,
}

impl ConsoleApp {
    /// Wire the console to this context and start the heartbeat.
    pub fn new(cc: &eframe::CreationContext<'_>, mut console: Console) -> Self {
        console.set_repaint_context(cc.egui_ctx.clone());
        console.start();

        Self {
            console,
            view: ChannelView::new(),
        }
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        let status = self.console.link_status();
        let color = match status {
            LinkStatus::Connecting => Color32::GRAY,
            LinkStatus::Connected => Color32::from_rgb(0, 200, 0),
            LinkStatus::Stale { .. } => Color32::from_rgb(255, 0, 0),
        };

        ui.horizontal(|ui| {
            ui.label(RichText::new("●").color(color));
            ui.label(status.description());
            let link = self.console.link();
            match status {
                LinkStatus::Stale { failures } => {
                    ui.label(RichText::new(format!("({} failed polls)", failures)).weak());
                }
                LinkStatus::Connected if link.consecutive_failures() > 0 => {
                    ui.label(
                        RichText::new(format!("({} missed)", link.consecutive_failures())).weak(),
                    );
                }
                _ => {}
            }
            if let Some(age) = link.last_snapshot_age() {
                ui.label(
                    RichText::new(format!("updated {:.1}s ago", age.as_secs_f32()))
                        .small()
                        .weak(),
                );
            }
            ui.separator();
            ui.label(
                RichText::new(self.console.engine_url())
                    .monospace()
                    .weak(),
            );
        });
    }
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.console.process_messages();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar(ui);
        });

        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if self.console.surface().is_rendered() {
                    self.view.show(ui, self.console.surface())
                } else {
                    ui.centered_and_justified(|ui| {
                        ui.label("Waiting for the mixing engine...");
                    });
                    Vec::new()
                }
            })
            .inner;

        for action in actions {
            self.console.perform(action);
        }

        // Keep the status bar fresh even when no reply wakes us
        ctx.request_repaint_after(self.console.settings().heartbeat_interval);
    }
}
