//! Faderdeck: control surface for a remote audio-mixing engine.
//!
//! Operators see per-channel meters and set gain and mute on named input and
//! output channels. The engine is the source of truth: gain and mute are shown
//! only once the engine confirms them, and meters follow a periodic poll.

#![warn(clippy::all, rust_2018_idioms)]

pub mod addressing;
pub mod api;
pub mod app;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod heartbeat;
pub mod reconciler;
pub mod sequencing;
pub mod state;
pub mod surface;
mod util;
mod view;

pub use addressing::{ChannelKey, ElementId, ElementRole};
pub use api::{ApiClient, ApiError, ApiResult};
pub use app::ConsoleApp;
pub use console::{Console, ConsoleSettings};
pub use dispatcher::UserAction;
pub use heartbeat::LinkStatus;
pub use sequencing::OrderingPolicy;

/// Run the native GUI against the configured engine (without tracing init -
/// the caller handles that).
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native(config: config::Config) -> anyhow::Result<()> {
    use anyhow::Context;

    tracing::info!(
        "Connecting to mixing engine at {} (device {})",
        config.engine_url,
        config.device
    );

    // Requests and the heartbeat run on this runtime; the GUI owns the main thread
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let _guard = runtime.enter();

    let api = ApiClient::with_timeout(&config.engine_url, config.device, config.request_timeout)
        .context("Failed to create HTTP client")?;
    let console = Console::new(api, config.settings());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 560.0])
            .with_title("Faderdeck"),
        ..Default::default()
    };

    eframe::run_native(
        "Faderdeck",
        native_options,
        Box::new(move |cc| Ok(Box::new(ConsoleApp::new(cc, console)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {}", e))
}
