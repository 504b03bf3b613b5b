//! Faderdeck application.
//!
//! Supports both WASM (for web browsers) and native modes.

#![warn(clippy::all, rust_2018_idioms)]

// ============================================================================
// WASM Entry Point
// ============================================================================

#[cfg(target_arch = "wasm32")]
fn main() {
    use faderdeck::{ApiClient, Console, ConsoleApp, ConsoleSettings};
    use wasm_bindgen::JsCast;

    // Initialize panic handler for better error messages in browser console
    console_error_panic_hook::set_once();

    // Initialize tracing for WASM
    tracing_wasm::set_as_global_default();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let window = web_sys::window().expect("No window");
        // The control API is served from the same origin as the page
        let origin = window.location().origin().expect("No page origin");
        let document = window.document().expect("No document");
        let canvas = document
            .get_element_by_id("faderdeck_canvas")
            .expect("Failed to find faderdeck_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("faderdeck_canvas is not a canvas");

        let api = ApiClient::new(origin, faderdeck_types::DEFAULT_DEVICE);
        let console = Console::new(api, ConsoleSettings::default());

        eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(ConsoleApp::new(cc, console)))),
            )
            .await
            .expect("Failed to start eframe");
    });
}

// ============================================================================
// Native Entry Point
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// Faderdeck - control surface for a remote audio-mixing engine
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the engine's control API
    #[arg(long)]
    url: Option<String>,

    /// Device id on the engine (0-7)
    #[arg(long)]
    device: Option<u8>,

    /// Heartbeat interval in milliseconds
    #[arg(long = "heartbeat-ms")]
    heartbeat_ms: Option<u64>,

    /// Failed polls in a row before the link is shown as disconnected
    #[arg(long)]
    stale_after: Option<u32>,

    /// How replies that arrive out of order are treated
    #[arg(long, value_enum)]
    ordering: Option<faderdeck::OrderingPolicy>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use faderdeck::config::{Config, ConfigOverrides};
    use tracing_subscriber::{fmt, EnvFilter};

    let args = Args::parse();

    let config = Config::from_figment(ConfigOverrides {
        engine_url: args.url,
        device: args.device,
        heartbeat_ms: args.heartbeat_ms,
        stale_after: args.stale_after,
        ordering: args.ordering,
        log_level: args.log_level,
    })?;

    // Initialize logging - configured level, else RUST_LOG, else info
    let filter = match config.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    tracing::info!("Starting Faderdeck");

    faderdeck::run_native(config)
}
