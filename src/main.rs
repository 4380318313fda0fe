#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use graffiti_overlay::{GraffitiApp, OverlayConfig, app::INITIAL_WINDOW_SIZE};
use std::path::PathBuf;

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = OverlayConfig::from_env().unwrap_or_else(|err| {
        log::error!("{}, falling back to defaults", err);
        OverlayConfig::default()
    });
    // Optional image to annotate, standing in for the page
    let page = std::env::args_os().nth(1).map(PathBuf::from);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(INITIAL_WINDOW_SIZE)
            .with_title("GraffitiTab"),
        ..Default::default()
    };
    eframe::run_native(
        "GraffitiTab",
        native_options,
        Box::new(move |cc| Ok(Box::new(GraffitiApp::new(cc, config, page)?))),
    )
}

// The overlay is driven by the browser host on the web; there is no
// standalone entry point there.
#[cfg(target_arch = "wasm32")]
fn main() {}
