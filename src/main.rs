#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use schnizzle::util::logging::{self, ConsoleSink};
use schnizzle::{Config, SchnizzleApp};

fn main() -> eframe::Result<()> {
    // Log to stderr (if you run with `RUST_LOG=debug`) and to the console panel.
    let console = logging::init().unwrap_or_else(|err| {
        eprintln!("Console logging unavailable: {err}");
        ConsoleSink::new()
    });

    let config = Config::load().unwrap_or_else(|err| {
        log::error!("Ignoring configuration: {err}");
        Config::default()
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Schnizzle")
            .with_inner_size([1024.0, 720.0])
            .with_min_inner_size([480.0, 320.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Schnizzle",
        native_options,
        Box::new(move |cc| Ok(Box::new(SchnizzleApp::new(cc, config, console)?))),
    )
}
