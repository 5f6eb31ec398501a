mod app;
mod color;
mod config;
mod marker;
mod platform;
mod storage;
mod tray;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use eframe::egui;
use tracing::Level as TraceLevel;
use tracing_subscriber::FmtSubscriber;

/// Log to `logs.txt` in the working directory, falling back to stderr if the
/// file cannot be opened. Level comes from the LOG_LEVEL environment
/// variable.
fn init_logging() {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let result = match OpenOptions::new().create(true).append(true).open("logs.txt") {
        Ok(file) => tracing::subscriber::set_global_default(
            FmtSubscriber::builder()
                .with_max_level(log_level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish(),
        ),
        Err(e) => {
            eprintln!("could not open log file, logging to stderr: {e}");
            tracing::subscriber::set_global_default(
                FmtSubscriber::builder().with_max_level(log_level).finish(),
            )
        }
    };
    if let Err(e) = result {
        eprintln!("failed to install logging: {e}");
    }
}

fn main() -> eframe::Result<()> {
    init_logging();

    // Load settings before the window exists; defaults on missing/corrupt
    // file.
    let settings = storage::load();

    // Shared visibility flag, toggled from the tray event thread.
    let visible = Arc::new(Mutex::new(true));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config::WINDOW_SIZE, config::WINDOW_SIZE])
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_taskbar(false)
            .with_always_on_top(),
        ..Default::default()
    };

    eframe::run_native(
        platform::WINDOW_TITLE,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(app::CrosshairApp::new(
                settings,
                Arc::clone(&visible),
            )))
        }),
    )
}
