mod app;
mod canvas;
mod color_grid;
mod config;
mod error;
mod form;
mod model;
mod results;
mod search;

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::SearchApp;
use crate::config::AppConfig;
use crate::search::MockBackend;

fn load_config() -> AppConfig {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: vbs-search [config.json]");
        std::process::exit(1);
    }
    let Some(arg) = args.get(1) else {
        return AppConfig::default();
    };
    match AppConfig::load(&PathBuf::from(arg)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

fn main() -> eframe::Result {
    let config = load_config();
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let backend = Arc::new(MockBackend::new(
        config.mock_latency(),
        config.mock_failure_rate,
    ));
    log::info!(
        "starting with mock backend ({} ms latency, {:.0}% failures)",
        config.mock_latency_ms,
        config.mock_failure_rate * 100.0
    );

    let title = "vbs-search";
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            let app = SearchApp::new(backend, &config).with_repaint(cc.egui_ctx.clone());
            Ok(Box::new(app))
        }),
    )
}
