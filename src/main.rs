mod app;
mod config;
mod geo;
mod geocode;
mod graticule;
mod map_view;
mod marker;
mod measure;
mod search;
mod toast;
mod ui;

use std::sync::Arc;

use app::MapDistanceApp;
use clap::Parser;
use config::AppConfig;
use geocode::NominatimGeocoder;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "invalid configuration");
        std::process::exit(2);
    }

    let geocoder = match NominatimGeocoder::new(
        &config.geocoder_url,
        &config.user_agent,
        config.geocoder_timeout(),
    ) {
        Ok(geocoder) => geocoder,
        Err(err) => {
            tracing::error!(error = %err, "could not set up the geocoder");
            std::process::exit(2);
        }
    };

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(1280.0, 800.0)),
        min_window_size: Some(egui::vec2(480.0, 400.0)),
        ..Default::default()
    };

    eframe::run_native(
        "Map Distance",
        native_options,
        Box::new(move |cc| Box::new(MapDistanceApp::new(cc, &config, Arc::new(geocoder)))),
    )
}
