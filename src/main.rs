mod app;
mod bubbles;
mod config;
mod gifts;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bubbles::ContainmentMode;
use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Configuration file; defaults to `gift-bubbles.toml` in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the pricing API.
    #[arg(long, env = "GIFT_BUBBLES_API_URL")]
    api_url: Option<String>,

    /// Serve built-in sample prices instead of calling the API.
    #[arg(long, env = "GIFT_BUBBLES_USE_MOCK")]
    mock: bool,

    #[arg(long)]
    containment: Option<ContainmentMode>,

    /// Log filter, e.g. `debug` or `gift_bubbles=trace`.
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(api_url) = &self.api_url {
            config.api.base_url.clone_from(api_url);
        }
        if self.mock {
            config.api.use_mock = true;
        }
        if let Some(containment) = self.containment {
            config.layout.containment = containment;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = args
        .log
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_owned());
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let working_dir = std::env::current_dir().context("failed to resolve working directory")?;
    let mut config = AppConfig::load(args.config.as_deref(), &working_dir)?;
    args.apply_to(&mut config);
    info!(
        api = %config.api.base_url,
        mock = config.api.use_mock,
        containment = %config.layout.containment,
        "starting gift bubbles"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gift Bubbles",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(app::GiftBubblesApp::new(cc, config)))
        }),
    )
    .map_err(|error| anyhow!("failed to run the UI: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_config() {
        let args = Args::try_parse_from([
            "gift-bubbles",
            "--api-url",
            "http://prices.test/api",
            "--mock",
            "--containment",
            "boundary-repel",
        ])
        .expect("parse args");

        let mut config = AppConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.api.base_url, "http://prices.test/api");
        assert!(config.api.use_mock);
        assert_eq!(config.layout.containment, ContainmentMode::BoundaryRepel);
    }

    #[test]
    fn unknown_containment_is_rejected() {
        assert!(Args::try_parse_from(["gift-bubbles", "--containment", "sideways"]).is_err());
    }
}
