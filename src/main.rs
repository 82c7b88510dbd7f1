mod app;
mod breathing;
mod config;
mod errors;
mod journal_entry;
mod journal_state;
mod quote;
mod store;
mod ui;
mod wizard;

use crate::app::App;
use crate::config::AppConfig;
use crate::journal_state::Journal;
use crate::quote::HttpQuoteService;
use crate::store::JsonFileStore;
use crate::ui::UI;
use crate::wizard::Wizard;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (cfg, config_error) = match AppConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_logging(&cfg)?;
    if let Some(e) = config_error {
        warn!(error = %e, "configuration invalid, using defaults");
    }

    let store = JsonFileStore::new(cfg.data_file_or_default());
    info!(path = %store.path().display(), "journal file");
    let journal = Journal::load(Box::new(store));

    let quotes = HttpQuoteService::new(cfg.quote_url_or_default(), cfg.quote_timeout())?;
    let (wizard, events) = Wizard::new(
        Arc::new(quotes),
        cfg.breath_interval(),
        cfg.date_format_or_default(),
    );

    let mut ui = UI::new()?;
    App::new(journal, wizard).run(&mut ui, events).await
}

fn init_logging(cfg: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(cfg.log_file_or_default())?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}
