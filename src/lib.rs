pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::{AppConfig, StoreConfig};
use crate::core::holding::HoldingForm;
use crate::core::i18n::Language;
use crate::core::local::LocalCache;
use crate::core::resolver::PriceResolver;
use crate::core::state::AppState;
use crate::core::store::HoldingStore;
use crate::providers::{estimate::EstimateProvider, gold_api::GoldApiProvider, scrape};
use crate::store::{disk::DiskCollection, local::LocalHoldingStore, remote::RestHoldingStore};
use anyhow::{Context, Result};
use fjall::Keyspace;
use std::sync::Arc;
use tracing::{debug, info};

const HOLDINGS_PARTITION: &str = "holdings";
const LOCAL_PARTITION: &str = "local";

pub enum AppCommand {
    Summary,
    Prices,
    Watch,
    Add(HoldingForm),
    Edit { id: String, form: HoldingForm },
    Remove { id: String },
    /// `None` toggles the current language.
    Language(Option<Language>),
}

/// Builds the price chain from configuration: gold API, then scrape, then estimate.
pub fn build_resolver(config: &AppConfig) -> Result<PriceResolver> {
    let fallback = EstimateProvider::new(config.providers.estimate)
        .context("Invalid estimate configuration")?;
    let mut resolver = PriceResolver::new(fallback);

    if let Some(api) = &config.providers.gold_api {
        resolver = resolver.with_tier(GoldApiProvider::new(
            api,
            &config.currency,
            config.request_timeout(),
        )?);
    }
    if let Some(scrape_config) = &config.providers.scrape {
        let profile = scrape::select_profile(scrape_config)?;
        resolver = resolver.with_tier(scrape::ScrapeProvider::new(
            profile,
            config.request_timeout(),
        )?);
    }

    debug!(tiers = ?resolver.tier_names(), "Price sources configured");
    Ok(resolver)
}

fn build_store(config: &AppConfig, keyspace: &Keyspace) -> Result<Arc<dyn HoldingStore>> {
    let store: Arc<dyn HoldingStore> = match &config.store {
        StoreConfig::Local => Arc::new(LocalHoldingStore::new(Arc::new(DiskCollection::open(
            keyspace,
            HOLDINGS_PARTITION,
        )?))),
        StoreConfig::Remote(remote) => {
            Arc::new(RestHoldingStore::new(remote, config.request_timeout())?)
        }
    };
    Ok(store)
}

async fn build_state(config: &AppConfig) -> Result<Arc<AppState>> {
    let keyspace = store::open_keyspace(&config.data_path()?)?;
    let store = build_store(config, &keyspace)?;
    let local = LocalCache::new(Arc::new(DiskCollection::open(&keyspace, LOCAL_PARTITION)?));
    let resolver = build_resolver(config)?;
    Ok(AppState::new(store, resolver, local, config.language).await)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Gold tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let state = build_state(&config).await?;

    match command {
        AppCommand::Summary => cli::summary::run(&state, &config).await,
        AppCommand::Prices => cli::prices::run(&state, &config).await,
        AppCommand::Watch => cli::watch::run(&state, &config).await,
        AppCommand::Add(form) => cli::holdings::add(&state, form).await,
        AppCommand::Edit { id, form } => cli::holdings::edit(&state, &id, form).await,
        AppCommand::Remove { id } => cli::holdings::remove(&state, &id).await,
        AppCommand::Language(language) => cli::language::run(&state, language).await,
    }
}
