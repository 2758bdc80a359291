use super::prices;
use crate::core::config::AppConfig;
use crate::core::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Refreshes on the configured interval and prints every new quote until Ctrl-C.
pub async fn run(state: &Arc<AppState>, config: &AppConfig) -> Result<()> {
    let mut quotes = state.subscribe_quotes();
    let period = config.refresh_interval();
    info!(?period, "Watching gold prices");

    let handle = state.spawn_refresh_loop(period);
    let result = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping price watch");
                break signal.context("Failed to listen for Ctrl-C");
            }
            changed = quotes.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let quote = quotes.borrow_and_update().clone();
                let labels = state.language().await.labels();
                println!("{}", prices::refresh_notice(&quote, labels));
                println!("{}\n", prices::display_quote(&quote, labels, &config.currency));
            }
        }
    };
    handle.shutdown().await;
    result
}
