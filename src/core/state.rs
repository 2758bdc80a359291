//! Application state shared by every command: holdings, the current quote and
//! the display language.

use crate::core::holding::{GoldHolding, HoldingId, HoldingPatch, NewHolding};
use crate::core::i18n::Language;
use crate::core::local::LocalCache;
use crate::core::price::PriceQuote;
use crate::core::resolver::PriceResolver;
use crate::core::store::{HoldingStore, StoreError};
use crate::core::valuation::{PortfolioSummary, summarize};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Updated(PriceQuote),
    /// Another refresh was already running.
    Skipped,
}

pub struct AppState {
    store: Arc<dyn HoldingStore>,
    resolver: PriceResolver,
    local: LocalCache,
    holdings: RwLock<Vec<GoldHolding>>,
    quote: watch::Sender<PriceQuote>,
    language: RwLock<Language>,
    refreshing: AtomicBool,
}

/// Clears the in-flight flag when the refresh finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AppState {
    /// Reads the cached quote and language once; `default_language` applies only
    /// when nothing was cached.
    pub async fn new(
        store: Arc<dyn HoldingStore>,
        resolver: PriceResolver,
        local: LocalCache,
        default_language: Option<Language>,
    ) -> Arc<Self> {
        let quote = match local.load_quote().await {
            Some(quote) => {
                debug!(resolved_at = %quote.resolved_at, "Loaded cached gold prices");
                quote
            }
            None => PriceQuote::placeholder(),
        };
        let language = local
            .load_language()
            .await
            .or(default_language)
            .unwrap_or_default();

        let (quote, _) = watch::channel(quote);
        Arc::new(Self {
            store,
            resolver,
            local,
            holdings: RwLock::new(Vec::new()),
            quote,
            language: RwLock::new(language),
            refreshing: AtomicBool::new(false),
        })
    }

    pub async fn load_holdings(&self) -> Result<Vec<GoldHolding>, StoreError> {
        let holdings = self.store.list().await?;
        *self.holdings.write().await = holdings.clone();
        Ok(holdings)
    }

    pub async fn holdings(&self) -> Vec<GoldHolding> {
        self.holdings.read().await.clone()
    }

    /// Validates before anything reaches the store; local state changes only
    /// after the store acknowledges.
    pub async fn add_holding(&self, holding: NewHolding) -> Result<GoldHolding, StoreError> {
        holding.validate()?;
        let created = self.store.create(holding).await?;
        self.holdings.write().await.insert(0, created.clone());
        Ok(created)
    }

    pub async fn update_holding(
        &self,
        id: HoldingId,
        patch: HoldingPatch,
    ) -> Result<GoldHolding, StoreError> {
        patch.validate()?;
        let updated = self.store.update(id, patch).await?;
        let mut holdings = self.holdings.write().await;
        if let Some(slot) = holdings.iter_mut().find(|h| h.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete_holding(&self, id: HoldingId) -> Result<(), StoreError> {
        self.store.delete(id).await?;
        self.holdings.write().await.retain(|h| h.id != id);
        Ok(())
    }

    pub fn quote(&self) -> PriceQuote {
        self.quote.borrow().clone()
    }

    pub fn subscribe_quotes(&self) -> watch::Receiver<PriceQuote> {
        self.quote.subscribe()
    }

    pub async fn summary(&self) -> PortfolioSummary {
        let holdings = self.holdings.read().await;
        summarize(&holdings, &self.quote())
    }

    pub async fn language(&self) -> Language {
        *self.language.read().await
    }

    pub async fn set_language(&self, language: Language) {
        *self.language.write().await = language;
        self.local.save_language(language).await;
        info!(%language, "Language changed");
    }

    pub async fn switch_language(&self) -> Language {
        let next = self.language().await.toggle();
        self.set_language(next).await;
        next
    }

    /// Resolves a fresh quote unless a refresh is already in flight.
    pub async fn refresh_prices(&self) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Price refresh already in flight");
            return RefreshOutcome::Skipped;
        }
        let _in_flight = InFlight(&self.refreshing);

        let quote = self.resolver.resolve().await;
        self.local.save_quote(&quote).await;
        self.quote.send_replace(quote.clone());
        RefreshOutcome::Updated(quote)
    }

    /// Returns the current quote, refreshing first when it is older than
    /// `max_age` or is only the placeholder.
    pub async fn refresh_if_stale(&self, max_age: Duration) -> PriceQuote {
        let current = self.quote();
        let fresh = current.source != crate::core::price::QuoteSource::Default
            && current
                .age(Utc::now())
                .to_std()
                .is_ok_and(|age| age < max_age);
        if fresh {
            debug!("Cached gold prices are fresh");
            return current;
        }
        match self.refresh_prices().await {
            RefreshOutcome::Updated(quote) => quote,
            RefreshOutcome::Skipped => self.quote(),
        }
    }

    /// Refreshes immediately and then every `period` until the handle is shut down.
    pub fn spawn_refresh_loop(self: &Arc<Self>, period: Duration) -> RefreshHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let state = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("Price refresh loop stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let state = Arc::clone(&state);
                        tokio::spawn(async move {
                            if state.refresh_prices().await == RefreshOutcome::Skipped {
                                debug!("Timer tick skipped; previous refresh still running");
                            }
                        });
                    }
                }
            }
        });

        RefreshHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

pub struct RefreshHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stops the timer. A refresh already running is allowed to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!(error = %e, "Price refresh loop ended abnormally");
        }
    }
}
