//! Ordered fallback chain over price sources.

use crate::core::price::{EstimateSource, PriceQuote, PriceSource};
use tracing::{debug, info, warn};

/// Resolves a quote by trying each tier in order and falling back to an estimate.
pub struct PriceResolver {
    tiers: Vec<Box<dyn PriceSource>>,
    fallback: Box<dyn EstimateSource>,
}

impl PriceResolver {
    pub fn new(fallback: impl EstimateSource + 'static) -> Self {
        Self {
            tiers: Vec::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Appends a tier; tiers are tried in the order they are added.
    pub fn with_tier(mut self, source: impl PriceSource + 'static) -> Self {
        self.tiers.push(Box::new(source));
        self
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    /// Never fails: the estimate tier terminates the chain.
    pub async fn resolve(&self) -> PriceQuote {
        for tier in &self.tiers {
            debug!(source = tier.name(), "Trying price source");
            match tier.fetch_quote().await {
                Ok(quote) if quote.is_usable() => {
                    if !quote.is_purity_consistent() {
                        warn!(
                            source = tier.name(),
                            k21 = quote.price_per_gram_21,
                            k24 = quote.price_per_gram_24,
                            "24K price is below 21K price"
                        );
                    }
                    info!(
                        source = tier.name(),
                        k21 = quote.price_per_gram_21,
                        k24 = quote.price_per_gram_24,
                        "Resolved gold prices"
                    );
                    return quote;
                }
                Ok(quote) => {
                    warn!(
                        source = tier.name(),
                        k21 = quote.price_per_gram_21,
                        k24 = quote.price_per_gram_24,
                        "Price source returned unusable prices, falling back"
                    );
                }
                Err(e) => {
                    warn!(source = tier.name(), error = %e, "Price source failed, falling back");
                }
            }
        }

        let quote = self.fallback.estimate();
        info!(
            k21 = quote.price_per_gram_21,
            k24 = quote.price_per_gram_24,
            "All price sources failed, using estimated prices"
        );
        quote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::QuoteSource;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        name: &'static str,
        result: Option<(f64, f64)>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedSource {
        fn ok(name: &'static str, k21: f64, k24: f64, calls: &Arc<AtomicUsize>) -> Self {
            Self {
                name,
                result: Some((k21, k24)),
                calls: Arc::clone(calls),
            }
        }

        fn failing(name: &'static str, calls: &Arc<AtomicUsize>) -> Self {
            Self {
                name,
                result: None,
                calls: Arc::clone(calls),
            }
        }
    }

    #[async_trait]
    impl PriceSource for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_quote(&self) -> Result<PriceQuote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Some((k21, k24)) => Ok(PriceQuote::new(k21, k24, QuoteSource::Api)),
                None => Err(anyhow!("{} unreachable", self.name)),
            }
        }
    }

    struct FixedEstimate;

    impl EstimateSource for FixedEstimate {
        fn estimate(&self) -> PriceQuote {
            PriceQuote::new(3700.0, 4200.0, QuoteSource::Estimate)
        }
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let resolver = PriceResolver::new(FixedEstimate)
            .with_tier(FixedSource::ok("api", 4000.0, 4571.0, &first))
            .with_tier(FixedSource::ok("scrape", 1.0, 1.0, &second));

        let quote = resolver.resolve().await;
        assert_eq!(quote.price_per_gram_21, 4000.0);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_falls_through_once_per_tier() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let resolver = PriceResolver::new(FixedEstimate)
            .with_tier(FixedSource::failing("api", &first))
            .with_tier(FixedSource::ok("scrape", 3800.0, 4340.0, &second));

        let quote = resolver.resolve().await;
        assert_eq!(quote.price_per_gram_24, 4340.0);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unusable_quote_falls_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = PriceResolver::new(FixedEstimate)
            .with_tier(FixedSource::ok("api", 0.0, 0.0, &calls));

        let quote = resolver.resolve().await;
        assert_eq!(quote.source, QuoteSource::Estimate);
    }

    #[tokio::test]
    async fn test_all_tiers_failing_returns_estimate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = PriceResolver::new(FixedEstimate)
            .with_tier(FixedSource::failing("api", &calls))
            .with_tier(FixedSource::failing("scrape", &calls));

        let quote = resolver.resolve().await;
        assert_eq!(quote.source, QuoteSource::Estimate);
        assert!(quote.is_usable());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.tier_names(), vec!["api", "scrape"]);
    }

    #[tokio::test]
    async fn test_inconsistent_quote_is_accepted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = PriceResolver::new(FixedEstimate)
            .with_tier(FixedSource::ok("scrape", 4300.0, 4200.0, &calls));

        let quote = resolver.resolve().await;
        assert_eq!(quote.price_per_gram_21, 4300.0);
        assert_eq!(quote.source, QuoteSource::Api);
    }
}
