//! Pricing abstractions and core types

use crate::core::holding::PurityGrade;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Per-gram price for 21K gold used until a real quote is resolved.
pub const DEFAULT_PRICE_21K: f64 = 3700.0;
/// Per-gram price for 24K gold used until a real quote is resolved.
pub const DEFAULT_PRICE_24K: f64 = 4200.0;

/// Where a quote came from, most trustworthy first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    Api,
    Scrape,
    Estimate,
    Default,
}

impl Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                QuoteSource::Api => "market API",
                QuoteSource::Scrape => "market page",
                QuoteSource::Estimate => "estimate",
                QuoteSource::Default => "default",
            }
        )
    }
}

/// A timestamped pair of per-gram prices in the local currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price_per_gram_21: f64,
    pub price_per_gram_24: f64,
    pub resolved_at: DateTime<Utc>,
    pub source: QuoteSource,
}

impl PriceQuote {
    pub fn new(price_per_gram_21: f64, price_per_gram_24: f64, source: QuoteSource) -> Self {
        Self {
            price_per_gram_21,
            price_per_gram_24,
            resolved_at: Utc::now(),
            source,
        }
    }

    /// Placeholder quote shown before anything has been resolved.
    pub fn placeholder() -> Self {
        Self::new(DEFAULT_PRICE_21K, DEFAULT_PRICE_24K, QuoteSource::Default)
    }

    pub fn price_for(&self, purity: PurityGrade) -> f64 {
        match purity {
            PurityGrade::K24 => self.price_per_gram_24,
            PurityGrade::K21 => self.price_per_gram_21,
        }
    }

    pub fn is_usable(&self) -> bool {
        [self.price_per_gram_21, self.price_per_gram_24]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }

    /// 24K is purer, so it is expected (not required) to cost at least as much as 21K.
    pub fn is_purity_consistent(&self) -> bool {
        self.price_per_gram_24 >= self.price_per_gram_21
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.resolved_at
    }
}

/// A price tier that may fail.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_quote(&self) -> Result<PriceQuote>;
}

/// The last tier of the resolver; always yields a quote.
pub trait EstimateSource: Send + Sync {
    fn estimate(&self) -> PriceQuote;
}
