//! Secondary tier: prices read out of a market-information page.
//!
//! Each page is described by a [`ScrapeProfile`]: the URL and the label text
//! that precedes each price cell. Extraction never hard-codes labels.

use crate::core::config::{ScrapeConfig, ScrapeProfile};
use crate::core::price::{PriceQuote, PriceSource, QuoteSource};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_PROFILE: &str = "gold-era-egypt";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Profiles available without any configuration.
pub fn builtin_profiles() -> Vec<ScrapeProfile> {
    vec![ScrapeProfile {
        id: DEFAULT_PROFILE.to_string(),
        url: "https://egypt.gold-era.com/gold-price/".to_string(),
        label_24k: "24 قيراط".to_string(),
        label_21k: "21 قيراط".to_string(),
        thousands_separator: ',',
    }]
}

/// Picks the profile named by `config.source`; configured profiles shadow
/// built-ins with the same id.
pub fn select_profile(config: &ScrapeConfig) -> Result<ScrapeProfile> {
    let mut profile = config
        .profiles
        .iter()
        .cloned()
        .chain(builtin_profiles())
        .find(|p| p.id == config.source)
        .ok_or_else(|| anyhow!("Unknown scrape source: {}", config.source))?;
    if let Some(url) = &config.url {
        profile.url = url.clone();
    }
    Ok(profile)
}

/// Matches `<label></td> <td ...>NUMBER` for one label.
struct LabelPattern {
    regex: Regex,
    separator: char,
}

impl LabelPattern {
    fn new(label: &str, separator: char) -> Result<Self> {
        let sep = regex::escape(&separator.to_string());
        let pattern = format!(
            r"{}\s*</td>\s*<td[^>]*>\s*(\d[\d{}]*(?:\.\d+)?)",
            regex::escape(label),
            sep
        );
        let regex = Regex::new(&pattern)
            .with_context(|| format!("Invalid scrape pattern for label: {label}"))?;
        Ok(Self { regex, separator })
    }

    fn extract(&self, html: &str) -> Option<f64> {
        let raw = self.regex.captures(html)?.get(1)?.as_str();
        let digits: String = raw.chars().filter(|c| *c != self.separator).collect();
        digits.parse::<f64>().ok().filter(|price| *price > 0.0)
    }
}

pub struct ScrapeProvider {
    client: Client,
    profile: ScrapeProfile,
    k24: LabelPattern,
    k21: LabelPattern,
}

impl ScrapeProvider {
    pub fn new(profile: ScrapeProfile, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        let k24 = LabelPattern::new(&profile.label_24k, profile.thousands_separator)?;
        let k21 = LabelPattern::new(&profile.label_21k, profile.thousands_separator)?;
        Ok(Self {
            client,
            profile,
            k24,
            k21,
        })
    }

    fn parse(&self, html: &str) -> Result<PriceQuote> {
        let k24 = self
            .k24
            .extract(html)
            .ok_or_else(|| anyhow!("Could not find 24K price on {}", self.profile.url))?;
        let k21 = self
            .k21
            .extract(html)
            .ok_or_else(|| anyhow!("Could not find 21K price on {}", self.profile.url))?;
        debug!(k24, k21, "Scraped prices");
        Ok(PriceQuote::new(k21, k24, QuoteSource::Scrape))
    }
}

#[async_trait]
impl PriceSource for ScrapeProvider {
    fn name(&self) -> &str {
        &self.profile.id
    }

    #[instrument(name = "ScrapeFetch", skip(self), fields(source = %self.profile.id))]
    async fn fetch_quote(&self) -> Result<PriceQuote> {
        debug!("Requesting price page from {}", self.profile.url);

        let response = self
            .client
            .get(&self.profile.url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, self.profile.url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for {}",
                response.status(),
                self.profile.url
            ));
        }

        let html = response.text().await?;
        self.parse(&html)
    }
}
