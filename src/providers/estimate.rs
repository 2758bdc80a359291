//! Last tier: a plausible quote drawn from configured bands. Never fails.

use crate::core::config::{EstimateConfig, K24Estimate, PriceBand};
use crate::core::price::{EstimateSource, PriceQuote, QuoteSource};
use anyhow::{Result, bail};
use rand::Rng;
use tracing::debug;

pub struct EstimateProvider {
    config: EstimateConfig,
}

fn check_band(name: &str, band: &PriceBand) -> Result<()> {
    if band.min == 0 {
        bail!("Estimate band for {name} must start above zero");
    }
    if band.min > band.max {
        bail!(
            "Estimate band for {name} is empty: min {} > max {}",
            band.min,
            band.max
        );
    }
    Ok(())
}

impl EstimateProvider {
    /// Bands are checked here so that drawing later cannot panic.
    pub fn new(config: EstimateConfig) -> Result<Self> {
        check_band("21K", &config.k21)?;
        match &config.k24 {
            K24Estimate::Band(band) => check_band("24K", band)?,
            K24Estimate::Multiplier(m) if !(m.is_finite() && *m > 0.0) => {
                bail!("Estimate multiplier for 24K must be positive, got {m}")
            }
            K24Estimate::Multiplier(_) => {}
        }
        Ok(Self { config })
    }
}

impl EstimateSource for EstimateProvider {
    fn estimate(&self) -> PriceQuote {
        let mut rng = rand::thread_rng();
        let k21 = rng.gen_range(self.config.k21.min..=self.config.k21.max);
        let k24 = match self.config.k24 {
            K24Estimate::Band(band) => f64::from(rng.gen_range(band.min..=band.max)),
            K24Estimate::Multiplier(m) => (f64::from(k21) * m).round(),
        };
        debug!(k21, k24, "Drew estimated prices");
        PriceQuote::new(f64::from(k21), k24, QuoteSource::Estimate)
    }
}
