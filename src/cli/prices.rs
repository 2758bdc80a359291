use super::ui;
use crate::core::config::AppConfig;
use crate::core::i18n::Labels;
use crate::core::price::{PriceQuote, QuoteSource};
use crate::core::state::{AppState, RefreshOutcome};
use anyhow::Result;
use chrono::Local;

/// Two-line rendering of a quote: both prices, then source and time.
pub fn display_quote(quote: &PriceQuote, labels: &Labels, currency: &str) -> String {
    let prices = format!(
        "{}: {} {currency}/g   {}: {} {currency}/g",
        labels.k21,
        ui::style_text(
            &ui::format_amount(quote.price_per_gram_21),
            ui::StyleType::TotalValue
        ),
        labels.k24,
        ui::style_text(
            &ui::format_amount(quote.price_per_gram_24),
            ui::StyleType::TotalValue
        ),
    );
    let provenance = format!(
        "{}: {}   {}: {}",
        labels.source,
        quote.source,
        labels.last_updated,
        quote
            .resolved_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    );
    format!("{prices}\n{}", ui::style_text(&provenance, ui::StyleType::Subtle))
}

/// Message shown after a refresh, flagging estimates.
pub fn refresh_notice(quote: &PriceQuote, labels: &Labels) -> String {
    match quote.source {
        QuoteSource::Estimate | QuoteSource::Default => {
            ui::style_text(labels.using_estimated_prices, ui::StyleType::Warning)
        }
        QuoteSource::Api | QuoteSource::Scrape => {
            ui::style_text(labels.prices_updated, ui::StyleType::TotalLabel)
        }
    }
}

pub async fn run(state: &AppState, config: &AppConfig) -> Result<()> {
    let labels = state.language().await.labels();

    let pb = ui::new_spinner("Fetching gold prices...");
    let quote = match state.refresh_prices().await {
        RefreshOutcome::Updated(quote) => quote,
        RefreshOutcome::Skipped => state.quote(),
    };
    pb.finish_and_clear();

    println!("{}", refresh_notice(&quote, labels));
    println!("{}", display_quote(&quote, labels, &config.currency));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::i18n::Language;

    #[test]
    fn test_display_quote_shows_both_prices_and_source() {
        console::set_colors_enabled(false);
        let quote = PriceQuote::new(3712.0, 4242.0, QuoteSource::Scrape);
        let output = display_quote(&quote, Language::En.labels(), "EGP");
        assert!(output.contains("21K: 3,712.00 EGP/g"));
        assert!(output.contains("24K: 4,242.00 EGP/g"));
        assert!(output.contains("Source: market page"));
    }

    #[test]
    fn test_estimates_are_flagged() {
        console::set_colors_enabled(false);
        let labels = Language::En.labels();
        let estimate = PriceQuote::new(3700.0, 4200.0, QuoteSource::Estimate);
        assert_eq!(refresh_notice(&estimate, labels), "Using Estimated Prices");
        let api = PriceQuote::new(3700.0, 4200.0, QuoteSource::Api);
        assert_eq!(refresh_notice(&api, labels), "Prices Updated");
    }
}
