//! Aggregate cost, market value and zakat eligibility of a set of holdings.

use crate::core::holding::{GoldHolding, PurityGrade};
use crate::core::price::PriceQuote;

/// Grams of 21K gold whose value sets the zakat threshold (nisab).
pub const NISAB_GRAMS: f64 = 85.0;
/// Share of the current value due as zakat.
pub const ZAKAT_RATE: f64 = 0.025;

/// Derived totals; recomputed on every read and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_purchase_cost: f64,
    pub total_current_value: f64,
    pub grams_21: f64,
    pub grams_24: f64,
    pub nisab_threshold: f64,
    pub levy_eligible: bool,
    /// Computed unconditionally; only meaningful when `levy_eligible`.
    pub levy_amount: f64,
}

impl PortfolioSummary {
    pub fn unrealized_gain(&self) -> f64 {
        self.total_current_value - self.total_purchase_cost
    }

    /// Gain as a percentage of cost; 0 when nothing was paid.
    pub fn unrealized_gain_pct(&self) -> f64 {
        if self.total_purchase_cost == 0.0 {
            return 0.0;
        }
        self.unrealized_gain() / self.total_purchase_cost * 100.0
    }
}

/// Values `holdings` at `quote`. Pure; inputs are assumed already validated.
pub fn summarize(holdings: &[GoldHolding], quote: &PriceQuote) -> PortfolioSummary {
    let mut total_purchase_cost = 0.0;
    let mut total_current_value = 0.0;
    let mut grams_21 = 0.0;
    let mut grams_24 = 0.0;

    for holding in holdings {
        total_purchase_cost += holding.purchase_cost_total;
        total_current_value += holding.mass_grams * quote.price_for(holding.purity);
        match holding.purity {
            PurityGrade::K21 => grams_21 += holding.mass_grams,
            PurityGrade::K24 => grams_24 += holding.mass_grams,
        }
    }

    let nisab_threshold = NISAB_GRAMS * quote.price_per_gram_21;

    PortfolioSummary {
        total_purchase_cost,
        total_current_value,
        grams_21,
        grams_24,
        nisab_threshold,
        levy_eligible: total_current_value >= nisab_threshold,
        levy_amount: total_current_value * ZAKAT_RATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holding::{GoldCategory, NewHolding};
    use crate::core::price::QuoteSource;
    use chrono::Utc;
    use uuid::Uuid;

    fn holding(purity: PurityGrade, grams: f64, cost: f64) -> GoldHolding {
        NewHolding::new(purity, GoldCategory::Jewelry, grams, cost)
            .into_holding(Uuid::new_v4(), Utc::now())
    }

    fn quote(k21: f64, k24: f64) -> PriceQuote {
        PriceQuote::new(k21, k24, QuoteSource::Api)
    }

    #[test]
    fn test_mixed_portfolio() {
        let holdings = vec![
            holding(PurityGrade::K21, 10.0, 35000.0),
            holding(PurityGrade::K24, 5.0, 21000.0),
        ];
        let summary = summarize(&holdings, &quote(3700.0, 4200.0));

        assert_eq!(summary.total_purchase_cost, 56000.0);
        assert_eq!(summary.total_current_value, 58000.0);
        assert_eq!(summary.nisab_threshold, 314500.0);
        assert!(!summary.levy_eligible);
        assert_eq!(summary.levy_amount, 1450.0);
        assert_eq!(summary.unrealized_gain(), 2000.0);
        assert_eq!(summary.grams_21, 10.0);
        assert_eq!(summary.grams_24, 5.0);
    }

    #[test]
    fn test_gain_percentage() {
        let holdings = vec![holding(PurityGrade::K21, 10.0, 40000.0)];
        let summary = summarize(&holdings, &quote(3700.0, 4200.0));
        assert_eq!(summary.unrealized_gain(), -3000.0);
        assert!((summary.unrealized_gain_pct() + 7.5).abs() < 1e-9);

        // Gifts carry no cost; the percentage is reported as zero
        let gift = vec![holding(PurityGrade::K24, 2.0, 0.0)];
        let summary = summarize(&gift, &quote(3700.0, 4200.0));
        assert_eq!(summary.unrealized_gain(), 8400.0);
        assert_eq!(summary.unrealized_gain_pct(), 0.0);
    }

    #[test]
    fn test_empty_portfolio() {
        let summary = summarize(&[], &quote(3700.0, 4200.0));
        assert_eq!(summary.total_purchase_cost, 0.0);
        assert_eq!(summary.total_current_value, 0.0);
        assert_eq!(summary.levy_amount, 0.0);
        assert!(!summary.levy_eligible);
    }

    #[test]
    fn test_exact_nisab_is_eligible() {
        let holdings = vec![holding(PurityGrade::K21, 85.0, 100.0)];
        let summary = summarize(&holdings, &quote(3700.0, 4200.0));
        assert_eq!(summary.total_current_value, summary.nisab_threshold);
        assert!(summary.levy_eligible);

        let below = vec![holding(PurityGrade::K21, 84.99, 100.0)];
        assert!(!summarize(&below, &quote(3700.0, 4200.0)).levy_eligible);
    }

    #[test]
    fn test_levy_amount_is_unconditional() {
        let holdings = vec![holding(PurityGrade::K24, 1.0, 4000.0)];
        let summary = summarize(&holdings, &quote(3700.0, 4200.0));
        assert!(!summary.levy_eligible);
        assert_eq!(summary.levy_amount, 4200.0 * ZAKAT_RATE);

        let holdings = vec![holding(PurityGrade::K24, 100.0, 400000.0)];
        let summary = summarize(&holdings, &quote(3700.0, 4200.0));
        assert!(summary.levy_eligible);
        assert_eq!(summary.levy_amount, 420000.0 * ZAKAT_RATE);
    }

    #[test]
    fn test_summaries_combine_over_concatenation() {
        let q = quote(3650.0, 4175.0);
        let left = vec![
            holding(PurityGrade::K21, 12.5, 40000.0),
            holding(PurityGrade::K24, 2.0, 8000.0),
        ];
        let right = vec![
            holding(PurityGrade::K24, 31.1, 120000.0),
            holding(PurityGrade::K21, 4.0, 0.0),
        ];
        let both: Vec<_> = left.iter().chain(right.iter()).cloned().collect();

        let l = summarize(&left, &q);
        let r = summarize(&right, &q);
        let combined = summarize(&both, &q);

        let close = |a: f64, b: f64| (a - b).abs() < 1e-6;
        assert!(close(
            combined.total_purchase_cost,
            l.total_purchase_cost + r.total_purchase_cost
        ));
        assert!(close(
            combined.total_current_value,
            l.total_current_value + r.total_current_value
        ));
        assert!(close(combined.levy_amount, l.levy_amount + r.levy_amount));
    }
}
