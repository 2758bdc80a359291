//! Core domain: holdings, quotes, valuation and the seams to the outside world

pub mod cache;
pub mod config;
pub mod holding;
pub mod i18n;
pub mod local;
pub mod log;
pub mod price;
pub mod resolver;
pub mod state;
pub mod store;
pub mod valuation;

// Re-export main types for cleaner imports
pub use holding::{GoldCategory, GoldHolding, HoldingForm, HoldingId, PurityGrade};
pub use price::{EstimateSource, PriceQuote, PriceSource, QuoteSource};
pub use resolver::PriceResolver;
pub use state::AppState;
pub use store::{HoldingStore, StoreError};
