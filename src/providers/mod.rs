pub mod estimate;
pub mod gold_api;
pub mod scrape;
