//! Client-side durable state: last resolved quote and language preference.

use crate::core::cache::KeyValueCollection;
use crate::core::i18n::Language;
use crate::core::price::PriceQuote;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

const QUOTE_KEY: &[u8] = b"gold_prices";
const LANGUAGE_KEY: &[u8] = b"language";

/// Failures here are logged and otherwise ignored; the cache is a convenience.
#[derive(Clone)]
pub struct LocalCache {
    collection: Arc<dyn KeyValueCollection>,
}

impl LocalCache {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self { collection }
    }

    pub async fn load_quote(&self) -> Option<PriceQuote> {
        self.load(QUOTE_KEY).await
    }

    pub async fn save_quote(&self, quote: &PriceQuote) {
        self.save(QUOTE_KEY, quote).await
    }

    pub async fn load_language(&self) -> Option<Language> {
        self.load(LANGUAGE_KEY).await
    }

    pub async fn save_language(&self, language: Language) {
        self.save(LANGUAGE_KEY, &language).await
    }

    async fn load<T: DeserializeOwned>(&self, key: &[u8]) -> Option<T> {
        let bytes = match self.collection.get(key).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(error = %e, "Failed to read local cache");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    key = %String::from_utf8_lossy(key),
                    error = %e,
                    "Ignoring unreadable local cache entry"
                );
                None
            }
        }
    }

    async fn save<T: Serialize>(&self, key: &[u8], value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to encode local cache entry");
                return;
            }
        };
        if let Err(e) = self.collection.put(key, &bytes).await {
            warn!(error = %e, "Failed to write local cache");
            return;
        }
        debug!(key = %String::from_utf8_lossy(key), "Saved local cache entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::QuoteSource;
    use crate::store::memory::MemoryCollection;

    #[tokio::test]
    async fn test_quote_and_language_round_trip() {
        let cache = LocalCache::new(Arc::new(MemoryCollection::new()));
        assert!(cache.load_quote().await.is_none());
        assert!(cache.load_language().await.is_none());

        let quote = PriceQuote::new(3712.0, 4242.0, QuoteSource::Scrape);
        cache.save_quote(&quote).await;
        cache.save_language(Language::Ar).await;

        assert_eq!(cache.load_quote().await, Some(quote));
        assert_eq!(cache.load_language().await, Some(Language::Ar));
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_empty() {
        let collection = Arc::new(MemoryCollection::new());
        collection.put(QUOTE_KEY, b"{not json").await.unwrap();

        let cache = LocalCache::new(collection);
        assert!(cache.load_quote().await.is_none());
    }
}
