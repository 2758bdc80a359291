use crate::core::config::GoldApiConfig;
use crate::core::holding::PurityGrade;
use crate::core::price::{PriceQuote, PriceSource, QuoteSource};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct GoldApiResponse {
    status: Option<String>,
    data: Option<MetalPrices>,
    metal_prices: Option<HashMap<String, MetalPrice>>,
}

#[derive(Debug, Deserialize)]
struct MetalPrices {
    metal_prices: Option<HashMap<String, MetalPrice>>,
}

#[derive(Debug, Deserialize)]
struct MetalPrice {
    price_24k: Option<f64>,
}

/// Returns the 24K per-gram price if the payload is one we can trust.
///
/// `status`, when present, must read "success"; the price table may sit at the
/// top level or under `data`.
fn usable_price_24k(payload: &GoldApiResponse) -> Option<f64> {
    if let Some(status) = &payload.status
        && !status.eq_ignore_ascii_case("success")
    {
        return None;
    }

    let prices = payload
        .data
        .as_ref()
        .and_then(|d| d.metal_prices.as_ref())
        .or(payload.metal_prices.as_ref())?;

    prices
        .get("XAU")
        .and_then(|xau| xau.price_24k)
        .filter(|price| price.is_finite() && *price > 0.0)
}

/// Primary tier: spot gold per gram from a market-data API.
pub struct GoldApiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    currency: String,
}

impl GoldApiProvider {
    pub fn new(config: &GoldApiConfig, currency: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("goldtrack/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            currency: currency.to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for GoldApiProvider {
    fn name(&self) -> &str {
        "gold-api"
    }

    #[instrument(name = "GoldApiFetch", skip(self), fields(currency = %self.currency))]
    async fn fetch_quote(&self) -> Result<PriceQuote> {
        let url = format!(
            "{}/v1/latest?metals=XAU&base_currency={}&weight_unit=gram",
            self.base_url, self.currency
        );
        debug!("Requesting gold price from {}", url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} from gold price API", response.status()));
        }

        let text = response.text().await?;
        let payload: GoldApiResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse gold price API response: {}", e))?;
        debug!(payload = ?payload, "Received gold price API response");

        let price_24 = usable_price_24k(&payload)
            .ok_or_else(|| anyhow!("Gold price API response has no usable 24K price"))?;

        // 21K derives from the rounded 24K
        let k24 = price_24.round();
        let k21 = (k24 * PurityGrade::K21.purity_ratio()).round();
        Ok(PriceQuote::new(k21, k24, QuoteSource::Api))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/latest"))
            .and(query_param("metals", "XAU"))
            .and(query_param("base_currency", "EGP"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(server: &MockServer) -> GoldApiProvider {
        let config = GoldApiConfig {
            base_url: server.uri(),
            api_key: "test-key".to_string(),
        };
        GoldApiProvider::new(&config, "EGP", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_fetch_derives_21k() {
        let body = r#"{
            "status": "success",
            "data": {
                "base_currency": "EGP",
                "metal_prices": { "XAU": { "price": 148000.0, "price_24k": 4800.4 } }
            }
        }"#;
        let server = create_mock_server(200, body).await;

        let quote = provider(&server).fetch_quote().await.unwrap();
        assert_eq!(quote.price_per_gram_24, 4800.0);
        assert_eq!(quote.price_per_gram_21, 4200.0);
        assert_eq!(quote.source, QuoteSource::Api);
    }

    #[tokio::test]
    async fn test_21k_derives_from_rounded_24k() {
        let body = r#"{"status": "success", "data": {"metal_prices": {"XAU": {"price_24k": 4800.5}}}}"#;
        let server = create_mock_server(200, body).await;

        let quote = provider(&server).fetch_quote().await.unwrap();
        assert_eq!(quote.price_per_gram_24, 4801.0);
        // 4801 * 21 / 24 = 4200.875
        assert_eq!(quote.price_per_gram_21, 4201.0);
    }

    #[tokio::test]
    async fn test_top_level_price_table_is_accepted() {
        let body = r#"{"metal_prices": {"XAU": {"price_24k": 4571.0}}}"#;
        let server = create_mock_server(200, body).await;

        let quote = provider(&server).fetch_quote().await.unwrap();
        assert_eq!(quote.price_per_gram_24, 4571.0);
        assert_eq!(quote.price_per_gram_21, 4000.0);
    }

    #[tokio::test]
    async fn test_error_status_in_payload_is_failure() {
        let body = r#"{"status": "error", "data": {"metal_prices": {"XAU": {"price_24k": 4571.0}}}}"#;
        let server = create_mock_server(200, body).await;

        let err = provider(&server).fetch_quote().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Gold price API response has no usable 24K price"
        );
    }

    #[tokio::test]
    async fn test_missing_or_zero_price_is_failure() {
        let server = create_mock_server(200, r#"{"status": "success", "data": {}}"#).await;
        assert!(provider(&server).fetch_quote().await.is_err());

        let server = create_mock_server(
            200,
            r#"{"status": "success", "data": {"metal_prices": {"XAU": {"price_24k": 0}}}}"#,
        )
        .await;
        assert!(provider(&server).fetch_quote().await.is_err());
    }

    #[tokio::test]
    async fn test_http_error_is_failure() {
        let server = create_mock_server(401, r#"{"message": "invalid key"}"#).await;
        let err = provider(&server).fetch_quote().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "HTTP error: 401 Unauthorized from gold price API"
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_failure() {
        let server = create_mock_server(200, "<html>maintenance</html>").await;
        let err = provider(&server).fetch_quote().await.unwrap_err();
        assert!(
            err.to_string()
                .contains("Failed to parse gold price API response")
        );
    }
}
