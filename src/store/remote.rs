//! Holdings kept in a hosted Postgres table behind a PostgREST-style API.

use crate::core::config::RemoteStoreConfig;
use crate::core::holding::{
    GoldCategory, GoldHolding, HoldingId, HoldingPatch, NewHolding, PurityGrade,
};
use crate::core::store::{HoldingStore, StoreError};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// A row of the holdings table as it travels on the wire.
#[derive(Debug, Deserialize)]
struct HoldingRow {
    id: Uuid,
    #[serde(rename = "type")]
    category: GoldCategory,
    karat: PurityGrade,
    quantity: f64,
    purchase_price: f64,
    #[serde(default, deserialize_with = "date_or_timestamp")]
    purchase_date: Option<NaiveDate>,
    shop_name: Option<String>,
    company: Option<String>,
    production_cost: Option<f64>,
    cashback: Option<f64>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<HoldingRow> for GoldHolding {
    fn from(row: HoldingRow) -> Self {
        let text = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        GoldHolding {
            id: row.id,
            purity: row.karat,
            category: row.category,
            mass_grams: row.quantity,
            purchase_cost_total: row.purchase_price,
            purchase_date: row.purchase_date,
            shop_name: text(row.shop_name),
            company_name: text(row.company),
            production_cost: row.production_cost,
            production_cost_cashback: row.cashback,
            notes: text(row.notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insert or patch body; absent fields are left out entirely.
#[derive(Debug, Default, Serialize)]
struct HoldingRowWrite<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    category: Option<GoldCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    karat: Option<PurityGrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purchase_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shop_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    production_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cashback: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl<'a> HoldingRowWrite<'a> {
    fn insert(id: Uuid, holding: &'a NewHolding) -> Self {
        Self {
            id: Some(id),
            category: Some(holding.category),
            karat: Some(holding.purity),
            quantity: Some(holding.mass_grams),
            purchase_price: Some(holding.purchase_cost_total),
            purchase_date: holding.purchase_date,
            shop_name: holding.shop_name.as_deref(),
            company: holding.company_name.as_deref(),
            production_cost: holding.production_cost,
            cashback: holding.production_cost_cashback,
            notes: holding.notes.as_deref(),
            updated_at: None,
        }
    }

    fn patch(patch: &'a HoldingPatch, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            category: patch.category,
            karat: patch.purity,
            quantity: patch.mass_grams,
            purchase_price: patch.purchase_cost_total,
            purchase_date: patch.purchase_date,
            shop_name: patch.shop_name.as_deref(),
            company: patch.company_name.as_deref(),
            production_cost: patch.production_cost,
            cashback: patch.production_cost_cashback,
            notes: patch.notes.as_deref(),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error_description: Option<String>,
}

fn date_or_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .or_else(|_| DateTime::parse_from_rfc3339(&s).map(|dt| dt.date_naive()))
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
                })
                .map_err(serde::de::Error::custom)
        })
        .transpose()
}

pub struct RestHoldingStore {
    client: Client,
    endpoint: String,
    api_key: String,
    access_token: Option<String>,
}

impl RestHoldingStore {
    pub fn new(config: &RemoteStoreConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("goldtrack/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/rest/v1/{}",
                config.base_url.trim_end_matches('/'),
                config.table
            ),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
    }

    fn require_session(&self, action: &str) -> Result<(), StoreError> {
        if self.access_token.is_none() {
            return Err(StoreError::AuthRequired(format!(
                "sign in to {action} gold records"
            )));
        }
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message.or(body.error_description))
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });
        debug!(%status, %message, "Store rejected request");

        if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(StoreError::AuthRequired(message))
        } else {
            Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn rows(response: Response) -> Result<Vec<HoldingRow>, StoreError> {
        response
            .json::<Vec<HoldingRow>>()
            .await
            .map_err(|e| StoreError::Transport(format!("Malformed store response: {e}")))
    }
}

#[async_trait]
impl HoldingStore for RestHoldingStore {
    #[instrument(name = "RemoteList", skip(self))]
    async fn list(&self) -> Result<Vec<GoldHolding>, StoreError> {
        if self.access_token.is_none() {
            debug!("No access token configured; nobody is signed in");
            return Ok(Vec::new());
        }

        let url = format!("{}?select=*&order=created_at.desc", self.endpoint);
        debug!("Requesting holdings from {}", url);
        let response = self.send(self.request(Method::GET, &url)).await?;
        let holdings: Vec<GoldHolding> = Self::rows(response)
            .await?
            .into_iter()
            .map(GoldHolding::from)
            .collect();
        debug!("Received {} holdings", holdings.len());
        Ok(holdings)
    }

    #[instrument(name = "RemoteCreate", skip_all)]
    async fn create(&self, holding: NewHolding) -> Result<GoldHolding, StoreError> {
        holding.validate()?;
        self.require_session("add")?;

        let body = HoldingRowWrite::insert(Uuid::new_v4(), &holding);
        let response = self
            .send(
                self.request(Method::POST, &self.endpoint)
                    .header("Prefer", "return=representation")
                    .json(&body),
            )
            .await?;

        let created: GoldHolding = Self::rows(response)
            .await?
            .into_iter()
            .next()
            .map(GoldHolding::from)
            .ok_or_else(|| StoreError::Transport("Store returned no created row".to_string()))?;
        info!(id = %created.id, "Created holding");
        Ok(created)
    }

    #[instrument(name = "RemoteUpdate", skip(self, patch))]
    async fn update(&self, id: HoldingId, patch: HoldingPatch) -> Result<GoldHolding, StoreError> {
        patch.validate()?;
        self.require_session("update")?;

        let url = format!("{}?id=eq.{id}", self.endpoint);
        let body = HoldingRowWrite::patch(&patch, Utc::now());
        let response = self
            .send(
                self.request(Method::PATCH, &url)
                    .header("Prefer", "return=representation")
                    .json(&body),
            )
            .await?;

        let updated = Self::rows(response)
            .await?
            .into_iter()
            .next()
            .map(GoldHolding::from)
            .ok_or(StoreError::NotFound(id))?;
        info!(%id, "Updated holding");
        Ok(updated)
    }

    #[instrument(name = "RemoteDelete", skip(self))]
    async fn delete(&self, id: HoldingId) -> Result<(), StoreError> {
        self.require_session("delete")?;

        let url = format!("{}?id=eq.{id}", self.endpoint);
        let response = self
            .send(
                self.request(Method::DELETE, &url)
                    .header("Prefer", "return=representation"),
            )
            .await?;

        if Self::rows(response).await?.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        info!(%id, "Deleted holding");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TABLE_PATH: &str = "/rest/v1/gold_records";

    fn config(base_url: &str, access_token: Option<&str>) -> RemoteStoreConfig {
        RemoteStoreConfig {
            base_url: base_url.to_string(),
            api_key: "anon-key".to_string(),
            access_token: access_token.map(str::to_string),
            table: "gold_records".to_string(),
        }
    }

    fn store(server: &MockServer, access_token: Option<&str>) -> RestHoldingStore {
        RestHoldingStore::new(&config(&server.uri(), access_token), Duration::from_secs(5)).unwrap()
    }

    fn row(id: &str, karat: u8, quantity: f64, price: f64) -> serde_json::Value {
        json!({
            "id": id,
            "type": "Jewelry",
            "karat": karat,
            "quantity": quantity,
            "purchase_price": price,
            "purchase_date": "2024-02-10T00:00:00+00:00",
            "shop_name": "",
            "company": "Lazurde",
            "production_cost": null,
            "cashback": null,
            "notes": null,
            "created_at": "2024-02-10T12:30:00.123456+00:00",
            "updated_at": "2024-02-11T08:00:00+00:00"
        })
    }

    #[tokio::test]
    async fn test_list_maps_wire_columns() {
        let server = MockServer::start().await;
        let id = "5f0c6a8e-1b7e-4c0f-9d57-2f3f4a8c9b10";
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([row(id, 21, 10.0, 35000.0)])),
            )
            .mount(&server)
            .await;

        let holdings = store(&server, Some("user-token")).list().await.unwrap();
        assert_eq!(holdings.len(), 1);
        let holding = &holdings[0];
        assert_eq!(holding.id.to_string(), id);
        assert_eq!(holding.purity, PurityGrade::K21);
        assert_eq!(holding.category, GoldCategory::Jewelry);
        assert_eq!(holding.mass_grams, 10.0);
        assert_eq!(holding.purchase_cost_total, 35000.0);
        assert_eq!(holding.purchase_date, NaiveDate::from_ymd_opt(2024, 2, 10));
        assert!(holding.shop_name.is_none());
        assert_eq!(holding.company_name.as_deref(), Some("Lazurde"));
    }

    #[tokio::test]
    async fn test_list_without_session_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        assert!(store(&server, None).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_sends_snake_case_row() {
        let server = MockServer::start().await;
        let id = "0d8a1c52-7a3e-4f53-a0c4-6f3e2b1a9c77";
        Mock::given(method("POST"))
            .and(path(TABLE_PATH))
            .and(header("prefer", "return=representation"))
            .and(body_partial_json(json!({
                "type": "Jewelry",
                "karat": 24,
                "quantity": 5.0,
                "purchase_price": 21000.0,
                "company": "Lazurde"
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!([row(id, 24, 5.0, 21000.0)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut holding = NewHolding::new(PurityGrade::K24, GoldCategory::Jewelry, 5.0, 21000.0);
        holding.company_name = Some("Lazurde".to_string());
        let created = store(&server, Some("user-token")).create(holding).await.unwrap();
        assert_eq!(created.id.to_string(), id);
        assert_eq!(created.purity, PurityGrade::K24);
    }

    #[tokio::test]
    async fn test_mutations_require_session() {
        let server = MockServer::start().await;
        let store = store(&server, None);

        let result = store
            .create(NewHolding::new(PurityGrade::K21, GoldCategory::Coin, 8.0, 29000.0))
            .await;
        assert!(matches!(result, Err(StoreError::AuthRequired(_))));
        assert!(matches!(
            store.delete(Uuid::new_v4()).await,
            Err(StoreError::AuthRequired(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint"
            })))
            .mount(&server)
            .await;

        let err = store(&server, Some("user-token"))
            .create(NewHolding::new(PurityGrade::K21, GoldCategory::Coin, 8.0, 29000.0))
            .await
            .unwrap_err();
        match err {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key value violates unique constraint");
            }
            other => panic!("Expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_expired_token_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"message": "JWT expired"})),
            )
            .mount(&server)
            .await;

        let err = store(&server, Some("stale")).list().await.unwrap_err();
        assert_eq!(err.to_string(), "Authentication required: JWT expired");
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("PATCH"))
            .and(path(TABLE_PATH))
            .and(query_param("id", format!("eq.{id}")))
            .and(body_partial_json(json!({"notes": "gift"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let patch = HoldingPatch {
            notes: Some("gift".to_string()),
            ..Default::default()
        };
        let result = store(&server, Some("user-token")).update(id, patch).await;
        assert!(matches!(result, Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let server = MockServer::start().await;
        let id = "5f0c6a8e-1b7e-4c0f-9d57-2f3f4a8c9b10";
        Mock::given(method("DELETE"))
            .and(path(TABLE_PATH))
            .and(query_param("id", format!("eq.{id}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([row(id, 21, 1.0, 1.0)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        store(&server, Some("user-token"))
            .delete(id.parse().unwrap())
            .await
            .unwrap();
    }
}
