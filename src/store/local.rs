use crate::core::cache::KeyValueCollection;
use crate::core::holding::{GoldHolding, HoldingId, HoldingPatch, NewHolding};
use crate::core::store::{HoldingStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Holdings kept in a local key-value collection as JSON, keyed by id.
pub struct LocalHoldingStore {
    collection: Arc<dyn KeyValueCollection>,
}

impl LocalHoldingStore {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self { collection }
    }

    async fn read(&self, id: HoldingId) -> Result<GoldHolding, StoreError> {
        let bytes = self
            .collection
            .get(id.to_string().as_bytes())
            .await
            .map_err(storage_error)?
            .ok_or(StoreError::NotFound(id))?;
        decode(&bytes)
    }

    async fn write(&self, holding: &GoldHolding) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(holding).map_err(storage_error)?;
        self.collection
            .put(holding.id.to_string().as_bytes(), &bytes)
            .await
            .map_err(storage_error)
    }
}

#[async_trait]
impl HoldingStore for LocalHoldingStore {
    async fn list(&self) -> Result<Vec<GoldHolding>, StoreError> {
        let mut holdings = self
            .collection
            .values()
            .await
            .map_err(storage_error)?
            .iter()
            .map(|bytes| decode(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        holdings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!("Loaded {} holdings from local store", holdings.len());
        Ok(holdings)
    }

    async fn create(&self, holding: NewHolding) -> Result<GoldHolding, StoreError> {
        holding.validate()?;
        let holding = holding.into_holding(Uuid::new_v4(), Utc::now());
        self.write(&holding).await?;
        info!(id = %holding.id, "Created holding");
        Ok(holding)
    }

    async fn update(&self, id: HoldingId, patch: HoldingPatch) -> Result<GoldHolding, StoreError> {
        patch.validate()?;
        let mut holding = self.read(id).await?;
        holding.apply(&patch, Utc::now());
        self.write(&holding).await?;
        info!(%id, "Updated holding");
        Ok(holding)
    }

    async fn delete(&self, id: HoldingId) -> Result<(), StoreError> {
        let removed = self
            .collection
            .remove(id.to_string().as_bytes())
            .await
            .map_err(storage_error)?;
        if !removed {
            return Err(StoreError::NotFound(id));
        }
        info!(%id, "Deleted holding");
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<GoldHolding, StoreError> {
    serde_json::from_slice(bytes).map_err(storage_error)
}

fn storage_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Storage(e.to_string())
}
