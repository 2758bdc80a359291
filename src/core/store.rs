//! Persistence boundary for holdings.

use crate::core::holding::{GoldHolding, HoldingId, HoldingPatch, NewHolding, ValidationError};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    #[error("Holding not found: {0}")]
    NotFound(HoldingId),

    /// The remote store refused the request; `message` is its own explanation.
    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid holding: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// CRUD over the signed-in user's holdings. Mutations return only after the
/// backing store acknowledges them.
#[async_trait]
pub trait HoldingStore: Send + Sync {
    /// All holdings, newest first.
    async fn list(&self) -> Result<Vec<GoldHolding>, StoreError>;

    async fn create(&self, holding: NewHolding) -> Result<GoldHolding, StoreError>;

    async fn update(&self, id: HoldingId, patch: HoldingPatch) -> Result<GoldHolding, StoreError>;

    async fn delete(&self, id: HoldingId) -> Result<(), StoreError>;
}
