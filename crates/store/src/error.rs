use common::{InventoryItemId, ShipmentId};
use thiserror::Error;

/// Errors that can occur when interacting with a repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No row with this identifier exists for the requesting company.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The row exists but belongs to another company.
    #[error("{entity} {id} belongs to another company")]
    TenantMismatch { entity: &'static str, id: String },

    /// An active reservation already exists for this (item, shipment) pair.
    #[error("active reservation already exists for item {item_id} on shipment {shipment_id}")]
    DuplicateActiveReservation {
        item_id: InventoryItemId,
        shipment_id: ShipmentId,
    },

    /// The storage backend rejected the operation.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;
