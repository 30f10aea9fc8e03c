//! Ledger error types.

use common::{InventoryItemId, ShipmentId};
use domain::StockError;
use store::StoreError;
use thiserror::Error;

/// Errors raised by the inventory and reservation ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The inventory item does not exist for this company.
    #[error("unknown inventory item: {0}")]
    ItemNotFound(InventoryItemId),

    /// A stock counter would have gone negative.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// No active reservation exists for the (item, shipment) pair.
    #[error("no active reservation for item {item_id} on shipment {shipment_id}")]
    NoActiveReservation {
        item_id: InventoryItemId,
        shipment_id: ShipmentId,
    },

    /// No fulfilled reservation exists for the (item, shipment) pair.
    #[error("no fulfilled reservation for item {item_id} on shipment {shipment_id}")]
    NoFulfilledReservation {
        item_id: InventoryItemId,
        shipment_id: ShipmentId,
    },

    /// The repository rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
