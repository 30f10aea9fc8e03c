//! Shipment lifecycle error types.

use common::{InventoryItemId, ShipmentId};
use domain::TransitionError;
use ledger::LedgerError;
use store::StoreError;
use thiserror::Error;

/// A line item that failed outbound stock validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortage {
    pub inventory_item_id: InventoryItemId,
    pub name: String,
    pub requested: u32,
    pub available: u32,
}

impl std::fmt::Display for StockShortage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (requested {}, available {})",
            self.name, self.requested, self.available
        )
    }
}

/// Errors raised by the shipment lifecycle service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShipmentError {
    /// The shipment does not exist for this company.
    #[error("shipment not found: {0}")]
    NotFound(ShipmentId),

    /// A line references an item that does not exist for this company.
    #[error("unknown inventory item: {0}")]
    UnknownItem(InventoryItemId),

    /// A line carries a zero quantity.
    #[error("quantity must be positive for item {0}")]
    ZeroQuantity(InventoryItemId),

    /// One or more lines exceed available stock. Itemized; rejected
    /// before any mutation is attempted.
    #[error("insufficient stock: {}", format_shortages(.shortages))]
    InsufficientStock { shortages: Vec<StockShortage> },

    /// The requested status change is illegal for the current status.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A repository operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn format_shortages(shortages: &[StockShortage]) -> String {
    shortages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_lists_every_shortage() {
        let err = ShipmentError::InsufficientStock {
            shortages: vec![
                StockShortage {
                    inventory_item_id: InventoryItemId::new(),
                    name: "Widget".to_string(),
                    requested: 12,
                    available: 10,
                },
                StockShortage {
                    inventory_item_id: InventoryItemId::new(),
                    name: "Gadget".to_string(),
                    requested: 3,
                    available: 0,
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("Widget (requested 12, available 10)"));
        assert!(message.contains("Gadget (requested 3, available 0)"));
    }
}
