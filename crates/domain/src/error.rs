//! Domain error types.

use thiserror::Error;

use crate::shipment::ShipmentStatus;

/// Errors raised by inventory stock arithmetic.
///
/// Stock counters never go negative: any mutation that would undershoot
/// fails without touching the item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// Not enough available stock for the requested quantity.
    #[error("insufficient available stock for {sku}: requested {requested}, available {available}")]
    InsufficientAvailable {
        sku: String,
        requested: u32,
        available: u32,
    },

    /// Not enough reserved stock for the requested quantity.
    #[error("insufficient reserved stock for {sku}: requested {requested}, reserved {reserved}")]
    InsufficientReserved {
        sku: String,
        requested: u32,
        reserved: u32,
    },
}

/// A shipment status transition rejected by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid shipment transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: ShipmentStatus,
    pub to: ShipmentStatus,
}
