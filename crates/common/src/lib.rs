//! Shared types used across the shipment coordinator crates.

mod types;

pub use types::{ActivityLogId, CompanyId, InventoryItemId, ReservationId, ShipmentId};
