//! Shipment lifecycle service.
//!
//! Orchestrates the inventory ledger, reservation ledger, and activity log
//! to create shipments and drive their status forward. Every mutating
//! operation runs inside the saga coordinator: each step registers its
//! compensating action right after it succeeds, so a failure later in the
//! operation unwinds everything that already happened.

pub mod error;
pub mod service;

pub use error::{ShipmentError, StockShortage};
pub use service::{NewShipment, NewShipmentItem, ShipmentService};
