//! Domain layer: entities and pure state logic.
//!
//! Everything in this crate is synchronous and side-effect free. Stock
//! arithmetic, reservation status flips, and the shipment state machine
//! live here; persistence and orchestration live in the `store`, `ledger`,
//! and `shipments` crates.

pub mod activity;
pub mod error;
pub mod inventory;
pub mod reservation;
pub mod shipment;

pub use activity::{ActivityLog, ActivityReference, ActivityType};
pub use error::{StockError, TransitionError};
pub use inventory::InventoryItem;
pub use reservation::{Reservation, ReservationStatus};
pub use shipment::{MovementType, Shipment, ShipmentItem, ShipmentStatus};
