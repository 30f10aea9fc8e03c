//! Ledger services over the repository seam.
//!
//! The inventory ledger serializes all stock mutations per item and emits
//! activity-log entries for business-significant ones. The reservation
//! ledger binds inventory holds to shipments. Both are plain service
//! structs constructed with injected repositories; nothing here is a
//! process-wide singleton.

pub mod activity;
pub mod error;
pub mod inventory;
pub mod reservation;

pub use activity::ActivityRecorder;
pub use error::LedgerError;
pub use inventory::InventoryLedger;
pub use reservation::ReservationLedger;
