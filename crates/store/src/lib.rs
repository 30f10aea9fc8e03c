//! Persistence collaborator seam.
//!
//! Repository traits for the four row kinds the coordinator touches, plus
//! in-memory implementations. Every method is scoped by [`common::CompanyId`]:
//! a read against the wrong tenant resolves to absent and a write against
//! the wrong tenant fails, so cross-tenant access is rejected at the data
//! layer rather than filtered afterwards.

mod error;
mod memory;
mod repository;

pub use error::{Result, StoreError};
pub use memory::{
    InMemoryActivityLogRepository, InMemoryInventoryRepository, InMemoryReservationRepository,
    InMemoryShipmentRepository,
};
pub use repository::{
    ActivityLogRepository, InventoryRepository, ReservationRepository, ShipmentRepository,
};
