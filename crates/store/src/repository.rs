use async_trait::async_trait;
use common::{ActivityLogId, CompanyId, InventoryItemId, ShipmentId};
use domain::{ActivityLog, InventoryItem, Reservation, ReservationStatus, Shipment};

use crate::Result;

/// Row storage for inventory items.
///
/// All implementations must be thread-safe (Send + Sync) and must scope
/// every read and write by company id.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Inserts a new item row.
    async fn insert(&self, item: InventoryItem) -> Result<()>;

    /// Finds an item by id. Absent or owned by another company -> `None`.
    async fn find(&self, company_id: CompanyId, id: InventoryItemId)
    -> Result<Option<InventoryItem>>;

    /// Writes back a mutated item.
    ///
    /// Fails with `NotFound` if the row does not exist and with
    /// `TenantMismatch` if it belongs to another company.
    async fn save(&self, company_id: CompanyId, item: &InventoryItem) -> Result<()>;
}

/// Row storage for reservations.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Inserts a new reservation row.
    ///
    /// Fails with `DuplicateActiveReservation` if an active row already
    /// exists for the same (item, shipment) pair, enforcing the uniqueness
    /// the lookup-by-pair operations rely on.
    async fn insert(&self, reservation: Reservation) -> Result<()>;

    /// Finds the unique reservation with the given status for the pair.
    async fn find_by_pair(
        &self,
        company_id: CompanyId,
        item_id: InventoryItemId,
        shipment_id: ShipmentId,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>>;

    /// Writes back a mutated reservation.
    async fn save(&self, company_id: CompanyId, reservation: &Reservation) -> Result<()>;
}

/// Row storage for shipments.
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    /// Inserts a new shipment row.
    async fn insert(&self, shipment: Shipment) -> Result<()>;

    /// Finds a shipment by id. Absent or owned by another company -> `None`.
    async fn find(&self, company_id: CompanyId, id: ShipmentId) -> Result<Option<Shipment>>;

    /// Writes back a mutated shipment.
    async fn save(&self, company_id: CompanyId, shipment: &Shipment) -> Result<()>;

    /// Deletes a shipment row. Used only by compensation.
    ///
    /// Idempotent: deleting an absent row is a no-op so a rollback can be
    /// retried safely.
    async fn delete(&self, company_id: CompanyId, id: ShipmentId) -> Result<()>;

    /// Returns the next shipment sequence number for the company.
    ///
    /// Atomic per company: two concurrent callers never observe the same
    /// value. The first call on a fresh store yields `count + 1 == 1`.
    async fn next_sequence(&self, company_id: CompanyId) -> Result<u64>;
}

/// Row storage for activity-log entries.
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Appends an entry.
    async fn append(&self, entry: ActivityLog) -> Result<()>;

    /// Deletes an entry. Used only by compensation. Idempotent.
    async fn delete(&self, company_id: CompanyId, id: ActivityLogId) -> Result<()>;
}
