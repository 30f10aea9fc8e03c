use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{ActivityLogId, CompanyId, InventoryItemId, ShipmentId};
use domain::{ActivityLog, InventoryItem, Reservation, ReservationStatus, Shipment};
use tokio::sync::RwLock;

use crate::{
    ActivityLogRepository, InventoryRepository, ReservationRepository, Result, ShipmentRepository,
    StoreError,
};

/// In-memory inventory repository for tests and single-process use.
#[derive(Clone, Default)]
pub struct InMemoryInventoryRepository {
    items: Arc<RwLock<HashMap<InventoryItemId, InventoryItem>>>,
}

impl InMemoryInventoryRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of item rows stored.
    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn insert(&self, item: InventoryItem) -> Result<()> {
        self.items.write().await.insert(item.id, item);
        Ok(())
    }

    async fn find(
        &self,
        company_id: CompanyId,
        id: InventoryItemId,
    ) -> Result<Option<InventoryItem>> {
        let items = self.items.read().await;
        Ok(items
            .get(&id)
            .filter(|item| item.company_id == company_id && !item.is_deleted)
            .cloned())
    }

    async fn save(&self, company_id: CompanyId, item: &InventoryItem) -> Result<()> {
        let mut items = self.items.write().await;
        match items.get(&item.id) {
            None => Err(StoreError::NotFound {
                entity: "inventory item",
                id: item.id.to_string(),
            }),
            Some(existing) if existing.company_id != company_id => {
                Err(StoreError::TenantMismatch {
                    entity: "inventory item",
                    id: item.id.to_string(),
                })
            }
            Some(_) => {
                items.insert(item.id, item.clone());
                Ok(())
            }
        }
    }
}

#[derive(Default)]
struct ReservationState {
    rows: Vec<Reservation>,
    /// When set, inserts fail once this many rows are stored. Test hook.
    fail_inserts_after: Option<usize>,
}

/// In-memory reservation repository for tests and single-process use.
#[derive(Clone, Default)]
pub struct InMemoryReservationRepository {
    state: Arc<RwLock<ReservationState>>,
}

impl InMemoryReservationRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures inserts to fail once `count` rows are stored.
    pub async fn fail_inserts_after(&self, count: usize) {
        self.state.write().await.fail_inserts_after = Some(count);
    }

    /// Returns all reservations for a company, oldest first.
    pub async fn reservations(&self, company_id: CompanyId) -> Vec<Reservation> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .filter(|r| r.company_id == company_id)
            .cloned()
            .collect()
    }

    /// Returns the number of active reservations for a company.
    pub async fn active_count(&self, company_id: CompanyId) -> usize {
        self.state
            .read()
            .await
            .rows
            .iter()
            .filter(|r| r.company_id == company_id && r.is_active())
            .count()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn insert(&self, reservation: Reservation) -> Result<()> {
        let mut state = self.state.write().await;

        if let Some(limit) = state.fail_inserts_after
            && state.rows.len() >= limit
        {
            return Err(StoreError::Unavailable(
                "reservation insert rejected".to_string(),
            ));
        }

        let duplicate = state.rows.iter().any(|r| {
            r.company_id == reservation.company_id
                && r.inventory_item_id == reservation.inventory_item_id
                && r.shipment_id == reservation.shipment_id
                && r.is_active()
        });
        if duplicate {
            return Err(StoreError::DuplicateActiveReservation {
                item_id: reservation.inventory_item_id,
                shipment_id: reservation.shipment_id,
            });
        }

        state.rows.push(reservation);
        Ok(())
    }

    async fn find_by_pair(
        &self,
        company_id: CompanyId,
        item_id: InventoryItemId,
        shipment_id: ShipmentId,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .find(|r| {
                r.company_id == company_id
                    && r.inventory_item_id == item_id
                    && r.shipment_id == shipment_id
                    && r.status == status
            })
            .cloned())
    }

    async fn save(&self, company_id: CompanyId, reservation: &Reservation) -> Result<()> {
        let mut state = self.state.write().await;
        match state.rows.iter_mut().find(|r| r.id == reservation.id) {
            None => Err(StoreError::NotFound {
                entity: "reservation",
                id: reservation.id.to_string(),
            }),
            Some(existing) if existing.company_id != company_id => {
                Err(StoreError::TenantMismatch {
                    entity: "reservation",
                    id: reservation.id.to_string(),
                })
            }
            Some(existing) => {
                *existing = reservation.clone();
                Ok(())
            }
        }
    }
}

#[derive(Default)]
struct ShipmentState {
    rows: HashMap<ShipmentId, Shipment>,
    sequences: HashMap<CompanyId, u64>,
}

/// In-memory shipment repository for tests and single-process use.
#[derive(Clone, Default)]
pub struct InMemoryShipmentRepository {
    state: Arc<RwLock<ShipmentState>>,
}

impl InMemoryShipmentRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of shipments stored for a company.
    pub async fn shipment_count(&self, company_id: CompanyId) -> usize {
        self.state
            .read()
            .await
            .rows
            .values()
            .filter(|s| s.company_id == company_id)
            .count()
    }
}

#[async_trait]
impl ShipmentRepository for InMemoryShipmentRepository {
    async fn insert(&self, shipment: Shipment) -> Result<()> {
        self.state.write().await.rows.insert(shipment.id, shipment);
        Ok(())
    }

    async fn find(&self, company_id: CompanyId, id: ShipmentId) -> Result<Option<Shipment>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .get(&id)
            .filter(|s| s.company_id == company_id)
            .cloned())
    }

    async fn save(&self, company_id: CompanyId, shipment: &Shipment) -> Result<()> {
        let mut state = self.state.write().await;
        match state.rows.get(&shipment.id) {
            None => Err(StoreError::NotFound {
                entity: "shipment",
                id: shipment.id.to_string(),
            }),
            Some(existing) if existing.company_id != company_id => {
                Err(StoreError::TenantMismatch {
                    entity: "shipment",
                    id: shipment.id.to_string(),
                })
            }
            Some(_) => {
                state.rows.insert(shipment.id, shipment.clone());
                Ok(())
            }
        }
    }

    async fn delete(&self, company_id: CompanyId, id: ShipmentId) -> Result<()> {
        let mut state = self.state.write().await;
        match state.rows.get(&id) {
            Some(existing) if existing.company_id != company_id => {
                Err(StoreError::TenantMismatch {
                    entity: "shipment",
                    id: id.to_string(),
                })
            }
            Some(_) => {
                state.rows.remove(&id);
                Ok(())
            }
            // Idempotent: deleting an absent row is a no-op.
            None => Ok(()),
        }
    }

    async fn next_sequence(&self, company_id: CompanyId) -> Result<u64> {
        let mut state = self.state.write().await;
        let seq = state.sequences.entry(company_id).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }
}

/// In-memory activity-log repository for tests and single-process use.
#[derive(Clone, Default)]
pub struct InMemoryActivityLogRepository {
    rows: Arc<RwLock<Vec<ActivityLog>>>,
}

impl InMemoryActivityLogRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all entries for a company, oldest first.
    pub async fn entries(&self, company_id: CompanyId) -> Vec<ActivityLog> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|e| e.company_id == company_id)
            .cloned()
            .collect()
    }

    /// Returns the total number of entries stored.
    pub async fn entry_count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryActivityLogRepository {
    async fn append(&self, entry: ActivityLog) -> Result<()> {
        self.rows.write().await.push(entry);
        Ok(())
    }

    async fn delete(&self, company_id: CompanyId, id: ActivityLogId) -> Result<()> {
        let mut rows = self.rows.write().await;
        if let Some(entry) = rows.iter().find(|e| e.id == id)
            && entry.company_id != company_id
        {
            return Err(StoreError::TenantMismatch {
                entity: "activity log entry",
                id: id.to_string(),
            });
        }
        // Idempotent: deleting an absent entry is a no-op.
        rows.retain(|e| e.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{ActivityType, MovementType, ShipmentItem};

    fn item(company_id: CompanyId, available: u32) -> InventoryItem {
        InventoryItem::new(company_id, "SKU-001", "Widget", "pcs", available, 0)
    }

    #[tokio::test]
    async fn find_is_scoped_by_company() {
        let repo = InMemoryInventoryRepository::new();
        let owner = CompanyId::new();
        let stranger = CompanyId::new();
        let stored = item(owner, 10);
        let id = stored.id;
        repo.insert(stored).await.unwrap();

        assert!(repo.find(owner, id).await.unwrap().is_some());
        assert!(repo.find(stranger, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_rejects_cross_tenant_write() {
        let repo = InMemoryInventoryRepository::new();
        let owner = CompanyId::new();
        let stranger = CompanyId::new();
        let mut stored = item(owner, 10);
        repo.insert(stored.clone()).await.unwrap();

        stored.stock_in(5);
        let err = repo.save(stranger, &stored).await.unwrap_err();
        assert!(matches!(err, StoreError::TenantMismatch { .. }));
    }

    #[tokio::test]
    async fn soft_deleted_items_are_absent() {
        let repo = InMemoryInventoryRepository::new();
        let company = CompanyId::new();
        let mut stored = item(company, 10);
        let id = stored.id;
        repo.insert(stored.clone()).await.unwrap();

        stored.is_deleted = true;
        repo.save(company, &stored).await.unwrap();
        assert!(repo.find(company, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_active_reservation_is_rejected() {
        let repo = InMemoryReservationRepository::new();
        let company = CompanyId::new();
        let item_id = InventoryItemId::new();
        let shipment_id = ShipmentId::new();

        repo.insert(Reservation::active(company, item_id, shipment_id, 2))
            .await
            .unwrap();
        let err = repo
            .insert(Reservation::active(company, item_id, shipment_id, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateActiveReservation { .. }));
    }

    #[tokio::test]
    async fn cancelled_reservation_frees_the_pair() {
        let repo = InMemoryReservationRepository::new();
        let company = CompanyId::new();
        let item_id = InventoryItemId::new();
        let shipment_id = ShipmentId::new();

        let mut first = Reservation::active(company, item_id, shipment_id, 2);
        repo.insert(first.clone()).await.unwrap();
        first.cancel();
        repo.save(company, &first).await.unwrap();

        repo.insert(Reservation::active(company, item_id, shipment_id, 2))
            .await
            .unwrap();
        assert_eq!(repo.active_count(company).await, 1);
    }

    #[tokio::test]
    async fn fail_inserts_after_trips_at_threshold() {
        let repo = InMemoryReservationRepository::new();
        let company = CompanyId::new();
        repo.fail_inserts_after(1).await;

        repo.insert(Reservation::active(
            company,
            InventoryItemId::new(),
            ShipmentId::new(),
            1,
        ))
        .await
        .unwrap();
        let err = repo
            .insert(Reservation::active(
                company,
                InventoryItemId::new(),
                ShipmentId::new(),
                1,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn sequences_are_per_company_and_monotonic() {
        let repo = InMemoryShipmentRepository::new();
        let a = CompanyId::new();
        let b = CompanyId::new();

        assert_eq!(repo.next_sequence(a).await.unwrap(), 1);
        assert_eq!(repo.next_sequence(a).await.unwrap(), 2);
        assert_eq!(repo.next_sequence(b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn shipment_delete_is_idempotent() {
        let repo = InMemoryShipmentRepository::new();
        let company = CompanyId::new();
        let shipment = Shipment::new_pending(
            company,
            "SHP-2026-001".to_string(),
            "ACME",
            "Dock 4",
            MovementType::Outbound,
            vec![ShipmentItem {
                inventory_item_id: InventoryItemId::new(),
                name: "Widget".to_string(),
                quantity: 1,
            }],
        );
        let id = shipment.id;
        repo.insert(shipment).await.unwrap();

        repo.delete(company, id).await.unwrap();
        repo.delete(company, id).await.unwrap();
        assert_eq!(repo.shipment_count(company).await, 0);
    }

    #[tokio::test]
    async fn activity_delete_is_scoped_and_idempotent() {
        let repo = InMemoryActivityLogRepository::new();
        let owner = CompanyId::new();
        let stranger = CompanyId::new();
        let entry = ActivityLog::new(
            owner,
            ActivityType::ShipmentCreated,
            "Created shipment",
            None,
            serde_json::Value::Null,
        );
        let id = entry.id;
        repo.append(entry).await.unwrap();

        let err = repo.delete(stranger, id).await.unwrap_err();
        assert!(matches!(err, StoreError::TenantMismatch { .. }));

        repo.delete(owner, id).await.unwrap();
        repo.delete(owner, id).await.unwrap();
        assert_eq!(repo.entry_count().await, 0);
    }
}
