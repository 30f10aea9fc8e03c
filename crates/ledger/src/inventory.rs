//! Inventory ledger: per-item stock mutations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use common::{CompanyId, InventoryItemId};
use domain::{ActivityReference, ActivityType, InventoryItem};
use store::InventoryRepository;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::activity::ActivityRecorder;
use crate::error::{LedgerError, Result};

/// Lock table keyed by inventory item id.
///
/// The inventory ledger is the only resource shared across shipments, so
/// every stock mutation takes the item's lock for its whole
/// load-mutate-save cycle. The outer mutex only guards the map itself and
/// is never held across an await.
type ItemLocks = Arc<StdMutex<HashMap<InventoryItemId, Arc<Mutex<()>>>>>;

/// Mutates per-item stock counters, serialized per item.
///
/// Business-significant mutations (item creation, stock in, stock out)
/// each emit an activity-log entry referencing the item. Reservation
/// redistribution (`reserve`/`release`/`fulfill`/`restore`) is logged by
/// the callers that give it business meaning.
#[derive(Clone)]
pub struct InventoryLedger<I, A> {
    items: I,
    activity: ActivityRecorder<A>,
    locks: ItemLocks,
}

impl<I, A> InventoryLedger<I, A>
where
    I: InventoryRepository,
    A: store::ActivityLogRepository,
{
    /// Creates a ledger over the given repositories.
    pub fn new(items: I, activity: ActivityRecorder<A>) -> Self {
        Self {
            items,
            activity,
            locks: Arc::default(),
        }
    }

    /// Creates an inventory item and records the creation.
    #[tracing::instrument(skip(self, item), fields(item_id = %item.id, sku = %item.sku))]
    pub async fn create_item(&self, item: InventoryItem) -> Result<InventoryItem> {
        self.items.insert(item.clone()).await?;
        self.activity
            .record(
                item.company_id,
                ActivityType::InventoryUpdated,
                format!("Created inventory item {}", item.sku),
                Some(ActivityReference::new(item.id, "inventory_item")),
                serde_json::json!({ "available_stock": item.available_stock }),
            )
            .await?;
        Ok(item)
    }

    /// Looks up an item, company-scoped.
    pub async fn get_item(
        &self,
        company_id: CompanyId,
        id: InventoryItemId,
    ) -> Result<Option<InventoryItem>> {
        Ok(self.items.find(company_id, id).await?)
    }

    /// Adds received goods to available stock.
    #[tracing::instrument(skip(self))]
    pub async fn stock_in(
        &self,
        company_id: CompanyId,
        id: InventoryItemId,
        quantity: u32,
    ) -> Result<InventoryItem> {
        let _guard = self.lock_item(id).await;
        let mut item = self.load(company_id, id).await?;
        item.stock_in(quantity);
        self.items.save(company_id, &item).await?;
        self.activity
            .record(
                company_id,
                ActivityType::InventoryIn,
                format!("Stocked in {} {} of {}", quantity, item.unit, item.name),
                Some(ActivityReference::new(id, "inventory_item")),
                serde_json::json!({
                    "quantity": quantity,
                    "available_stock": item.available_stock,
                }),
            )
            .await?;
        Ok(item)
    }

    /// Removes goods directly from available stock.
    #[tracing::instrument(skip(self))]
    pub async fn stock_out(
        &self,
        company_id: CompanyId,
        id: InventoryItemId,
        quantity: u32,
    ) -> Result<InventoryItem> {
        let _guard = self.lock_item(id).await;
        let mut item = self.load(company_id, id).await?;
        item.stock_out(quantity)?;
        self.items.save(company_id, &item).await?;
        self.activity
            .record(
                company_id,
                ActivityType::InventoryOut,
                format!("Stocked out {} {} of {}", quantity, item.unit, item.name),
                Some(ActivityReference::new(id, "inventory_item")),
                serde_json::json!({
                    "quantity": quantity,
                    "available_stock": item.available_stock,
                }),
            )
            .await?;
        Ok(item)
    }

    /// Moves quantity from available to reserved.
    #[tracing::instrument(skip(self))]
    pub async fn reserve(
        &self,
        company_id: CompanyId,
        id: InventoryItemId,
        quantity: u32,
    ) -> Result<InventoryItem> {
        self.mutate(company_id, id, |item| item.reserve(quantity)).await
    }

    /// Moves quantity from reserved back to available.
    #[tracing::instrument(skip(self))]
    pub async fn release(
        &self,
        company_id: CompanyId,
        id: InventoryItemId,
        quantity: u32,
    ) -> Result<InventoryItem> {
        self.mutate(company_id, id, |item| item.release(quantity)).await
    }

    /// Consumes reserved quantity; the goods permanently leave.
    #[tracing::instrument(skip(self))]
    pub async fn fulfill(
        &self,
        company_id: CompanyId,
        id: InventoryItemId,
        quantity: u32,
    ) -> Result<InventoryItem> {
        self.mutate(company_id, id, |item| item.fulfill(quantity)).await
    }

    /// Puts fulfilled quantity back into reserved stock. Compensation-only.
    #[tracing::instrument(skip(self))]
    pub async fn restore(
        &self,
        company_id: CompanyId,
        id: InventoryItemId,
        quantity: u32,
    ) -> Result<InventoryItem> {
        self.mutate(company_id, id, |item| {
            item.restore(quantity);
            Ok(())
        })
        .await
    }

    async fn mutate<F>(
        &self,
        company_id: CompanyId,
        id: InventoryItemId,
        op: F,
    ) -> Result<InventoryItem>
    where
        F: FnOnce(&mut InventoryItem) -> std::result::Result<(), domain::StockError>,
    {
        let _guard = self.lock_item(id).await;
        let mut item = self.load(company_id, id).await?;
        op(&mut item)?;
        self.items.save(company_id, &item).await?;
        Ok(item)
    }

    async fn load(&self, company_id: CompanyId, id: InventoryItemId) -> Result<InventoryItem> {
        self.items
            .find(company_id, id)
            .await?
            .ok_or(LedgerError::ItemNotFound(id))
    }

    async fn lock_item(&self, id: InventoryItemId) -> OwnedMutexGuard<()> {
        let lock = {
            // The outer mutex only guards the map; recover it if a panicking
            // holder poisoned it.
            let mut locks = match self.locks.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }
}
