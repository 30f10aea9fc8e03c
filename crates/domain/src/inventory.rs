//! Inventory item entity and stock arithmetic.

use chrono::{DateTime, Utc};
use common::{CompanyId, InventoryItemId};
use serde::{Deserialize, Serialize};

use crate::error::StockError;

/// A stocked item owned by a company.
///
/// Stock is split into two counters: `available_stock` (free to promise)
/// and `reserved_stock` (held for pending outbound shipments). Their sum is
/// the total quantity the company owns. Both counters are unsigned, so the
/// non-negativity invariant holds by construction; the checked mutations
/// below reject anything that would undershoot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique item identifier.
    pub id: InventoryItemId,

    /// Stock-keeping unit code.
    pub sku: String,

    /// Human-readable item name.
    pub name: String,

    /// Unit of measure (e.g. "pcs", "kg").
    pub unit: String,

    /// Quantity free to promise.
    pub available_stock: u32,

    /// Quantity held for pending outbound shipments.
    pub reserved_stock: u32,

    /// Threshold below which the item counts as low on stock.
    pub low_stock_threshold: u32,

    /// Owning company (tenant).
    pub company_id: CompanyId,

    /// Soft-delete marker.
    pub is_deleted: bool,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Creates a new item with the given opening available stock.
    pub fn new(
        company_id: CompanyId,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        available_stock: u32,
        low_stock_threshold: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InventoryItemId::new(),
            sku: sku.into(),
            name: name.into(),
            unit: unit.into(),
            available_stock,
            reserved_stock: 0,
            low_stock_threshold,
            company_id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total quantity owned (available + reserved).
    pub fn total_stock(&self) -> u32 {
        self.available_stock + self.reserved_stock
    }

    /// Returns true if available stock is at or below the low-stock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.available_stock <= self.low_stock_threshold
    }

    /// Adds received goods to available stock.
    pub fn stock_in(&mut self, quantity: u32) {
        self.available_stock += quantity;
        self.touch();
    }

    /// Removes goods directly from available stock.
    pub fn stock_out(&mut self, quantity: u32) -> Result<(), StockError> {
        self.available_stock = self.checked_available(quantity)?;
        self.touch();
        Ok(())
    }

    /// Moves quantity from available to reserved. Total stock is unchanged.
    pub fn reserve(&mut self, quantity: u32) -> Result<(), StockError> {
        self.available_stock = self.checked_available(quantity)?;
        self.reserved_stock += quantity;
        self.touch();
        Ok(())
    }

    /// Moves quantity from reserved back to available. Total stock is unchanged.
    pub fn release(&mut self, quantity: u32) -> Result<(), StockError> {
        self.reserved_stock = self.checked_reserved(quantity)?;
        self.available_stock += quantity;
        self.touch();
        Ok(())
    }

    /// Consumes reserved quantity: the goods permanently leave.
    ///
    /// Available stock is untouched since it was already decremented when
    /// the reservation was made.
    pub fn fulfill(&mut self, quantity: u32) -> Result<(), StockError> {
        self.reserved_stock = self.checked_reserved(quantity)?;
        self.touch();
        Ok(())
    }

    /// Puts fulfilled quantity back into reserved stock.
    ///
    /// This is the exact undo of [`fulfill`](Self::fulfill) and exists only
    /// for compensation.
    pub fn restore(&mut self, quantity: u32) {
        self.reserved_stock += quantity;
        self.touch();
    }

    fn checked_available(&self, quantity: u32) -> Result<u32, StockError> {
        self.available_stock
            .checked_sub(quantity)
            .ok_or_else(|| StockError::InsufficientAvailable {
                sku: self.sku.clone(),
                requested: quantity,
                available: self.available_stock,
            })
    }

    fn checked_reserved(&self, quantity: u32) -> Result<u32, StockError> {
        self.reserved_stock
            .checked_sub(quantity)
            .ok_or_else(|| StockError::InsufficientReserved {
                sku: self.sku.clone(),
                requested: quantity,
                reserved: self.reserved_stock,
            })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(available: u32) -> InventoryItem {
        InventoryItem::new(CompanyId::new(), "SKU-001", "Widget", "pcs", available, 5)
    }

    #[test]
    fn stock_in_adds_to_available() {
        let mut i = item(10);
        i.stock_in(5);
        assert_eq!(i.available_stock, 15);
        assert_eq!(i.reserved_stock, 0);
    }

    #[test]
    fn stock_out_rejects_undershoot() {
        let mut i = item(3);
        let err = i.stock_out(4).unwrap_err();
        assert!(matches!(
            err,
            StockError::InsufficientAvailable {
                requested: 4,
                available: 3,
                ..
            }
        ));
        assert_eq!(i.available_stock, 3);
    }

    #[test]
    fn reserve_redistributes_total() {
        let mut i = item(10);
        i.reserve(4).unwrap();
        assert_eq!(i.available_stock, 6);
        assert_eq!(i.reserved_stock, 4);
        assert_eq!(i.total_stock(), 10);
    }

    #[test]
    fn reserve_fails_when_available_short() {
        let mut i = item(10);
        assert!(i.reserve(12).is_err());
        assert_eq!(i.available_stock, 10);
        assert_eq!(i.reserved_stock, 0);
    }

    #[test]
    fn release_is_inverse_of_reserve() {
        let mut i = item(10);
        i.reserve(4).unwrap();
        i.release(4).unwrap();
        assert_eq!(i.available_stock, 10);
        assert_eq!(i.reserved_stock, 0);
    }

    #[test]
    fn release_rejects_more_than_reserved() {
        let mut i = item(10);
        i.reserve(2).unwrap();
        assert!(i.release(3).is_err());
        assert_eq!(i.reserved_stock, 2);
    }

    #[test]
    fn fulfill_decreases_total() {
        let mut i = item(10);
        i.reserve(4).unwrap();
        i.fulfill(4).unwrap();
        assert_eq!(i.available_stock, 6);
        assert_eq!(i.reserved_stock, 0);
        assert_eq!(i.total_stock(), 6);
    }

    #[test]
    fn restore_undoes_fulfill() {
        let mut i = item(10);
        i.reserve(4).unwrap();
        i.fulfill(4).unwrap();
        i.restore(4);
        assert_eq!(i.reserved_stock, 4);
        assert_eq!(i.total_stock(), 10);
    }

    #[test]
    fn low_stock_threshold() {
        let mut i = item(6);
        assert!(!i.is_low_stock());
        i.stock_out(1).unwrap();
        assert!(i.is_low_stock());
    }
}
