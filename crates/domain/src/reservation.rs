//! Stock reservation entity.

use chrono::{DateTime, Utc};
use common::{CompanyId, InventoryItemId, ReservationId, ShipmentId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Stock is held, awaiting the shipment's outcome.
    #[default]
    Active,

    /// The shipment was delivered; the held stock left the building.
    Fulfilled,

    /// The reservation was released back to available stock.
    Cancelled,
}

impl ReservationStatus {
    /// Returns the status name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Fulfilled => "fulfilled",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hold binding an inventory item to an outbound shipment.
///
/// At most one `active` reservation may exist per
/// (inventory item, shipment) pair; the store enforces this on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,

    /// The item whose stock is held.
    pub inventory_item_id: InventoryItemId,

    /// The shipment the hold belongs to.
    pub shipment_id: ShipmentId,

    /// Held quantity, always positive.
    pub quantity: u32,

    /// Current status.
    pub status: ReservationStatus,

    /// Owning company (tenant).
    pub company_id: CompanyId,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last status-change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a new active reservation.
    pub fn active(
        company_id: CompanyId,
        inventory_item_id: InventoryItemId,
        shipment_id: ShipmentId,
        quantity: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ReservationId::new(),
            inventory_item_id,
            shipment_id,
            quantity,
            status: ReservationStatus::Active,
            company_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true while the hold is in force.
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    /// Marks the reservation fulfilled (goods shipped).
    pub fn fulfill(&mut self) {
        self.status = ReservationStatus::Fulfilled;
        self.updated_at = Utc::now();
    }

    /// Marks the reservation cancelled (hold released).
    pub fn cancel(&mut self) {
        self.status = ReservationStatus::Cancelled;
        self.updated_at = Utc::now();
    }

    /// Flips a fulfilled reservation back to active.
    ///
    /// Compensation-only: undoes [`fulfill`](Self::fulfill) when a
    /// delivery saga rolls back.
    pub fn reactivate(&mut self) {
        self.status = ReservationStatus::Active;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_reservation_is_active() {
        let r = Reservation::active(
            CompanyId::new(),
            InventoryItemId::new(),
            ShipmentId::new(),
            3,
        );
        assert!(r.is_active());
        assert_eq!(r.quantity, 3);
    }

    #[test]
    fn fulfill_then_reactivate_roundtrips() {
        let mut r = Reservation::active(
            CompanyId::new(),
            InventoryItemId::new(),
            ShipmentId::new(),
            3,
        );
        r.fulfill();
        assert_eq!(r.status, ReservationStatus::Fulfilled);
        r.reactivate();
        assert!(r.is_active());
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Fulfilled).unwrap(),
            "\"fulfilled\""
        );
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
