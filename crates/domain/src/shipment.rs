//! Shipment entity and status state machine.

use chrono::{DateTime, Utc};
use common::{CompanyId, InventoryItemId, ShipmentId};
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// The state of a shipment in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► InTransit ──► Delivered
///    │            │
///    └────────────┴──► Cancelled
/// ```
///
/// Statuses advance forward only, one step at a time; `Cancelled` is
/// reachable from any non-terminal state; `Delivered` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Shipment created, nothing has moved yet.
    #[default]
    Pending,

    /// Goods are on the way.
    InTransit,

    /// Goods arrived (terminal state).
    Delivered,

    /// Shipment was called off (terminal state).
    Cancelled,
}

impl ShipmentStatus {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Cancelled)
    }

    /// Returns the next status in the forward sequence, if any.
    fn forward(&self) -> Option<ShipmentStatus> {
        match self {
            ShipmentStatus::Pending => Some(ShipmentStatus::InTransit),
            ShipmentStatus::InTransit => Some(ShipmentStatus::Delivered),
            ShipmentStatus::Delivered | ShipmentStatus::Cancelled => None,
        }
    }

    /// Returns true if the transition `self -> next` is legal.
    ///
    /// No skipping and no backward moves; cancellation is allowed from any
    /// non-terminal state.
    pub fn can_transition_to(&self, next: ShipmentStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == ShipmentStatus::Cancelled {
            return true;
        }
        self.forward() == Some(next)
    }

    /// Returns the status name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a shipment brings stock in or sends it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Stock entering the company (procurement).
    Inbound,

    /// Stock leaving the company (dispatch).
    Outbound,
}

impl MovementType {
    /// Shipment-number prefix for this direction.
    ///
    /// Part of the `{PREFIX}-{year}-{seq:03}` contract consumed by
    /// downstream display code.
    pub fn prefix(&self) -> &'static str {
        match self {
            MovementType::Inbound => "INB",
            MovementType::Outbound => "SHP",
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementType::Inbound => write!(f, "inbound"),
            MovementType::Outbound => write!(f, "outbound"),
        }
    }
}

/// A line on a shipment.
///
/// Value object owned by the shipment; not independently addressable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentItem {
    /// The inventory item being moved.
    pub inventory_item_id: InventoryItemId,

    /// Item name at the time the shipment was created.
    pub name: String,

    /// Quantity moved.
    pub quantity: u32,
}

/// A shipment moving stock in or out of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique shipment identifier.
    pub id: ShipmentId,

    /// Human-readable number, `{PREFIX}-{year}-{seq:03}`.
    pub shipment_number: String,

    /// Counterparty name.
    pub customer_name: String,

    /// Destination address or site.
    pub destination: String,

    /// Current lifecycle status.
    pub status: ShipmentStatus,

    /// Movement direction.
    pub movement_type: MovementType,

    /// Lines on the shipment.
    pub items: Vec<ShipmentItem>,

    /// Owning company (tenant).
    pub company_id: CompanyId,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,

    /// Set when the shipment reaches `Delivered`.
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Shipment {
    /// Creates a new shipment in `Pending`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_pending(
        company_id: CompanyId,
        shipment_number: String,
        customer_name: impl Into<String>,
        destination: impl Into<String>,
        movement_type: MovementType,
        items: Vec<ShipmentItem>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ShipmentId::new(),
            shipment_number,
            customer_name: customer_name.into(),
            destination: destination.into(),
            status: ShipmentStatus::Pending,
            movement_type,
            items,
            company_id,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        }
    }

    /// Advances the shipment to `next`, guarded by the state machine.
    ///
    /// Sets `delivered_at` when the target is `Delivered`.
    pub fn transition_to(&mut self, next: ShipmentStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        let now = Utc::now();
        if next == ShipmentStatus::Delivered {
            self.delivered_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Puts the shipment back into an earlier status, bypassing the guard.
    ///
    /// Compensation-only: a rollback must be able to move backward.
    pub fn restore_status(
        &mut self,
        status: ShipmentStatus,
        delivered_at: Option<DateTime<Utc>>,
    ) {
        self.status = status;
        self.delivered_at = delivered_at;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_legal() {
        assert!(ShipmentStatus::Pending.can_transition_to(ShipmentStatus::InTransit));
        assert!(ShipmentStatus::InTransit.can_transition_to(ShipmentStatus::Delivered));
    }

    #[test]
    fn skipping_is_rejected() {
        assert!(!ShipmentStatus::Pending.can_transition_to(ShipmentStatus::Delivered));
    }

    #[test]
    fn backward_moves_are_rejected() {
        assert!(!ShipmentStatus::InTransit.can_transition_to(ShipmentStatus::Pending));
        assert!(!ShipmentStatus::Delivered.can_transition_to(ShipmentStatus::InTransit));
    }

    #[test]
    fn cancel_from_any_non_terminal_state() {
        assert!(ShipmentStatus::Pending.can_transition_to(ShipmentStatus::Cancelled));
        assert!(ShipmentStatus::InTransit.can_transition_to(ShipmentStatus::Cancelled));
        assert!(!ShipmentStatus::Delivered.can_transition_to(ShipmentStatus::Cancelled));
        assert!(!ShipmentStatus::Cancelled.can_transition_to(ShipmentStatus::Cancelled));
    }

    #[test]
    fn terminal_states_allow_nothing() {
        for next in [
            ShipmentStatus::Pending,
            ShipmentStatus::InTransit,
            ShipmentStatus::Delivered,
            ShipmentStatus::Cancelled,
        ] {
            assert!(!ShipmentStatus::Delivered.can_transition_to(next));
            assert!(!ShipmentStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn transition_to_delivered_stamps_delivered_at() {
        let mut s = sample(MovementType::Outbound);
        s.transition_to(ShipmentStatus::InTransit).unwrap();
        assert!(s.delivered_at.is_none());
        s.transition_to(ShipmentStatus::Delivered).unwrap();
        assert!(s.delivered_at.is_some());
    }

    #[test]
    fn illegal_transition_leaves_shipment_untouched() {
        let mut s = sample(MovementType::Outbound);
        let err = s.transition_to(ShipmentStatus::Delivered).unwrap_err();
        assert_eq!(err.from, ShipmentStatus::Pending);
        assert_eq!(err.to, ShipmentStatus::Delivered);
        assert_eq!(s.status, ShipmentStatus::Pending);
    }

    #[test]
    fn restore_status_bypasses_guard() {
        let mut s = sample(MovementType::Inbound);
        s.transition_to(ShipmentStatus::InTransit).unwrap();
        s.transition_to(ShipmentStatus::Delivered).unwrap();
        s.restore_status(ShipmentStatus::InTransit, None);
        assert_eq!(s.status, ShipmentStatus::InTransit);
        assert!(s.delivered_at.is_none());
    }

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_string(&ShipmentStatus::InTransit).unwrap(),
            "\"in_transit\""
        );
        assert_eq!(
            serde_json::to_string(&MovementType::Outbound).unwrap(),
            "\"outbound\""
        );
    }

    #[test]
    fn number_prefixes() {
        assert_eq!(MovementType::Outbound.prefix(), "SHP");
        assert_eq!(MovementType::Inbound.prefix(), "INB");
    }

    fn sample(movement_type: MovementType) -> Shipment {
        Shipment::new_pending(
            CompanyId::new(),
            "SHP-2026-001".to_string(),
            "ACME",
            "Dock 4",
            movement_type,
            vec![ShipmentItem {
                inventory_item_id: InventoryItemId::new(),
                name: "Widget".to_string(),
                quantity: 2,
            }],
        )
    }
}
