//! Activity-log entry entity.

use chrono::{DateTime, Utc};
use common::{ActivityLogId, CompanyId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Kind of a recorded business event.
///
/// The SCREAMING_SNAKE_CASE wire names are part of the external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    InventoryIn,
    InventoryOut,
    InventoryUpdated,
    ShipmentCreated,
    ShipmentUpdated,
    ShipmentDelivered,
    ShipmentCancelled,
    ReservationCreated,
    ReservationReleased,
    CompanyCreated,
}

impl ActivityType {
    /// Returns the wire name of the activity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::InventoryIn => "INVENTORY_IN",
            ActivityType::InventoryOut => "INVENTORY_OUT",
            ActivityType::InventoryUpdated => "INVENTORY_UPDATED",
            ActivityType::ShipmentCreated => "SHIPMENT_CREATED",
            ActivityType::ShipmentUpdated => "SHIPMENT_UPDATED",
            ActivityType::ShipmentDelivered => "SHIPMENT_DELIVERED",
            ActivityType::ShipmentCancelled => "SHIPMENT_CANCELLED",
            ActivityType::ReservationCreated => "RESERVATION_CREATED",
            ActivityType::ReservationReleased => "RESERVATION_RELEASED",
            ActivityType::CompanyCreated => "COMPANY_CREATED",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pointer from an activity entry to the entity it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReference {
    /// Identifier of the referenced entity, stringified.
    pub entity_id: String,

    /// Kind of the referenced entity ("inventory_item", "shipment", ...).
    pub entity_type: String,
}

impl ActivityReference {
    pub fn new(entity_id: impl ToString, entity_type: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            entity_type: entity_type.into(),
        }
    }
}

/// An append-only record of a business event.
///
/// Entries are immutable once written, except that a compensation sweep may
/// delete an entry appended earlier in the same failed unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    /// Unique entry identifier.
    pub id: ActivityLogId,

    /// Kind of event.
    pub activity_type: ActivityType,

    /// Human-readable description.
    pub description: String,

    /// Entity the entry refers to, if any.
    pub reference: Option<ActivityReference>,

    /// Free-form structured payload.
    pub metadata: JsonValue,

    /// Owning company (tenant).
    pub company_id: CompanyId,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// Creates a new entry stamped with the current time.
    pub fn new(
        company_id: CompanyId,
        activity_type: ActivityType,
        description: impl Into<String>,
        reference: Option<ActivityReference>,
        metadata: JsonValue,
    ) -> Self {
        Self {
            id: ActivityLogId::new(),
            activity_type,
            description: description.into(),
            reference,
            metadata,
            company_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&ActivityType::ShipmentDelivered).unwrap(),
            "\"SHIPMENT_DELIVERED\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityType::ReservationReleased).unwrap(),
            "\"RESERVATION_RELEASED\""
        );
        assert_eq!(ActivityType::InventoryIn.as_str(), "INVENTORY_IN");
        assert_eq!(ActivityType::CompanyCreated.as_str(), "COMPANY_CREATED");
    }

    #[test]
    fn entry_serialization_roundtrip() {
        let entry = ActivityLog::new(
            CompanyId::new(),
            ActivityType::ShipmentCreated,
            "Created shipment SHP-2026-001",
            Some(ActivityReference::new(common::ShipmentId::new(), "shipment")),
            serde_json::json!({ "items": 2 }),
        );
        let json = serde_json::to_string(&entry).unwrap();
        let back: ActivityLog = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
