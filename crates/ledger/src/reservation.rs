//! Reservation ledger: holds binding inventory items to shipments.

use common::{CompanyId, InventoryItemId, ShipmentId};
use domain::{ActivityReference, ActivityType, Reservation, ReservationStatus};
use store::{ActivityLogRepository, InventoryRepository, ReservationRepository};

use crate::activity::ActivityRecorder;
use crate::error::{LedgerError, Result};
use crate::inventory::InventoryLedger;

/// Manages reservation rows and the stock they hold.
///
/// All inventory mutations route through the shared [`InventoryLedger`]
/// instance so they serialize on the same per-item locks as direct stock
/// operations.
#[derive(Clone)]
pub struct ReservationLedger<I, R, A> {
    inventory: InventoryLedger<I, A>,
    reservations: R,
    activity: ActivityRecorder<A>,
}

impl<I, R, A> ReservationLedger<I, R, A>
where
    I: InventoryRepository,
    R: ReservationRepository,
    A: ActivityLogRepository,
{
    /// Creates a ledger sharing the given inventory ledger.
    pub fn new(
        inventory: InventoryLedger<I, A>,
        reservations: R,
        activity: ActivityRecorder<A>,
    ) -> Self {
        Self {
            inventory,
            reservations,
            activity,
        }
    }

    /// Reserves stock and inserts an active reservation row.
    ///
    /// On inventory failure no row is created. If the row insert itself
    /// fails the reserved stock is released again, so the two never
    /// diverge.
    #[tracing::instrument(skip(self))]
    pub async fn create_reservation(
        &self,
        company_id: CompanyId,
        item_id: InventoryItemId,
        shipment_id: ShipmentId,
        quantity: u32,
    ) -> Result<Reservation> {
        self.inventory.reserve(company_id, item_id, quantity).await?;

        let reservation = Reservation::active(company_id, item_id, shipment_id, quantity);
        if let Err(err) = self.reservations.insert(reservation.clone()).await {
            // Put the stock back before surfacing the failure.
            if let Err(release_err) = self.inventory.release(company_id, item_id, quantity).await {
                tracing::error!(
                    %item_id,
                    error = %release_err,
                    "failed to release stock after reservation insert failure"
                );
            }
            return Err(err.into());
        }

        self.activity
            .record(
                company_id,
                ActivityType::ReservationCreated,
                format!("Reserved {quantity} units for shipment"),
                Some(ActivityReference::new(reservation.id, "reservation")),
                serde_json::json!({
                    "inventory_item_id": item_id.to_string(),
                    "shipment_id": shipment_id.to_string(),
                    "quantity": quantity,
                }),
            )
            .await?;

        Ok(reservation)
    }

    /// Releases the active reservation for the pair, if one exists.
    ///
    /// Returns `Ok(None)` when there is no active reservation; callers
    /// treat that as a best-effort miss rather than a failure, so a missing
    /// hold never blocks shipment cancellation.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_reservation(
        &self,
        company_id: CompanyId,
        item_id: InventoryItemId,
        shipment_id: ShipmentId,
    ) -> Result<Option<Reservation>> {
        let Some(mut reservation) = self
            .reservations
            .find_by_pair(company_id, item_id, shipment_id, ReservationStatus::Active)
            .await?
        else {
            return Ok(None);
        };

        self.inventory
            .release(company_id, item_id, reservation.quantity)
            .await?;
        reservation.cancel();
        self.reservations.save(company_id, &reservation).await?;

        self.activity
            .record(
                company_id,
                ActivityType::ReservationReleased,
                format!("Released {} reserved units", reservation.quantity),
                Some(ActivityReference::new(reservation.id, "reservation")),
                serde_json::json!({
                    "inventory_item_id": item_id.to_string(),
                    "shipment_id": shipment_id.to_string(),
                    "quantity": reservation.quantity,
                }),
            )
            .await?;

        Ok(Some(reservation))
    }

    /// Consumes the active reservation for the pair; the goods leave.
    #[tracing::instrument(skip(self))]
    pub async fn fulfill_reservation(
        &self,
        company_id: CompanyId,
        item_id: InventoryItemId,
        shipment_id: ShipmentId,
    ) -> Result<Reservation> {
        let mut reservation = self
            .reservations
            .find_by_pair(company_id, item_id, shipment_id, ReservationStatus::Active)
            .await?
            .ok_or(LedgerError::NoActiveReservation {
                item_id,
                shipment_id,
            })?;

        self.inventory
            .fulfill(company_id, item_id, reservation.quantity)
            .await?;
        reservation.fulfill();
        self.reservations.save(company_id, &reservation).await?;

        Ok(reservation)
    }

    /// Undoes a fulfillment: restores the held stock and flips the matching
    /// fulfilled row back to active. Compensation-only.
    #[tracing::instrument(skip(self))]
    pub async fn restore_reservation(
        &self,
        company_id: CompanyId,
        item_id: InventoryItemId,
        shipment_id: ShipmentId,
        quantity: u32,
    ) -> Result<Reservation> {
        let mut reservation = self
            .reservations
            .find_by_pair(
                company_id,
                item_id,
                shipment_id,
                ReservationStatus::Fulfilled,
            )
            .await?
            .ok_or(LedgerError::NoFulfilledReservation {
                item_id,
                shipment_id,
            })?;

        self.inventory.restore(company_id, item_id, quantity).await?;
        reservation.reactivate();
        self.reservations.save(company_id, &reservation).await?;

        Ok(reservation)
    }
}
