//! Shipment lifecycle service.

use chrono::{Datelike, Utc};
use common::{ActivityLogId, CompanyId, InventoryItemId, ShipmentId};
use domain::{
    ActivityReference, ActivityType, InventoryItem, MovementType, Shipment, ShipmentItem,
    ShipmentStatus, TransitionError,
};
use ledger::{ActivityRecorder, InventoryLedger, ReservationLedger};
use saga::{Coordinator, SagaContext, SagaOutcome};
use serde::{Deserialize, Serialize};
use store::{
    ActivityLogRepository, InventoryRepository, ReservationRepository, ShipmentRepository,
};

use crate::error::{ShipmentError, StockShortage};

/// A line on a shipment creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShipmentItem {
    pub inventory_item_id: InventoryItemId,
    pub quantity: u32,
}

/// A shipment creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShipment {
    pub customer_name: String,
    pub destination: String,
    pub movement_type: MovementType,
    pub items: Vec<NewShipmentItem>,
}

/// Drives shipments through their lifecycle.
///
/// `create_shipment` and `update_status` each run as one unit of work under
/// the saga coordinator: every mutation registers its compensating action
/// immediately after it succeeds, and the first failure unwinds the
/// registered actions newest-first before the error is surfaced.
#[derive(Clone)]
pub struct ShipmentService<I, R, S, A> {
    inventory: InventoryLedger<I, A>,
    reservations: ReservationLedger<I, R, A>,
    shipments: S,
    activity: ActivityRecorder<A>,
    coordinator: Coordinator,
}

impl<I, R, S, A> ShipmentService<I, R, S, A>
where
    I: InventoryRepository + Clone + Send + Sync + 'static,
    R: ReservationRepository + Clone + Send + Sync + 'static,
    S: ShipmentRepository + Clone + Send + Sync + 'static,
    A: ActivityLogRepository + Clone + Send + Sync + 'static,
{
    /// Wires the service from its four repositories.
    ///
    /// The reservation ledger shares the inventory ledger instance so all
    /// stock mutations serialize on the same per-item locks.
    pub fn new(items: I, reservations: R, shipments: S, activity: A) -> Self {
        let recorder = ActivityRecorder::new(activity);
        let inventory = InventoryLedger::new(items, recorder.clone());
        let reservations =
            ReservationLedger::new(inventory.clone(), reservations, recorder.clone());
        Self {
            inventory,
            reservations,
            shipments,
            activity: recorder,
            coordinator: Coordinator::new(),
        }
    }

    /// Returns the inventory ledger the service mutates through.
    pub fn inventory(&self) -> &InventoryLedger<I, A> {
        &self.inventory
    }

    /// Looks up a shipment, company-scoped.
    pub async fn get_shipment(
        &self,
        company_id: CompanyId,
        id: ShipmentId,
    ) -> Result<Option<Shipment>, ShipmentError> {
        Ok(self.shipments.find(company_id, id).await?)
    }

    /// Creates a shipment in `pending`.
    ///
    /// Outbound shipments are validated against available stock before any
    /// mutation, then one reservation is taken per line; the first failing
    /// line unwinds the reservations already taken.
    #[tracing::instrument(skip(self, request), fields(movement = %request.movement_type))]
    pub async fn create_shipment(
        &self,
        company_id: CompanyId,
        request: NewShipment,
    ) -> SagaOutcome<Shipment> {
        let outcome = self
            .coordinator
            .run("create_shipment", |ctx| {
                self.run_create(ctx, company_id, request)
            })
            .await;
        if outcome.success {
            metrics::counter!("shipments_created_total").increment(1);
        }
        outcome
    }

    /// Moves a shipment to `new_status`.
    ///
    /// The state-machine guard rejects illegal transitions before the saga
    /// starts, so a rejected request performs no work at all.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        company_id: CompanyId,
        shipment_id: ShipmentId,
        new_status: ShipmentStatus,
    ) -> SagaOutcome<Shipment> {
        let shipment = match self.shipments.find(company_id, shipment_id).await {
            Ok(Some(shipment)) => shipment,
            Ok(None) => {
                return SagaOutcome::failed(
                    ShipmentError::NotFound(shipment_id).to_string(),
                    false,
                );
            }
            Err(err) => return SagaOutcome::failed(ShipmentError::from(err).to_string(), false),
        };

        if !shipment.status.can_transition_to(new_status) {
            let err = TransitionError {
                from: shipment.status,
                to: new_status,
            };
            tracing::warn!(%shipment_id, %err, "transition rejected");
            return SagaOutcome::failed(err.to_string(), false);
        }

        self.coordinator
            .run("update_shipment_status", |ctx| {
                self.run_update(ctx, company_id, shipment, new_status)
            })
            .await
    }

    async fn run_create(
        &self,
        ctx: SagaContext,
        company_id: CompanyId,
        request: NewShipment,
    ) -> Result<Shipment, ShipmentError> {
        // Resolve lines and validate before any mutation.
        let mut lines: Vec<(InventoryItem, u32)> = Vec::with_capacity(request.items.len());
        for line in &request.items {
            if line.quantity == 0 {
                return Err(ShipmentError::ZeroQuantity(line.inventory_item_id));
            }
            let item = self
                .inventory
                .get_item(company_id, line.inventory_item_id)
                .await?
                .ok_or(ShipmentError::UnknownItem(line.inventory_item_id))?;
            lines.push((item, line.quantity));
        }

        if request.movement_type == MovementType::Outbound {
            let shortages: Vec<StockShortage> = lines
                .iter()
                .filter(|(item, quantity)| item.available_stock < *quantity)
                .map(|(item, quantity)| StockShortage {
                    inventory_item_id: item.id,
                    name: item.name.clone(),
                    requested: *quantity,
                    available: item.available_stock,
                })
                .collect();
            if !shortages.is_empty() {
                return Err(ShipmentError::InsufficientStock { shortages });
            }
        }

        let sequence = self.shipments.next_sequence(company_id).await?;
        let shipment_number = format!(
            "{}-{}-{:03}",
            request.movement_type.prefix(),
            Utc::now().year(),
            sequence
        );

        let items: Vec<ShipmentItem> = lines
            .iter()
            .map(|(item, quantity)| ShipmentItem {
                inventory_item_id: item.id,
                name: item.name.clone(),
                quantity: *quantity,
            })
            .collect();
        let shipment = Shipment::new_pending(
            company_id,
            shipment_number,
            request.customer_name,
            request.destination,
            request.movement_type,
            items,
        );

        // Outbound: take one reservation per line, registering the undo
        // right after each success so a later failure unwinds exactly the
        // reservations already taken.
        if request.movement_type == MovementType::Outbound {
            for (item, quantity) in &lines {
                self.reservations
                    .create_reservation(company_id, item.id, shipment.id, *quantity)
                    .await?;

                let ledger = self.reservations.clone();
                let item_id = item.id;
                let shipment_id = shipment.id;
                ctx.add_rollback(
                    format!("cancel reservation for item {item_id}"),
                    move || {
                        Box::pin(async move {
                            ledger
                                .cancel_reservation(company_id, item_id, shipment_id)
                                .await
                                .map(|_| ())
                                .map_err(|err| err.to_string())
                        })
                    },
                );
            }
        }

        self.shipments.insert(shipment.clone()).await?;
        {
            let repo = self.shipments.clone();
            let shipment_id = shipment.id;
            ctx.add_rollback(format!("delete shipment {shipment_id}"), move || {
                Box::pin(async move {
                    repo.delete(company_id, shipment_id)
                        .await
                        .map_err(|err| err.to_string())
                })
            });
        }

        let entry_id = self
            .activity
            .record(
                company_id,
                ActivityType::ShipmentCreated,
                format!(
                    "Created {} shipment {}",
                    shipment.movement_type, shipment.shipment_number
                ),
                Some(ActivityReference::new(shipment.id, "shipment")),
                serde_json::json!({
                    "shipment_number": shipment.shipment_number,
                    "items": shipment.items.len(),
                }),
            )
            .await?;
        self.register_log_erase(&ctx, company_id, entry_id);

        tracing::info!(
            shipment_id = %shipment.id,
            number = %shipment.shipment_number,
            "shipment created"
        );
        Ok(shipment)
    }

    async fn run_update(
        &self,
        ctx: SagaContext,
        company_id: CompanyId,
        mut shipment: Shipment,
        new_status: ShipmentStatus,
    ) -> Result<Shipment, ShipmentError> {
        let prev_status = shipment.status;
        let prev_delivered_at = shipment.delivered_at;
        let lines = shipment.items.clone();

        match (shipment.movement_type, new_status) {
            (MovementType::Outbound, ShipmentStatus::Delivered) => {
                // Consume each hold; the undo puts the stock back into
                // reserved and reactivates the row.
                for line in &lines {
                    self.reservations
                        .fulfill_reservation(company_id, line.inventory_item_id, shipment.id)
                        .await?;

                    let ledger = self.reservations.clone();
                    let item_id = line.inventory_item_id;
                    let shipment_id = shipment.id;
                    let quantity = line.quantity;
                    ctx.add_rollback(
                        format!("restore reservation for item {item_id}"),
                        move || {
                            Box::pin(async move {
                                ledger
                                    .restore_reservation(company_id, item_id, shipment_id, quantity)
                                    .await
                                    .map(|_| ())
                                    .map_err(|err| err.to_string())
                            })
                        },
                    );
                }

                self.apply_status(&ctx, company_id, &mut shipment, new_status, prev_status, prev_delivered_at)
                    .await?;

                for line in &lines {
                    let entry_id = self
                        .activity
                        .record(
                            company_id,
                            ActivityType::InventoryOut,
                            format!("Shipped {} x {}", line.quantity, line.name),
                            Some(ActivityReference::new(
                                line.inventory_item_id,
                                "inventory_item",
                            )),
                            serde_json::json!({
                                "shipment_id": shipment.id.to_string(),
                                "quantity": line.quantity,
                            }),
                        )
                        .await?;
                    self.register_log_erase(&ctx, company_id, entry_id);
                }
                let entry_id = self
                    .record_shipment_event(
                        company_id,
                        &shipment,
                        ActivityType::ShipmentDelivered,
                        format!("Shipment {} delivered", shipment.shipment_number),
                    )
                    .await?;
                self.register_log_erase(&ctx, company_id, entry_id);
            }

            (MovementType::Inbound, ShipmentStatus::Delivered) => {
                // Receive each line; the undo stocks the same quantity back out.
                for line in &lines {
                    self.inventory
                        .stock_in(company_id, line.inventory_item_id, line.quantity)
                        .await?;

                    let ledger = self.inventory.clone();
                    let item_id = line.inventory_item_id;
                    let quantity = line.quantity;
                    ctx.add_rollback(format!("stock out item {item_id}"), move || {
                        Box::pin(async move {
                            ledger
                                .stock_out(company_id, item_id, quantity)
                                .await
                                .map(|_| ())
                                .map_err(|err| err.to_string())
                        })
                    });
                }

                self.apply_status(&ctx, company_id, &mut shipment, new_status, prev_status, prev_delivered_at)
                    .await?;

                let entry_id = self
                    .record_shipment_event(
                        company_id,
                        &shipment,
                        ActivityType::ShipmentDelivered,
                        format!("Shipment {} delivered", shipment.shipment_number),
                    )
                    .await?;
                self.register_log_erase(&ctx, company_id, entry_id);
            }

            (movement, ShipmentStatus::Cancelled) => {
                if movement == MovementType::Outbound {
                    // Best-effort: a missing hold only warns and never
                    // blocks the cancellation.
                    for line in &lines {
                        let released = self
                            .reservations
                            .cancel_reservation(company_id, line.inventory_item_id, shipment.id)
                            .await?;
                        match released {
                            Some(reservation) => {
                                let ledger = self.reservations.clone();
                                let item_id = line.inventory_item_id;
                                let shipment_id = shipment.id;
                                let quantity = reservation.quantity;
                                ctx.add_rollback(
                                    format!("re-reserve item {item_id}"),
                                    move || {
                                        Box::pin(async move {
                                            ledger
                                                .create_reservation(
                                                    company_id,
                                                    item_id,
                                                    shipment_id,
                                                    quantity,
                                                )
                                                .await
                                                .map(|_| ())
                                                .map_err(|err| err.to_string())
                                        })
                                    },
                                );
                            }
                            None => tracing::warn!(
                                shipment_id = %shipment.id,
                                item_id = %line.inventory_item_id,
                                "no active reservation to release"
                            ),
                        }
                    }
                }

                self.apply_status(&ctx, company_id, &mut shipment, new_status, prev_status, prev_delivered_at)
                    .await?;

                let entry_id = self
                    .record_shipment_event(
                        company_id,
                        &shipment,
                        ActivityType::ShipmentCancelled,
                        format!("Shipment {} cancelled", shipment.shipment_number),
                    )
                    .await?;
                self.register_log_erase(&ctx, company_id, entry_id);
            }

            (_, ShipmentStatus::InTransit) => {
                self.apply_status(&ctx, company_id, &mut shipment, new_status, prev_status, prev_delivered_at)
                    .await?;

                let entry_id = self
                    .record_shipment_event(
                        company_id,
                        &shipment,
                        ActivityType::ShipmentUpdated,
                        format!("Shipment {} is in transit", shipment.shipment_number),
                    )
                    .await?;
                self.register_log_erase(&ctx, company_id, entry_id);
            }

            // The guard never lets a shipment move back to pending.
            (_, ShipmentStatus::Pending) => {
                return Err(TransitionError {
                    from: prev_status,
                    to: new_status,
                }
                .into());
            }
        }

        tracing::info!(
            shipment_id = %shipment.id,
            from = %prev_status,
            to = %new_status,
            "shipment status updated"
        );
        Ok(shipment)
    }

    /// Persists the status change and registers the status-restore undo.
    ///
    /// Called after the branch's inventory mutations registered theirs, so
    /// the LIFO sweep restores the status first and inventory second: each
    /// undo then observes the state it was registered against.
    async fn apply_status(
        &self,
        ctx: &SagaContext,
        company_id: CompanyId,
        shipment: &mut Shipment,
        new_status: ShipmentStatus,
        prev_status: ShipmentStatus,
        prev_delivered_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<(), ShipmentError> {
        shipment.transition_to(new_status)?;
        self.shipments.save(company_id, shipment).await?;

        let repo = self.shipments.clone();
        let shipment_id = shipment.id;
        ctx.add_rollback(
            format!("restore shipment {shipment_id} to {prev_status}"),
            move || {
                Box::pin(async move {
                    match repo.find(company_id, shipment_id).await {
                        Ok(Some(mut stored)) => {
                            stored.restore_status(prev_status, prev_delivered_at);
                            repo.save(company_id, &stored)
                                .await
                                .map_err(|err| err.to_string())
                        }
                        Ok(None) => Err(format!("shipment {shipment_id} missing during rollback")),
                        Err(err) => Err(err.to_string()),
                    }
                })
            },
        );
        Ok(())
    }

    async fn record_shipment_event(
        &self,
        company_id: CompanyId,
        shipment: &Shipment,
        activity_type: ActivityType,
        description: String,
    ) -> Result<ActivityLogId, ShipmentError> {
        let entry_id = self
            .activity
            .record(
                company_id,
                activity_type,
                description,
                Some(ActivityReference::new(shipment.id, "shipment")),
                serde_json::json!({
                    "shipment_number": shipment.shipment_number,
                    "status": shipment.status.as_str(),
                }),
            )
            .await?;
        Ok(entry_id)
    }

    fn register_log_erase(
        &self,
        ctx: &SagaContext,
        company_id: CompanyId,
        entry_id: ActivityLogId,
    ) {
        let recorder = self.activity.clone();
        ctx.add_rollback(format!("erase activity entry {entry_id}"), move || {
            Box::pin(async move {
                recorder
                    .erase(company_id, entry_id)
                    .await
                    .map_err(|err| err.to_string())
            })
        });
    }
}
