use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::{Delivery, DeliveryStatus};

/// A lifecycle event requested against a delivery.
#[derive(Debug, Clone)]
pub enum DeliveryEvent {
    Assign { driver_id: Uuid, driver_name: String },
    Pickup,
    Transit,
    Deliver,
    Cancel { reason: String },
}

impl DeliveryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DeliveryEvent::Assign { .. } => "assign",
            DeliveryEvent::Pickup => "pickup",
            DeliveryEvent::Transit => "transit",
            DeliveryEvent::Deliver => "deliver",
            DeliveryEvent::Cancel { .. } => "cancel",
        }
    }
}

/// Applies `event` to `delivery` if the transition table allows it.
///
/// Legal edges:
///   PENDING    --assign-->  ASSIGNED   (sets assigned_at)
///   ASSIGNED   --pickup-->  PICKED_UP  (sets picked_up_at)
///   PICKED_UP  --transit--> IN_TRANSIT
///   IN_TRANSIT --deliver--> DELIVERED  (sets delivered_at)
///   any non-terminal --cancel--> CANCELLED (appends reason to notes)
///
/// Any other combination fails with `InvalidTransition` and leaves the
/// record unmodified. Every applied transition refreshes `updated_at`.
pub fn apply(
    delivery: &mut Delivery,
    event: DeliveryEvent,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    match (delivery.status, event) {
        (
            DeliveryStatus::Pending,
            DeliveryEvent::Assign {
                driver_id,
                driver_name,
            },
        ) => {
            delivery.driver_id = Some(driver_id);
            delivery.driver_name = Some(driver_name);
            delivery.status = DeliveryStatus::Assigned;
            delivery.assigned_at = Some(now);
        }
        (DeliveryStatus::Assigned, DeliveryEvent::Pickup) => {
            delivery.status = DeliveryStatus::PickedUp;
            delivery.picked_up_at = Some(now);
        }
        (DeliveryStatus::PickedUp, DeliveryEvent::Transit) => {
            delivery.status = DeliveryStatus::InTransit;
        }
        (DeliveryStatus::InTransit, DeliveryEvent::Deliver) => {
            delivery.status = DeliveryStatus::Delivered;
            delivery.delivered_at = Some(now);
        }
        (from, DeliveryEvent::Cancel { reason }) if !from.is_terminal() => {
            delivery.status = DeliveryStatus::Cancelled;
            delivery.notes = Some(match delivery.notes.take() {
                Some(existing) => format!("{existing} | Cancelled: {reason}"),
                None => format!("Cancelled: {reason}"),
            });
        }
        (from, event) => {
            return Err(AppError::InvalidTransition {
                from,
                event: event.name(),
            });
        }
    }

    delivery.updated_at = now;
    Ok(())
}
