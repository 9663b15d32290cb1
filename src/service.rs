use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::lifecycle::{self, DeliveryEvent};
use crate::models::delivery::{Delivery, DeliveryStatus, RouteInfo};
use crate::observability::metrics::Metrics;
use crate::routing::estimator::RouteEstimator;
use crate::store::DeliveryStore;

#[derive(Debug, Clone)]
pub struct NewDelivery {
    pub order_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub restaurant_address: String,
    pub customer_address: String,
    pub notes: Option<String>,
}

/// Entry point for everything that happens to a delivery record: creation
/// (with best-effort route enrichment), lifecycle transitions and queries.
pub struct DeliveryService {
    store: Arc<DeliveryStore>,
    estimator: RouteEstimator,
    metrics: Arc<Metrics>,
}

fn enrichment_outcome(route: &Option<RouteInfo>) -> &'static str {
    match route {
        Some(info) if info.estimate.is_some() => "full",
        Some(_) => "partial",
        None => "none",
    }
}

impl DeliveryService {
    pub fn new(
        store: Arc<DeliveryStore>,
        estimator: RouteEstimator,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            estimator,
            metrics,
        }
    }

    pub async fn create(&self, request: NewDelivery) -> Result<Delivery, AppError> {
        info!(order_id = %request.order_id, "creating delivery");

        // Fail fast before the provider round-trips; the store re-checks
        // atomically on insert.
        if self.store.exists_by_order_id(request.order_id) {
            return Err(AppError::DuplicateOrder(request.order_id));
        }

        let started = Instant::now();
        let route = self
            .estimator
            .enrich(&request.restaurant_address, &request.customer_address)
            .await;
        let outcome = enrichment_outcome(&route);
        self.metrics
            .route_enrichment_seconds
            .with_label_values(&[outcome])
            .observe(started.elapsed().as_secs_f64());

        let now = Utc::now();
        let delivery = Delivery {
            id: Uuid::new_v4(),
            order_id: request.order_id,
            driver_id: request.driver_id,
            driver_name: None,
            restaurant_address: request.restaurant_address,
            customer_address: request.customer_address,
            route,
            status: DeliveryStatus::Pending,
            assigned_at: None,
            picked_up_at: None,
            delivered_at: None,
            notes: request.notes,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        let saved = self.store.insert(delivery)?;
        self.metrics
            .deliveries_created_total
            .with_label_values(&[outcome])
            .inc();
        info!(delivery_id = %saved.id, enrichment = outcome, "delivery created");

        Ok(saved)
    }

    pub fn assign(
        &self,
        id: Uuid,
        driver_id: Uuid,
        driver_name: String,
    ) -> Result<Delivery, AppError> {
        self.transition(
            id,
            DeliveryEvent::Assign {
                driver_id,
                driver_name,
            },
        )
    }

    pub fn pickup(&self, id: Uuid) -> Result<Delivery, AppError> {
        self.transition(id, DeliveryEvent::Pickup)
    }

    pub fn transit(&self, id: Uuid) -> Result<Delivery, AppError> {
        self.transition(id, DeliveryEvent::Transit)
    }

    pub fn deliver(&self, id: Uuid) -> Result<Delivery, AppError> {
        self.transition(id, DeliveryEvent::Deliver)
    }

    pub fn cancel(&self, id: Uuid, reason: String) -> Result<Delivery, AppError> {
        self.transition(id, DeliveryEvent::Cancel { reason })
    }

    fn transition(&self, id: Uuid, event: DeliveryEvent) -> Result<Delivery, AppError> {
        let event_name = event.name();

        let result = self.apply_transition(id, event);
        let outcome = if result.is_ok() { "success" } else { "error" };
        self.metrics
            .delivery_transitions_total
            .with_label_values(&[event_name, outcome])
            .inc();

        result
    }

    fn apply_transition(&self, id: Uuid, event: DeliveryEvent) -> Result<Delivery, AppError> {
        let mut delivery = self
            .store
            .find_by_id(id)
            .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))?;

        let from = delivery.status;
        lifecycle::apply(&mut delivery, event, Utc::now())?;
        let saved = self.store.update(delivery)?;

        info!(
            delivery_id = %id,
            from = %from,
            to = %saved.status,
            "delivery transitioned"
        );
        Ok(saved)
    }

    pub fn get(&self, id: Uuid) -> Result<Delivery, AppError> {
        self.store
            .find_by_id(id)
            .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))
    }

    pub fn get_by_order(&self, order_id: Uuid) -> Result<Delivery, AppError> {
        self.store
            .find_by_order_id(order_id)
            .ok_or_else(|| AppError::NotFound(format!("delivery not found for order {order_id}")))
    }

    pub fn list_by_driver(&self, driver_id: Uuid) -> Vec<Delivery> {
        self.store.find_by_driver_id(driver_id)
    }

    /// Active means currently on the road for this driver.
    pub fn list_active_by_driver(&self, driver_id: Uuid) -> Vec<Delivery> {
        self.store
            .find_by_driver_and_status(driver_id, DeliveryStatus::InTransit)
    }

    pub fn list_by_status(&self, status: DeliveryStatus) -> Vec<Delivery> {
        self.store.find_by_status(status)
    }

    pub fn list_all(&self) -> Vec<Delivery> {
        self.store.find_all()
    }
}
