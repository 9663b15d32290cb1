use std::sync::Arc;

use crate::observability::metrics::Metrics;
use crate::service::DeliveryService;
use crate::store::DeliveryStore;

pub struct AppState {
    pub service: DeliveryService,
    pub store: Arc<DeliveryStore>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(service: DeliveryService, store: Arc<DeliveryStore>, metrics: Arc<Metrics>) -> Self {
        Self {
            service,
            store,
            metrics,
        }
    }
}
