use std::sync::Arc;

use tracing::{info, warn};

use crate::models::delivery::{RouteEstimate, RouteInfo};
use crate::routing::RoutingProvider;

/// Best-effort route enrichment for delivery creation.
///
/// Every provider failure degrades instead of propagating: a failed geocode
/// drops all route data, a failed matrix lookup keeps the coordinates only.
/// Creation availability must not depend on the routing provider.
pub struct RouteEstimator {
    provider: Arc<dyn RoutingProvider>,
}

impl RouteEstimator {
    pub fn new(provider: Arc<dyn RoutingProvider>) -> Self {
        Self { provider }
    }

    pub async fn enrich(
        &self,
        restaurant_address: &str,
        customer_address: &str,
    ) -> Option<RouteInfo> {
        let restaurant = match self.provider.geocode(restaurant_address).await {
            Ok(coords) => coords,
            Err(err) => {
                warn!(
                    address = restaurant_address,
                    error = %err,
                    "restaurant geocoding failed, delivery proceeds without route data"
                );
                return None;
            }
        };

        let customer = match self.provider.geocode(customer_address).await {
            Ok(coords) => coords,
            Err(err) => {
                warn!(
                    address = customer_address,
                    error = %err,
                    "customer geocoding failed, delivery proceeds without route data"
                );
                return None;
            }
        };

        let estimate = match self
            .provider
            .distance_and_duration(restaurant, customer)
            .await
        {
            Ok(distance) => {
                info!(
                    distance_km = distance.distance_km,
                    eta_minutes = distance.eta_minutes,
                    "route estimated"
                );
                Some(RouteEstimate {
                    distance_km: distance.distance_km,
                    eta_minutes: distance.eta_minutes,
                    tracking_url: self.provider.tracking_url(restaurant, customer),
                })
            }
            Err(err) => {
                warn!(error = %err, "distance matrix lookup failed, keeping coordinates only");
                None
            }
        };

        Some(RouteInfo {
            restaurant_coordinates: restaurant,
            customer_coordinates: customer,
            estimate,
        })
    }
}
