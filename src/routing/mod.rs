pub mod client;
pub mod estimator;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::delivery::{Coordinates, DistanceEstimate};

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing provider unavailable: {0}")]
    Unavailable(String),

    #[error("no match found for address: {0}")]
    NoMatch(String),
}

/// Outbound routing provider seam.
///
/// Implementations are stateless between calls and never retry; callers
/// own the degrade policy. `RoutingError` stays inside the routing layer:
/// the estimator absorbs it, so delivery creation can never fail because
/// the provider is down.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Resolves a free-text address to its single best-match coordinates.
    async fn geocode(&self, address: &str) -> Result<Coordinates, RoutingError>;

    /// Two-point distance/duration query, origin to destination.
    async fn distance_and_duration(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<DistanceEstimate, RoutingError>;

    /// Map link for following the route. Pure string construction.
    fn tracking_url(&self, origin: Coordinates, destination: Coordinates) -> String;
}
