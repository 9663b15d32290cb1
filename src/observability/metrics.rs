use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub deliveries_created_total: IntCounterVec,
    pub delivery_transitions_total: IntCounterVec,
    pub route_enrichment_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let deliveries_created_total = IntCounterVec::new(
            Opts::new(
                "deliveries_created_total",
                "Deliveries created, by route enrichment outcome",
            ),
            &["enrichment"],
        )
        .expect("valid deliveries_created_total metric");

        let delivery_transitions_total = IntCounterVec::new(
            Opts::new(
                "delivery_transitions_total",
                "Lifecycle transitions by event and outcome",
            ),
            &["event", "outcome"],
        )
        .expect("valid delivery_transitions_total metric");

        let route_enrichment_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "route_enrichment_seconds",
                "Latency of route enrichment at delivery creation in seconds",
            ),
            &["outcome"],
        )
        .expect("valid route_enrichment_seconds metric");

        registry
            .register(Box::new(deliveries_created_total.clone()))
            .expect("register deliveries_created_total");
        registry
            .register(Box::new(delivery_transitions_total.clone()))
            .expect("register delivery_transitions_total");
        registry
            .register(Box::new(route_enrichment_seconds.clone()))
            .expect("register route_enrichment_seconds");

        Self {
            registry,
            deliveries_created_total,
            delivery_transitions_total,
            route_enrichment_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
