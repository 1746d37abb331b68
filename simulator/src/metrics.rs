use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, gauge::Gauge},
    registry::Registry,
};
use std::sync::atomic::AtomicU64;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct Station {
    pub station: String,
}

impl Station {
    pub fn new(index: usize) -> Self {
        Self {
            station: index.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Metrics {
    pub transitions: Counter,
    pub arrivals: Counter,
    pub exits: Counter,
    pub clock: Gauge<f64, AtomicU64>,
    pub occupancy: Family<Station, Gauge>,
}

impl Metrics {
    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "transitions",
            "Total number of transitions simulated",
            self.transitions.clone(),
        );
        registry.register(
            "arrivals",
            "Total number of entities that entered the network",
            self.arrivals.clone(),
        );
        registry.register(
            "exits",
            "Total number of entities that left the network",
            self.exits.clone(),
        );
        registry.register("clock", "Simulated time elapsed", self.clock.clone());
        registry.register(
            "occupancy",
            "Number of entities at each service station",
            self.occupancy.clone(),
        );
    }

    pub fn set_occupancy(&self, index: usize, occupancy: u64) {
        self.occupancy
            .get_or_create(&Station::new(index))
            .set(i64::try_from(occupancy).unwrap_or(i64::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupancy_saturates() {
        let metrics = Metrics::default();
        metrics.set_occupancy(1, 7);
        assert_eq!(metrics.occupancy.get_or_create(&Station::new(1)).get(), 7);

        metrics.set_occupancy(1, u64::MAX);
        assert_eq!(
            metrics.occupancy.get_or_create(&Station::new(1)).get(),
            i64::MAX
        );
    }
}
