//! Stations of a Jackson network.

use crate::Error;

/// An M/M/s queue with an unbounded waiting room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Queue {
    service_rate: f64,
    servers: u32,
    occupancy: u64,
}

impl Queue {
    /// Create an empty queue served by `servers` parallel servers, each completing work at
    /// `service_rate`.
    ///
    /// Parameters are validated when the queue is added to a [crate::Network].
    pub fn new(service_rate: f64, servers: u32) -> Self {
        Self {
            service_rate,
            servers,
            occupancy: 0,
        }
    }

    /// Seed the queue with `occupancy` entities.
    pub fn with_occupancy(mut self, occupancy: u64) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Completion rate of a single busy server.
    pub fn service_rate(&self) -> f64 {
        self.service_rate
    }

    /// Number of parallel servers.
    pub fn servers(&self) -> u32 {
        self.servers
    }

    /// Number of entities at the queue (waiting or in service).
    pub fn occupancy(&self) -> u64 {
        self.occupancy
    }

    /// Number of servers currently working.
    pub fn busy(&self) -> u64 {
        self.occupancy.min(self.servers as u64)
    }

    /// Rate at which the queue currently completes service.
    pub fn output_rate(&self) -> f64 {
        self.service_rate * self.busy() as f64
    }

    pub(crate) fn set_occupancy(&mut self, occupancy: u64) {
        self.occupancy = occupancy;
    }

    pub(crate) fn validate(&self, index: usize) -> Result<(), Error> {
        if !self.service_rate.is_finite() || self.service_rate < 0.0 {
            return Err(Error::InvalidServiceRate(index, self.service_rate));
        }
        if self.servers == 0 {
            return Err(Error::NoServers(index));
        }
        Ok(())
    }
}

/// A station of a [crate::Network].
///
/// Both variants expose the same capabilities. The [Station::Source] models an unbounded
/// external population, so its occupancy never changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Station {
    /// External arrival process producing departures at a constant rate.
    Source { arrival_rate: f64 },
    /// A service station.
    Queue(Queue),
}

impl Station {
    /// Rate at which the station currently produces departures.
    pub fn output_rate(&self) -> f64 {
        match self {
            Self::Source { arrival_rate } => *arrival_rate,
            Self::Queue(queue) => queue.output_rate(),
        }
    }

    /// Number of entities at the station (`None` for the [Station::Source]).
    pub fn occupancy(&self) -> Option<u64> {
        match self {
            Self::Source { .. } => None,
            Self::Queue(queue) => Some(queue.occupancy),
        }
    }

    /// Returns true if this is the [Station::Source].
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source { .. })
    }

    /// Admit one entity (no-op for the [Station::Source]).
    pub fn increase_occupancy(&mut self) {
        if let Self::Queue(queue) = self {
            queue.occupancy += 1;
        }
    }

    /// Release one entity (no-op for the [Station::Source]).
    ///
    /// Fails if the queue is already empty.
    pub fn decrease_occupancy(&mut self) -> Result<(), Error> {
        if let Self::Queue(queue) = self {
            queue.occupancy = queue.occupancy.checked_sub(1).ok_or(Error::EmptyQueue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_rate_single_server() {
        let mut station = Station::Queue(Queue::new(40.0, 1));
        assert_eq!(station.output_rate(), 0.0);
        station.increase_occupancy();
        assert_eq!(station.output_rate(), 40.0);

        // Extra entities wait and do not add capacity
        station.increase_occupancy();
        station.increase_occupancy();
        assert_eq!(station.output_rate(), 40.0);
        assert_eq!(station.occupancy(), Some(3));
    }

    #[test]
    fn test_output_rate_multi_server() {
        let queue = Queue::new(2.5, 3);
        assert_eq!(queue.with_occupancy(1).output_rate(), 2.5);
        assert_eq!(queue.with_occupancy(2).output_rate(), 5.0);
        assert_eq!(queue.with_occupancy(3).output_rate(), 7.5);
        assert_eq!(queue.with_occupancy(10).output_rate(), 7.5);
        assert_eq!(queue.with_occupancy(10).busy(), 3);
    }

    #[test]
    fn test_decrease_empty_queue() {
        let mut station = Station::Queue(Queue::new(1.0, 1));
        assert_eq!(station.decrease_occupancy(), Err(Error::EmptyQueue));
        assert_eq!(station.occupancy(), Some(0));

        station.increase_occupancy();
        assert!(station.decrease_occupancy().is_ok());
        assert_eq!(station.occupancy(), Some(0));
    }

    #[test]
    fn test_source_is_unbounded() {
        let mut source = Station::Source { arrival_rate: 20.0 };
        assert!(source.is_source());
        assert_eq!(source.output_rate(), 20.0);

        // Mutators never change the source
        source.increase_occupancy();
        assert!(source.decrease_occupancy().is_ok());
        assert!(source.decrease_occupancy().is_ok());
        assert_eq!(source, Station::Source { arrival_rate: 20.0 });
        assert_eq!(source.occupancy(), None);
        assert_eq!(source.output_rate(), 20.0);
    }

    #[test]
    fn test_validate() {
        assert!(Queue::new(0.0, 1).validate(1).is_ok());
        assert_eq!(
            Queue::new(-1.0, 1).validate(2),
            Err(Error::InvalidServiceRate(2, -1.0))
        );
        assert!(matches!(
            Queue::new(f64::NAN, 1).validate(1),
            Err(Error::InvalidServiceRate(1, _))
        ));
        assert_eq!(Queue::new(1.0, 0).validate(3), Err(Error::NoServers(3)));
    }
}
