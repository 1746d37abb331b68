//! Simulate a Jackson network one transition at a time.
//!
//! # Transitions
//!
//! Each call to [Network::step] performs one iteration of Gillespie's direct method using three
//! independent uniform draws:
//!
//! 1. Sum the output rate of every station (`R`).
//! 2. Draw the holding time `-ln(1 - u1) / R` (the time until the next event anywhere).
//! 3. Credit every service station with `occupancy * holding` (pre-transition occupancy).
//! 4. Select the firing station: the first whose cumulative rate (normalized by `R`) exceeds `u2`.
//! 5. Select the destination: the first whose cumulative routing probability exceeds `u3`.
//! 6. Move one entity from the firing station to the destination and advance the clock.
//!
//! Routing to the [crate::SOURCE] removes the entity from the network.

use crate::{
    metrics::Metrics,
    routing::{self, Routing},
    Error, Queue, Station, UniformSource, SOURCE,
};
use prometheus_client::registry::Registry;
use tracing::{debug, trace};

/// Default tolerance when checking that routing rows sum to 1.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Initial number of entities at each service station.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitialOccupancy {
    /// Every service station starts with the same occupancy.
    All(u64),
    /// Entry `k` is the occupancy of service station `k + 1`.
    Each(Vec<u64>),
}

/// Configuration for a [Network].
#[derive(Clone, Debug)]
pub struct Config {
    /// Rate of the external arrival process (must be positive).
    pub arrival_rate: f64,

    /// Service stations, in index order (station `k` is `queues[k - 1]`).
    pub queues: Vec<Queue>,

    /// Raw routing probabilities with one row and one column per station (source first).
    ///
    /// Column 0 is the probability of leaving the network.
    pub routing: Vec<Vec<f64>>,

    /// Occupancy overriding the one carried by each [Queue].
    pub initial: Option<InitialOccupancy>,

    /// Allowed deviation of each routing row sum from 1 (at most [crate::MAX_TOLERANCE]).
    pub tolerance: f64,
}

impl Config {
    /// Create a configuration with default occupancy and tolerance.
    pub fn new(arrival_rate: f64, queues: Vec<Queue>, routing: Vec<Vec<f64>>) -> Self {
        Self {
            arrival_rate,
            queues,
            routing,
            initial: None,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// A single transition of the chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// Time spent in the previous state.
    pub holding: f64,
    /// Station that produced the departure.
    pub origin: usize,
    /// Station the departing entity was routed to.
    pub destination: usize,
}

impl Transition {
    /// Returns true if an entity entered the network.
    pub fn is_arrival(&self) -> bool {
        self.origin == SOURCE
    }

    /// Returns true if an entity left the network.
    pub fn is_exit(&self) -> bool {
        self.destination == SOURCE
    }
}

/// A Jackson network driven by a [UniformSource].
pub struct Network<U: UniformSource> {
    uniform: U,
    stations: Vec<Station>,
    routing: Routing,

    clock: f64,
    steps: u64,

    // Statistics since the last reset (per service station)
    window: f64,
    occupied: Vec<f64>,
    busy: Vec<f64>,
    departures: Vec<u64>,
    arrivals: u64,
    exits: u64,

    rates: Vec<f64>,
    metrics: Metrics,
}

impl<U: UniformSource> Network<U> {
    /// Build a network from `cfg`, drawing all randomness from `uniform`.
    ///
    /// The [Station::Source] is placed at index [SOURCE], followed by `cfg.queues`.
    pub fn new(uniform: U, cfg: &Config) -> Result<Self, Error> {
        if !cfg.arrival_rate.is_finite() || cfg.arrival_rate <= 0.0 {
            return Err(Error::InvalidArrivalRate(cfg.arrival_rate));
        }
        let mut queues = cfg.queues.clone();
        for (k, queue) in queues.iter().enumerate() {
            queue.validate(k + 1)?;
        }
        match &cfg.initial {
            None => {}
            Some(InitialOccupancy::All(occupancy)) => {
                for queue in &mut queues {
                    queue.set_occupancy(*occupancy);
                }
            }
            Some(InitialOccupancy::Each(occupancies)) => {
                if occupancies.len() != queues.len() {
                    return Err(Error::InitialOccupancyLength(
                        occupancies.len(),
                        queues.len(),
                    ));
                }
                for (queue, occupancy) in queues.iter_mut().zip(occupancies) {
                    queue.set_occupancy(*occupancy);
                }
            }
        }

        // Build stations
        let mut stations = Vec::with_capacity(queues.len() + 1);
        stations.push(Station::Source {
            arrival_rate: cfg.arrival_rate,
        });
        stations.extend(queues.into_iter().map(Station::Queue));
        let routing = Routing::new(&cfg.routing, stations.len(), cfg.tolerance)?;

        let metrics = Metrics::default();
        for (index, station) in stations.iter().enumerate() {
            if let Some(occupancy) = station.occupancy() {
                metrics.set_occupancy(index, occupancy);
            }
        }
        let queues = stations.len() - 1;
        debug!(
            queues,
            arrival_rate = cfg.arrival_rate,
            "initialized network"
        );

        Ok(Self {
            uniform,
            rates: Vec::with_capacity(stations.len()),
            stations,
            routing,
            clock: 0.0,
            steps: 0,
            window: 0.0,
            occupied: vec![0.0; queues],
            busy: vec![0.0; queues],
            departures: vec![0; queues],
            arrivals: 0,
            exits: 0,
            metrics,
        })
    }

    /// Register the network's metrics with `registry`.
    pub fn register(&self, registry: &mut Registry) {
        self.metrics.register(registry);
    }

    /// Advance the chain by one transition.
    ///
    /// On error, no station, clock, or statistic has been modified.
    pub fn step(&mut self) -> Result<Transition, Error> {
        // Aggregate output rates
        self.rates.clear();
        let mut total = 0.0;
        for station in &self.stations {
            total += station.output_rate();
            self.rates.push(total);
        }
        if !total.is_finite() || total <= 0.0 {
            return Err(Error::NoActivity(total));
        }

        // Draw independent uniforms for the holding time, the firing station, and the destination
        let u1 = self.draw()?;
        let u2 = self.draw()?;
        let u3 = self.draw()?;
        let holding = -(1.0 - u1).ln() / total;

        // Select firing station (the last entry normalizes to exactly 1)
        for rate in &mut self.rates {
            *rate /= total;
        }
        let origin = routing::select(&self.rates, u2).ok_or(Error::InvalidDraw(u2))?;
        let destination = self
            .routing
            .select(origin, u3)
            .ok_or(Error::InvalidDraw(u3))?;

        // Idle stations have no output rate and are never selected
        if self.stations[origin].occupancy() == Some(0) {
            return Err(Error::EmptyQueue);
        }

        // Accumulate time spent at the current occupancy
        for (k, station) in self.stations[1..].iter().enumerate() {
            if let Station::Queue(queue) = station {
                self.occupied[k] += queue.occupancy() as f64 * holding;
                self.busy[k] += queue.busy() as f64 * holding;
            }
        }

        // Apply transition
        self.stations[origin].decrease_occupancy()?;
        self.stations[destination].increase_occupancy();
        self.clock += holding;
        self.window += holding;
        self.steps += 1;
        if origin == SOURCE {
            self.arrivals += 1;
        } else {
            self.departures[origin - 1] += 1;
        }
        if destination == SOURCE {
            self.exits += 1;
        }
        self.record(origin, destination);
        trace!(origin, destination, holding, clock = self.clock, "transition");

        Ok(Transition {
            holding,
            origin,
            destination,
        })
    }

    /// Perform `steps` transitions.
    pub fn run(&mut self, steps: u64) -> Result<(), Error> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<f64, Error> {
        let u = self.uniform.next_uniform();
        if !(u > 0.0 && u < 1.0) {
            return Err(Error::InvalidDraw(u));
        }
        Ok(u)
    }

    fn record(&self, origin: usize, destination: usize) {
        self.metrics.transitions.inc();
        self.metrics.clock.set(self.clock);
        if origin == SOURCE {
            self.metrics.arrivals.inc();
        }
        if destination == SOURCE {
            self.metrics.exits.inc();
        }
        for index in [origin, destination] {
            if let Some(occupancy) = self.stations[index].occupancy() {
                self.metrics.set_occupancy(index, occupancy);
            }
        }
    }

    /// Discard all statistics gathered so far (e.g. after a warm-up period).
    ///
    /// Occupancy and the clock are left untouched.
    pub fn reset_statistics(&mut self) {
        debug!(clock = self.clock, window = self.window, "reset statistics");
        self.window = 0.0;
        self.occupied.iter_mut().for_each(|t| *t = 0.0);
        self.busy.iter_mut().for_each(|t| *t = 0.0);
        self.departures.iter_mut().for_each(|d| *d = 0);
        self.arrivals = 0;
        self.exits = 0;
    }

    /// Time-averaged number of entities at each service station (entry `k` is station `k + 1`).
    pub fn averages(&self) -> Result<Vec<f64>, Error> {
        let window = self.elapsed()?;
        Ok(self.occupied.iter().map(|t| t / window).collect())
    }

    /// Time-averaged number of entities at service station `index`.
    pub fn average(&self, index: usize) -> Result<f64, Error> {
        let k = self.queue_index(index)?;
        Ok(self.occupied[k] / self.elapsed()?)
    }

    /// Time-averaged fraction of busy servers at each service station.
    pub fn utilizations(&self) -> Result<Vec<f64>, Error> {
        let window = self.elapsed()?;
        Ok(self
            .busy
            .iter()
            .zip(&self.stations[1..])
            .map(|(t, station)| match station {
                Station::Queue(queue) => t / (window * queue.servers() as f64),
                Station::Source { .. } => 0.0,
            })
            .collect())
    }

    /// Departures per unit time from each service station.
    pub fn throughputs(&self) -> Result<Vec<f64>, Error> {
        let window = self.elapsed()?;
        Ok(self
            .departures
            .iter()
            .map(|d| *d as f64 / window)
            .collect())
    }

    /// Entities leaving the network per unit time.
    pub fn exit_rate(&self) -> Result<f64, Error> {
        Ok(self.exits as f64 / self.elapsed()?)
    }

    fn elapsed(&self) -> Result<f64, Error> {
        if self.window <= 0.0 {
            return Err(Error::NoData);
        }
        Ok(self.window)
    }

    fn queue_index(&self, index: usize) -> Result<usize, Error> {
        if index == SOURCE || index >= self.stations.len() {
            return Err(Error::UnknownStation(index));
        }
        Ok(index - 1)
    }

    /// Simulated time elapsed since construction.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Simulated time elapsed since the last statistics reset.
    pub fn window(&self) -> f64 {
        self.window
    }

    /// Number of transitions performed since construction.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Entities that entered the network since the last statistics reset.
    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    /// Entities that left the network since the last statistics reset.
    pub fn exits(&self) -> u64 {
        self.exits
    }

    /// Current occupancy of service station `index`.
    pub fn occupancy(&self, index: usize) -> Result<u64, Error> {
        self.queue_index(index)?;
        self.stations[index]
            .occupancy()
            .ok_or(Error::UnknownStation(index))
    }

    /// Current occupancy of every service station (entry `k` is station `k + 1`).
    pub fn occupancies(&self) -> Vec<u64> {
        self.stations.iter().filter_map(Station::occupancy).collect()
    }

    /// Total output rate of the current state.
    pub fn total_rate(&self) -> f64 {
        self.stations.iter().map(Station::output_rate).sum()
    }

    /// All stations, [SOURCE] first.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// The cumulative routing matrix.
    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    /// The underlying uniform source.
    pub fn uniform(&self) -> &U {
        &self.uniform
    }
}
