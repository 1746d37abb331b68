//! Simulate Jackson queueing networks as continuous-time Markov chains.
//!
//! A [Network] is a [Station::Source] (the external arrival process) followed by any number of
//! [Station::Queue]s (M/M/s stations) connected by a row-stochastic [Routing] matrix. Each call to
//! [Network::step] advances the chain by exactly one transition using Gillespie's direct method:
//! an exponential holding time drawn from the total output rate, a firing station drawn in
//! proportion to its output rate, and a destination drawn from the firing station's routing row.
//!
//! Time-weighted occupancy is accumulated as the chain evolves, so [Network::averages] estimates
//! the stationary mean number of entities at every service station.
//!
//! # Example
//!
//! ```rust
//! use jackson_simulator::{Config, Network, Queue};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let cfg = Config::new(
//!     20.0,
//!     vec![Queue::new(40.0, 1), Queue::new(40.0, 1)],
//!     vec![
//!         vec![0.0, 0.5, 0.5],
//!         vec![0.1, 0.5, 0.4],
//!         vec![0.6, 0.2, 0.2],
//!     ],
//! );
//! let mut network = Network::new(StdRng::seed_from_u64(0), &cfg).unwrap();
//! network.run(10_000).unwrap();
//! let averages = network.averages().unwrap();
//! assert_eq!(averages.len(), 2);
//! ```

use thiserror::Error;

mod metrics;
pub mod mocks;
mod network;
pub use network::{Config, InitialOccupancy, Network, Transition, DEFAULT_TOLERANCE};
mod routing;
pub use routing::{Routing, MAX_TOLERANCE};
mod station;
pub use station::{Queue, Station};
mod uniform;
pub use uniform::UniformSource;

/// Index of the [Station::Source] in every [Network].
pub const SOURCE: usize = 0;

/// Errors that can occur when building or advancing a [Network].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid arrival rate (must be positive and finite): {0}")]
    InvalidArrivalRate(f64),
    #[error("invalid service rate at station {0} (must be non-negative and finite): {1}")]
    InvalidServiceRate(usize, f64),
    #[error("station {0} has no servers")]
    NoServers(usize),
    #[error("invalid routing tolerance (must be in [0, 1e-6]): {0}")]
    InvalidTolerance(f64),
    #[error("routing matrix has {0} rows (expected {1})")]
    RoutingRows(usize, usize),
    #[error("routing row {0} has {1} entries (expected {2})")]
    RoutingRowLength(usize, usize, usize),
    #[error("invalid routing probability at ({0}, {1}): {2}")]
    InvalidProbability(usize, usize, f64),
    #[error("routing row {0} sums to {1} (expected 1)")]
    NotStochastic(usize, f64),
    #[error("source must not route to itself: {0}")]
    SourceSelfLoop(f64),
    #[error("initial occupancy has {0} entries (expected {1})")]
    InitialOccupancyLength(usize, usize),
    #[error("total output rate must be positive: {0}")]
    NoActivity(f64),
    #[error("departure from empty queue")]
    EmptyQueue,
    #[error("uniform draw out of range (0, 1): {0}")]
    InvalidDraw(f64),
    #[error("unknown station: {0}")]
    UnknownStation(usize),
    #[error("no data (no simulated time has elapsed)")]
    NoData,
}
