//! Routing probabilities between stations.

use crate::{Error, SOURCE};

/// Largest tolerance accepted when checking that routing rows sum to 1.
pub const MAX_TOLERANCE: f64 = 1e-6;

/// A validated routing matrix stored in cumulative form.
///
/// Row `i` holds the running sum of the probabilities that an entity leaving station `i` moves
/// to station `0..=j`. Every entry from the last destination with non-zero probability onward is
/// pinned to exactly `1.0`, so a draw in `[0, 1)` always lands on a reachable destination.
#[derive(Clone, Debug, PartialEq)]
pub struct Routing {
    rows: Vec<Vec<f64>>,
}

impl Routing {
    /// Validate a raw (non-cumulative) routing matrix for `stations` stations and convert it
    /// into cumulative form.
    ///
    /// The input is only borrowed: building several networks from the same matrix is safe.
    /// `tolerance` must lie in `[0, MAX_TOLERANCE]`.
    pub fn new(raw: &[Vec<f64>], stations: usize, tolerance: f64) -> Result<Self, Error> {
        if !(0.0..=MAX_TOLERANCE).contains(&tolerance) {
            return Err(Error::InvalidTolerance(tolerance));
        }
        if raw.len() != stations {
            return Err(Error::RoutingRows(raw.len(), stations));
        }

        let mut rows = Vec::with_capacity(stations);
        for (i, row) in raw.iter().enumerate() {
            if row.len() != stations {
                return Err(Error::RoutingRowLength(i, row.len(), stations));
            }

            // Accumulate
            let mut cumulative = Vec::with_capacity(stations);
            let mut sum = 0.0;
            let mut last = 0;
            for (j, &p) in row.iter().enumerate() {
                if !p.is_finite() || p < 0.0 {
                    return Err(Error::InvalidProbability(i, j, p));
                }
                if p > 0.0 {
                    last = j;
                }
                sum += p;
                cumulative.push(sum);
            }
            if (sum - 1.0).abs() > tolerance {
                return Err(Error::NotStochastic(i, sum));
            }

            // Absorb rounding error into the last reachable destination
            for c in &mut cumulative[..last] {
                *c = c.min(1.0);
            }
            for c in &mut cumulative[last..] {
                *c = 1.0;
            }
            rows.push(cumulative);
        }

        // An arrival that re-enters the source would never be observed
        if let Some(&self_loop) = raw.get(SOURCE).and_then(|row| row.get(SOURCE)) {
            if self_loop > 0.0 {
                return Err(Error::SourceSelfLoop(self_loop));
            }
        }
        Ok(Self { rows })
    }

    /// Number of stations covered by the matrix.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the matrix covers no stations.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cumulative routing row of station `from`.
    pub fn row(&self, from: usize) -> Option<&[f64]> {
        self.rows.get(from).map(Vec::as_slice)
    }

    /// Probability that an entity leaving `from` moves to `to`.
    pub fn probability(&self, from: usize, to: usize) -> Option<f64> {
        let row = self.rows.get(from)?;
        let upper = *row.get(to)?;
        let lower = match to {
            0 => 0.0,
            _ => row[to - 1],
        };
        Some(upper - lower)
    }

    /// Select the destination of an entity leaving `from` given a uniform draw `u` in `[0, 1)`.
    pub fn select(&self, from: usize, u: f64) -> Option<usize> {
        select(self.rows.get(from)?, u)
    }
}

/// Inverse-CDF selection over a non-decreasing cumulative distribution ending at `1.0`.
///
/// Returns the first index whose cumulative probability exceeds `u` (entries with zero
/// probability can never be selected).
pub(crate) fn select(cumulative: &[f64], u: f64) -> Option<usize> {
    let index = cumulative.partition_point(|&c| c <= u);
    (index < cumulative.len()).then_some(index)
}
