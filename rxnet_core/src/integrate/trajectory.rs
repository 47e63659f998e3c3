//! Sampled integration output

use nalgebra::DMatrix;
use serde::Serialize;

/// A sampled solution trajectory
///
/// Row `k` of `states` is the state at `time[k]`; column `j` corresponds to
/// `species[j]`, the network's species ordering at integration time.
/// External consumers (plotting, export) read this alignment key rather than
/// assuming an ordering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trajectory {
    /// Sample times, one per state row
    pub time: Vec<f64>,
    /// samples x species matrix of states
    pub states: DMatrix<f64>,
    /// Species ids aligned to the state columns
    pub species: Vec<String>,
}

impl Trajectory {
    /// Number of samples in the trajectory
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Concentration series of one species across all samples
    ///
    /// Returns `None` when the species is not part of the trajectory.
    pub fn series(&self, species: &str) -> Option<Vec<f64>> {
        let column = self.species.iter().position(|s| s == species)?;
        Some(self.states.column(column).iter().copied().collect())
    }
}
