//! Module adapting a reaction network to an external ODE solver
//!
//! The network supplies the right hand side `dx/dt = S * w(x)`; the solver
//! advances the state and this module samples the result onto the requested
//! time grid.
pub mod grid;
pub mod trajectory;

pub(crate) mod solver;

pub use grid::TimeGrid;
pub use trajectory::Trajectory;

use indexmap::IndexMap;
use nalgebra::DVector;
use thiserror::Error;

use crate::reaction_network::network::NetworkError;

/// Initial condition for an integration
///
/// Either a dense state vector already aligned to the network's species
/// order, or a sparse species-to-concentration mapping which is projected
/// with [`ReactionNetwork::state_from_mapping`].
///
/// [`ReactionNetwork::state_from_mapping`]:
/// crate::reaction_network::network::ReactionNetwork::state_from_mapping
#[derive(Clone, Debug)]
pub enum InitialState {
    /// Dense state vector in the network's species order
    Vector(DVector<f64>),
    /// Sparse mapping from species id to initial concentration
    Mapping(IndexMap<String, f64>),
}

impl From<DVector<f64>> for InitialState {
    fn from(state: DVector<f64>) -> Self {
        InitialState::Vector(state)
    }
}

impl From<Vec<f64>> for InitialState {
    fn from(state: Vec<f64>) -> Self {
        InitialState::Vector(DVector::from_vec(state))
    }
}

impl From<IndexMap<String, f64>> for InitialState {
    fn from(mapping: IndexMap<String, f64>) -> Self {
        InitialState::Mapping(mapping)
    }
}

/// Errors raised while setting up or running an integration
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// The network rejected a state vector or species lookup
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// The requested time grid cannot be sampled
    #[error("invalid time grid: {0}")]
    InvalidTimeGrid(String),
    /// The external solver failed to advance the state
    #[error("solver failed: {0}")]
    Solver(String),
}
