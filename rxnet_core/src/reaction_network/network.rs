//! This module provides the ReactionNetwork struct, which aggregates
//! reactions into a single indexed ODE system
use std::fmt::{Display, Formatter};

use indexmap::{IndexMap, IndexSet};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::integrate::{self, InitialState, IntegrationError, TimeGrid, Trajectory};
use crate::reaction_network::reaction::{RateLaw, Reaction};

/// A group of reactions assembled into the linear algebra problem
/// `dx/dt = S * w(x)` over a fixed species ordering
///
/// The species ordering is the first-seen union over the reactions in
/// insertion order (within one reaction, reactants before products). It
/// defines every state vector index and every row of the stoichiometric
/// matrix. The matrix and the flattened rate laws are rebuilt eagerly on
/// every mutation, so reads can never observe a stale cache.
///
/// # Examples
/// ```rust
/// use nalgebra::DVector;
/// use rxnet_core::reaction_network::network::ReactionNetwork;
/// use rxnet_core::reaction_network::reaction::ReactionBuilder;
/// let decay = ReactionBuilder::default()
///     .id("decay")
///     .reactants([("X", 1)])
///     .build()
///     .unwrap();
/// let network = ReactionNetwork::new([decay]).unwrap();
/// let dx = network.derivative(&DVector::from_vec(vec![2.0]), 0.0).unwrap();
/// assert_eq!(dx[0], -2.0);
/// ```
#[derive(Clone, Debug)]
pub struct ReactionNetwork {
    /// Map of reaction ids to Reaction objects, in insertion order; the
    /// position of a reaction is its column in the stoichiometric matrix
    reactions: IndexMap<String, Reaction>,
    /// Ordered set of tracked species; the position of a species is its
    /// index into state vectors and its matrix row
    variables: IndexSet<String>,
    /// One flattened rate law per reaction, aligned to `variables`
    rate_laws: Vec<RateLaw>,
    /// species x reactions matrix of net stoichiometric changes
    stoichiometric_matrix: DMatrix<f64>,
}

impl ReactionNetwork {
    /// Create a network from an initial collection of reactions
    ///
    /// # Errors
    /// [`NetworkError::DuplicateReaction`] when two reactions share an id.
    pub fn new(reactions: impl IntoIterator<Item = Reaction>) -> Result<Self, NetworkError> {
        let mut network = ReactionNetwork::new_empty();
        for reaction in reactions {
            network.insert(reaction)?;
        }
        network.rebuild();
        Ok(network)
    }

    /// Create a network with no reactions and no tracked species
    pub fn new_empty() -> Self {
        ReactionNetwork {
            reactions: IndexMap::new(),
            variables: IndexSet::new(),
            rate_laws: Vec::new(),
            stoichiometric_matrix: DMatrix::zeros(0, 0),
        }
    }

    /// Append a reaction to the network
    ///
    /// Extends the species ordering with any species the reaction introduces
    /// and rebuilds every rate law and the stoichiometric matrix before
    /// returning. Indices obtained from [`ReactionNetwork::idx`] before the
    /// call stay valid only for species that kept their position; re-lookup
    /// instead of holding indices across mutations.
    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<(), NetworkError> {
        self.insert(reaction)?;
        self.rebuild();
        Ok(())
    }

    fn insert(&mut self, reaction: Reaction) -> Result<(), NetworkError> {
        if self.reactions.contains_key(&reaction.id) {
            return Err(NetworkError::DuplicateReaction(reaction.id));
        }
        self.variables.extend(reaction.variables());
        self.reactions.insert(reaction.id.clone(), reaction);
        Ok(())
    }

    /// Recompute the flattened rate laws and the stoichiometric matrix from
    /// the current reaction set and species ordering
    fn rebuild(&mut self) {
        self.rate_laws = self
            .reactions
            .values()
            .map(|reaction| reaction.rate_law(&self.variables))
            .collect();
        let mut matrix = DMatrix::zeros(self.variables.len(), self.reactions.len());
        for (i, species) in self.variables.iter().enumerate() {
            for (r, reaction) in self.reactions.values().enumerate() {
                matrix[(i, r)] = reaction.net_change(species) as f64;
            }
        }
        self.stoichiometric_matrix = matrix;
    }

    /// Map of reaction ids to reactions, in insertion order
    pub fn reactions(&self) -> &IndexMap<String, Reaction> {
        &self.reactions
    }

    /// Look up a reaction by id
    pub fn reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.get(id)
    }

    /// The ordered set of tracked species
    pub fn variables(&self) -> &IndexSet<String> {
        &self.variables
    }

    pub fn num_species(&self) -> usize {
        self.variables.len()
    }

    pub fn num_reactions(&self) -> usize {
        self.reactions.len()
    }

    /// Index of `species` in the network's ordering
    ///
    /// # Errors
    /// [`NetworkError::UnknownSpecies`] when the species is not tracked.
    pub fn idx(&self, species: &str) -> Result<usize, NetworkError> {
        self.variables
            .get_index_of(species)
            .ok_or_else(|| NetworkError::UnknownSpecies(species.to_string()))
    }

    /// The species x reactions matrix of net stoichiometric changes
    ///
    /// Entry `(i, r)` is reaction `r`'s net change of species `i`.
    pub fn stoichiometric_matrix(&self) -> &DMatrix<f64> {
        &self.stoichiometric_matrix
    }

    pub(crate) fn check_dimension(&self, state: &DVector<f64>) -> Result<(), NetworkError> {
        if state.len() != self.variables.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.variables.len(),
                got: state.len(),
            });
        }
        Ok(())
    }

    /// Propensity of every reaction at `state`, in reaction order
    ///
    /// # Errors
    /// [`NetworkError::DimensionMismatch`] when `state` does not have one
    /// entry per tracked species.
    pub fn propensity_vector(&self, state: &DVector<f64>) -> Result<DVector<f64>, NetworkError> {
        self.check_dimension(state)?;
        Ok(DVector::from_iterator(
            self.rate_laws.len(),
            self.rate_laws.iter().map(|rate_law| rate_law.evaluate_unchecked(state)),
        ))
    }

    /// Instantaneous rate of change of every species: `S * w(x)`
    ///
    /// `time` is accepted for signature compatibility with time stepping
    /// integrators; the system is autonomous, so the result never depends
    /// on it.
    pub fn derivative(&self, state: &DVector<f64>, _time: f64) -> Result<DVector<f64>, NetworkError> {
        Ok(&self.stoichiometric_matrix * self.propensity_vector(state)?)
    }

    /// Rate of change of a single species, as a reusable function of state
    ///
    /// Returns `row(species) . w(x)` as a closure over the network.
    pub fn species_derivative(
        &self,
        species: &str,
    ) -> Result<impl Fn(&DVector<f64>) -> Result<f64, NetworkError> + '_, NetworkError> {
        let row = self.stoichiometric_matrix.row(self.idx(species)?).transpose();
        Ok(move |state: &DVector<f64>| Ok(row.dot(&self.propensity_vector(state)?)))
    }

    /// Project a sparse species-to-concentration mapping onto a dense state
    /// vector in the network's species order
    ///
    /// Every tracked species must be present in the mapping.
    ///
    /// # Errors
    /// [`NetworkError::UnknownSpecies`] naming the first tracked species
    /// missing from the mapping.
    pub fn state_from_mapping(
        &self,
        mapping: &IndexMap<String, f64>,
    ) -> Result<DVector<f64>, NetworkError> {
        let mut state = DVector::zeros(self.variables.len());
        for (i, species) in self.variables.iter().enumerate() {
            state[i] = *mapping
                .get(species)
                .ok_or_else(|| NetworkError::UnknownSpecies(species.clone()))?;
        }
        Ok(state)
    }

    /// Integrate the network over a time grid with the external ODE solver
    ///
    /// # Parameters
    /// - `initial`: dense state vector in species order, or a sparse
    ///   species-to-concentration mapping (see [`InitialState`])
    /// - `grid`: the sample times (see [`TimeGrid`]; `TimeGrid::default()`
    ///   is 100 uniform samples over `[0, 1]`)
    ///
    /// # Returns
    /// The sampled [`Trajectory`], with one state row per grid point.
    pub fn integrate(
        &self,
        initial: impl Into<InitialState>,
        grid: &TimeGrid,
    ) -> Result<Trajectory, IntegrationError> {
        integrate::solver::integrate_network(self, initial.into(), grid)
    }
}

impl Display for ReactionNetwork {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (id, reaction) in &self.reactions {
            writeln!(f, "{}: {}", id, reaction)?;
        }
        Ok(())
    }
}

/// Errors raised by reaction network operations
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NetworkError {
    /// A species was requested that the network does not track
    #[error("\"{0}\" is not present in the reaction network")]
    UnknownSpecies(String),
    /// A state vector did not have one entry per tracked species
    #[error("state vector has length {got}, but the network tracks {expected} species")]
    DimensionMismatch { expected: usize, got: usize },
    /// Reaction ids must be unique within a network
    #[error("a reaction with id \"{0}\" is already present in the network")]
    DuplicateReaction(String),
}

#[cfg(test)]
mod network_tests {
    use super::*;
    use crate::reaction_network::reaction::ReactionBuilder;
    use approx::assert_relative_eq;

    /// Two-species birth/death system with a known stoichiometric matrix
    fn setup_network() -> ReactionNetwork {
        let growth_y = ReactionBuilder::default()
            .id("growth_y")
            .reactants([("X", 1), ("Y", 1)])
            .products([("X", 1), ("Y", 2)])
            .build()
            .unwrap();
        let growth_x = ReactionBuilder::default()
            .id("growth_x")
            .reactants([("X", 1), ("Y", 1)])
            .products([("X", 2), ("Y", 1)])
            .rate_coefficient(1.1)
            .build()
            .unwrap();
        let death_x = ReactionBuilder::default()
            .id("death_x")
            .reactants([("X", 1)])
            .products([("X", 0)])
            .build()
            .unwrap();
        let death_y = ReactionBuilder::default()
            .id("death_y")
            .reactants([("Y", 1)])
            .products([("Y", 0)])
            .build()
            .unwrap();
        ReactionNetwork::new([growth_y, growth_x, death_x, death_y]).unwrap()
    }

    #[test]
    fn variables_are_ordered_first_seen() {
        let network = setup_network();
        let variables: Vec<&String> = network.variables().iter().collect();
        assert_eq!(variables, vec!["X", "Y"]);
        assert_eq!(network.idx("X").unwrap(), 0);
        assert_eq!(network.idx("Y").unwrap(), 1);
    }

    #[test]
    fn idx_unknown_species_is_an_error() {
        let network = setup_network();
        assert_eq!(
            network.idx("Z"),
            Err(NetworkError::UnknownSpecies("Z".to_string()))
        );
    }

    #[test]
    fn stoichiometric_matrix_entries() {
        let network = setup_network();
        let expected = DMatrix::from_row_slice(
            2,
            4,
            &[
                0.0, 1.0, -1.0, 0.0, // X
                1.0, 0.0, 0.0, -1.0, // Y
            ],
        );
        assert_eq!(network.stoichiometric_matrix(), &expected);
    }

    #[test]
    fn matrix_shape_tracks_species_and_reactions() {
        let network = setup_network();
        let matrix = network.stoichiometric_matrix();
        assert_eq!(matrix.nrows(), network.num_species());
        assert_eq!(matrix.ncols(), network.num_reactions());
        // Each column holds exactly the reaction's per-species net change
        for (r, reaction) in network.reactions().values().enumerate() {
            for (i, species) in network.variables().iter().enumerate() {
                assert_eq!(matrix[(i, r)], reaction.net_change(species) as f64);
            }
        }
    }

    #[test]
    fn propensity_vector_follows_reaction_order() {
        let network = setup_network();
        let state = DVector::from_vec(vec![1.0, 1.0]);
        let w = network.propensity_vector(&state).unwrap();
        assert_eq!(w.len(), 4);
        assert_relative_eq!(w[0], 1.0); // growth_y
        assert_relative_eq!(w[1], 1.1); // growth_x
        assert_relative_eq!(w[2], 1.0); // death_x
        assert_relative_eq!(w[3], 1.0); // death_y
    }

    #[test]
    fn derivative_is_matrix_times_propensities() {
        let network = setup_network();
        let state = DVector::from_vec(vec![0.5, 2.0]);
        let expected = network.stoichiometric_matrix() * network.propensity_vector(&state).unwrap();
        assert_eq!(network.derivative(&state, 0.0).unwrap(), expected);
    }

    #[test]
    fn derivative_at_unit_state() {
        // Hand computed: dX = 1.1*xy - x = 0.1, dY = xy - y = 0 at x = y = 1
        let network = setup_network();
        let state = DVector::from_vec(vec![1.0, 1.0]);
        let dx = network.derivative(&state, 0.0).unwrap();
        assert_relative_eq!(dx[network.idx("X").unwrap()], 0.1, epsilon = 1e-12);
        assert_relative_eq!(dx[network.idx("Y").unwrap()], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn derivative_ignores_time() {
        let network = setup_network();
        let state = DVector::from_vec(vec![0.3, 0.7]);
        assert_eq!(
            network.derivative(&state, 0.0).unwrap(),
            network.derivative(&state, 42.0).unwrap()
        );
    }

    #[test]
    fn derivative_checks_state_length() {
        let network = setup_network();
        let state = DVector::from_vec(vec![1.0, 1.0, 1.0]);
        assert_eq!(
            network.derivative(&state, 0.0),
            Err(NetworkError::DimensionMismatch { expected: 2, got: 3 })
        );
    }

    #[test]
    fn add_reaction_extends_matrix_and_species() {
        let growth_y = ReactionBuilder::default()
            .id("growth_y")
            .reactants([("X", 1), ("Y", 1)])
            .products([("X", 1), ("Y", 2)])
            .build()
            .unwrap();
        let mut network = ReactionNetwork::new([growth_y]).unwrap();
        assert_eq!(network.stoichiometric_matrix().shape(), (2, 1));

        let death_z = ReactionBuilder::default()
            .id("death_z")
            .reactants([("Z", 1)])
            .build()
            .unwrap();
        network.add_reaction(death_z).unwrap();

        // One more column, and the new species is immediately tracked
        assert_eq!(network.stoichiometric_matrix().shape(), (3, 2));
        let z = network.idx("Z").unwrap();
        assert_eq!(network.stoichiometric_matrix()[(z, 1)], -1.0);

        // Rate laws were rebuilt against the extended ordering
        let state = DVector::from_vec(vec![1.0, 1.0, 2.0]);
        let w = network.propensity_vector(&state).unwrap();
        assert_relative_eq!(w[0], 1.0);
        assert_relative_eq!(w[1], 2.0);
    }

    #[test]
    fn add_reaction_rejects_duplicate_ids() {
        let mut network = setup_network();
        let duplicate = ReactionBuilder::default()
            .id("growth_y")
            .reactants([("X", 1)])
            .build()
            .unwrap();
        assert_eq!(
            network.add_reaction(duplicate),
            Err(NetworkError::DuplicateReaction("growth_y".to_string()))
        );
    }

    #[test]
    fn species_derivative_matches_derivative_row() {
        let network = setup_network();
        let state = DVector::from_vec(vec![0.5, 1.5]);
        let full = network.derivative(&state, 0.0).unwrap();
        let dx = network.species_derivative("X").unwrap();
        let dy = network.species_derivative("Y").unwrap();
        assert_relative_eq!(dx(&state).unwrap(), full[network.idx("X").unwrap()]);
        assert_relative_eq!(dy(&state).unwrap(), full[network.idx("Y").unwrap()]);
    }

    #[test]
    fn species_derivative_unknown_species() {
        let network = setup_network();
        assert!(matches!(
            network.species_derivative("Z"),
            Err(NetworkError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn state_from_mapping_projects_in_variable_order() {
        let network = setup_network();
        let mapping = IndexMap::from([("Y".to_string(), 2.0), ("X".to_string(), 1.0)]);
        let state = network.state_from_mapping(&mapping).unwrap();
        assert_eq!(state, DVector::from_vec(vec![1.0, 2.0]));
    }

    #[test]
    fn state_from_mapping_requires_every_species() {
        let network = setup_network();
        let mapping = IndexMap::from([("X".to_string(), 1.0)]);
        assert_eq!(
            network.state_from_mapping(&mapping),
            Err(NetworkError::UnknownSpecies("Y".to_string()))
        );
    }

    #[test]
    fn display_lists_reactions() {
        let network = setup_network();
        let rendered = format!("{}", network);
        assert!(rendered.contains("growth_y: 1X+1Y =(1)> 1X+2Y"));
        assert!(rendered.contains("growth_x: 1X+1Y =(1.1)> 2X+1Y"));
    }
}
