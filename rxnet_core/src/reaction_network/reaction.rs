//! This module provides a struct for representing a single elementary reaction
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use indexmap::{IndexMap, IndexSet};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configuration::CONFIGURATION;
use crate::reaction_network::stoichiometry::Stoichiometry;

/// Represents a single elementary reaction with a mass-action rate law
///
/// A reaction is immutable once built; networks only ever read it.
///
/// # Examples
/// ```rust
/// use rxnet_core::reaction_network::reaction::ReactionBuilder;
/// let growth = ReactionBuilder::default()
///     .id("growth_y")
///     .reactants([("X", 1), ("Y", 1)])
///     .products([("X", 1), ("Y", 2)])
///     .build()
///     .unwrap();
/// assert_eq!(growth.net_change("Y"), 1);
/// assert_eq!(growth.net_change("X"), 0);
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Reaction {
    /// Used to identify the reaction (must be unique within a network)
    #[builder(setter(into))]
    pub id: String,
    /// Species consumed by the reaction, with stoichiometric coefficients
    #[builder(default = "Stoichiometry::new()", setter(into))]
    pub reactants: Stoichiometry,
    /// Species produced by the reaction, with stoichiometric coefficients
    #[builder(default = "Stoichiometry::new()", setter(into))]
    pub products: Stoichiometry,
    /// Mass-action rate coefficient, must be finite and strictly positive
    #[builder(default = "CONFIGURATION.read().unwrap().default_rate_coefficient")]
    pub rate_coefficient: f64,
}

impl Reaction {
    /// Create a reaction, validating the rate coefficient
    ///
    /// # Parameters
    /// - `id`: identifier for the reaction
    /// - `reactants`: species consumed, with stoichiometric coefficients
    /// - `products`: species produced, with stoichiometric coefficients
    /// - `rate_coefficient`: mass-action rate coefficient, finite and `> 0`
    pub fn new(
        id: impl Into<String>,
        reactants: impl Into<Stoichiometry>,
        products: impl Into<Stoichiometry>,
        rate_coefficient: f64,
    ) -> Result<Self, ReactionError> {
        if !(rate_coefficient.is_finite() && rate_coefficient > 0.0) {
            return Err(ReactionError::InvalidRateCoefficient(rate_coefficient));
        }
        Ok(Reaction {
            id: id.into(),
            reactants: reactants.into(),
            products: products.into(),
            rate_coefficient,
        })
    }

    /// Species taking part in the reaction
    ///
    /// Ordered first-seen: reactants before products, each in their own
    /// insertion order. A species listed with coefficient 0 on both sides is
    /// still reported here (it is tracked, just inert to this reaction).
    pub fn variables(&self) -> IndexSet<String> {
        let mut variables: IndexSet<String> = IndexSet::new();
        variables.extend(self.reactants.species().map(str::to_string));
        variables.extend(self.products.species().map(str::to_string));
        variables
    }

    /// Net stoichiometric change of `species` across the reaction
    ///
    /// `products[species] - reactants[species]`; 0 for a species absent from
    /// both sides.
    pub fn net_change(&self, species: &str) -> i64 {
        self.products.coefficient(species) as i64 - self.reactants.coefficient(species) as i64
    }

    /// Mass-action propensity at a sparse species-to-concentration state
    ///
    /// `rate_coefficient * prod(state[s] ^ reactants[s])`. Species with
    /// reactant coefficient 0 contribute a factor of 1 and may be missing
    /// from `state` entirely.
    ///
    /// # Errors
    /// [`ReactionError::UnknownSpecies`] when a species with a positive
    /// reactant coefficient is missing from `state`.
    pub fn propensity(&self, state: &IndexMap<String, f64>) -> Result<f64, ReactionError> {
        let mut w = self.rate_coefficient;
        for (species, coefficient) in self.reactants.iter() {
            if coefficient == 0 {
                continue;
            }
            let x = state
                .get(species)
                .ok_or_else(|| ReactionError::UnknownSpecies(species.to_string()))?;
            w *= x.powi(coefficient as i32);
        }
        Ok(w)
    }

    /// Flatten the reactant coefficients against an ordered species list,
    /// producing a rate law evaluable on dense state vectors
    ///
    /// The flattening happens once; the returned [`RateLaw`] is reused on
    /// every evaluation.
    pub fn rate_law(&self, variables: &IndexSet<String>) -> RateLaw {
        RateLaw {
            rate_coefficient: self.rate_coefficient,
            exponents: self.reactants.flatten(variables),
        }
    }

    /// Render one side of the reaction as `"1X+2Y"`
    fn side_to_string(side: &Stoichiometry) -> String {
        side.iter()
            .map(|(species, coefficient)| format!("{coefficient}{species}"))
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl Display for Reaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} =({})> {}",
            Reaction::side_to_string(&self.reactants),
            self.rate_coefficient,
            Reaction::side_to_string(&self.products)
        )
    }
}

impl ReactionBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(rate_coefficient) = self.rate_coefficient {
            if !(rate_coefficient.is_finite() && rate_coefficient > 0.0) {
                return Err(ReactionError::InvalidRateCoefficient(rate_coefficient).to_string());
            }
        }
        Ok(())
    }
}

/// A reaction's propensity flattened against a fixed species ordering
///
/// This is the hot path, evaluated once per reaction per integrator step.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLaw {
    /// Mass-action rate coefficient
    rate_coefficient: f64,
    /// Reactant coefficient per species, in the flattened ordering
    exponents: Vec<u32>,
}

impl RateLaw {
    /// Evaluate the rate law on a dense state vector
    ///
    /// # Errors
    /// [`ReactionError::DimensionMismatch`] when the state vector length
    /// differs from the species ordering the law was flattened against.
    pub fn evaluate(&self, state: &DVector<f64>) -> Result<f64, ReactionError> {
        if state.len() != self.exponents.len() {
            return Err(ReactionError::DimensionMismatch {
                expected: self.exponents.len(),
                got: state.len(),
            });
        }
        Ok(self.evaluate_unchecked(state))
    }

    /// Length of `state` is guaranteed by the caller
    pub(crate) fn evaluate_unchecked(&self, state: &DVector<f64>) -> f64 {
        let mut w = self.rate_coefficient;
        for (i, &exponent) in self.exponents.iter().enumerate() {
            if exponent > 0 {
                w *= state[i].powi(exponent as i32);
            }
        }
        w
    }
}

/// Errors raised while constructing or evaluating reactions
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReactionError {
    /// Rate coefficients must be finite and strictly positive
    #[error("rate coefficient must be finite and positive, got {0}")]
    InvalidRateCoefficient(f64),
    /// A reactant species was missing from a propensity state mapping
    #[error("\"{0}\" is missing from the state mapping")]
    UnknownSpecies(String),
    /// A dense state vector did not match the flattened species ordering
    #[error("state vector has length {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}
