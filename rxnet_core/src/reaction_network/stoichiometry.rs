//! This module provides the stoichiometry mapping used by reactions

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Mapping from species id to a non-negative stoichiometric coefficient
///
/// Species absent from the mapping have coefficient 0, so lookups never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stoichiometry(IndexMap<String, u32>);

impl Stoichiometry {
    /// Create an empty mapping
    pub fn new() -> Self {
        Stoichiometry(IndexMap::new())
    }

    /// Coefficient of `species`, 0 when the species does not appear
    pub fn coefficient(&self, species: &str) -> u32 {
        self.0.get(species).copied().unwrap_or(0)
    }

    /// Dense coefficient vector aligned to `variables`, 0 for absent species
    ///
    /// # Parameters
    /// - `variables`: the ordered species list defining the vector layout
    pub fn flatten(&self, variables: &IndexSet<String>) -> Vec<u32> {
        variables.iter().map(|v| self.coefficient(v)).collect()
    }

    /// Species ids in insertion order
    pub fn species(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// (species, coefficient) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(species, coefficient)| (species.as_str(), *coefficient))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Stoichiometry {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Stoichiometry(iter.into_iter().map(|(species, coefficient)| (species.into(), coefficient)).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[(S, u32); N]> for Stoichiometry {
    fn from(entries: [(S, u32); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl From<IndexMap<String, u32>> for Stoichiometry {
    fn from(map: IndexMap<String, u32>) -> Self {
        Stoichiometry(map)
    }
}
