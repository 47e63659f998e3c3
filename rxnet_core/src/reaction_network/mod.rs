//! Module providing the reaction and network types that form the ODE core.

pub mod network;
pub mod reaction;
pub mod stoichiometry;
