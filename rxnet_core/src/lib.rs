//! Core library for assembling chemical and biological reaction networks and
//! integrating their mass-action kinetics as systems of ordinary differential
//! equations.
#![allow(unused)]

pub mod integrate;
pub mod reaction_network;
mod configuration;
