//! Global configuration with the defaults used across the crate
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Crate wide defaults, adjustable at runtime through [`CONFIGURATION`]
pub struct Configuration {
    /// Rate coefficient used when a reaction builder does not set one
    pub default_rate_coefficient: f64,
    /// Start of the default integration span
    pub t_min: f64,
    /// End of the default integration span
    pub t_max: f64,
    /// Number of sample points in the default time grid
    pub sample_count: usize,
    /// Internal solver steps taken between consecutive sample points
    pub substeps_per_sample: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            default_rate_coefficient: 1.0,
            t_min: 0.0,
            t_max: 1.0,
            sample_count: 100,
            substeps_per_sample: 8,
        }
    }
}
