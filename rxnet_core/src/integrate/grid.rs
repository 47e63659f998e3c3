//! Time grids at which an integration is sampled

use crate::configuration::CONFIGURATION;
use crate::integrate::IntegrationError;

/// The time points at which a trajectory is sampled
///
/// # Examples
/// ```rust
/// use rxnet_core::integrate::TimeGrid;
/// // The default grid is 100 uniformly spaced samples over [0, 1]
/// let times = TimeGrid::default().sample_times().unwrap();
/// assert_eq!(times.len(), 100);
/// assert_eq!(times[0], 0.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum TimeGrid {
    /// Explicit, strictly increasing sample times
    Points(Vec<f64>),
    /// `samples` uniformly spaced times over `[t_min, t_max]`
    Span { t_min: f64, t_max: f64, samples: usize },
}

impl TimeGrid {
    /// Uniform grid over `[t_min, t_max]` with the configured sample count
    pub fn span(t_min: f64, t_max: f64) -> Self {
        TimeGrid::Span {
            t_min,
            t_max,
            samples: CONFIGURATION.read().unwrap().sample_count,
        }
    }

    /// Materialize the grid as a vector of sample times, validating it
    ///
    /// # Errors
    /// [`IntegrationError::InvalidTimeGrid`] for empty, non-increasing or
    /// non-finite point grids, and for spans with fewer than two samples or
    /// `t_max <= t_min`.
    pub fn sample_times(&self) -> Result<Vec<f64>, IntegrationError> {
        match self {
            TimeGrid::Points(points) => {
                if points.is_empty() {
                    return Err(IntegrationError::InvalidTimeGrid(
                        "time grid must contain at least one point".to_string(),
                    ));
                }
                if points.iter().any(|t| !t.is_finite()) {
                    return Err(IntegrationError::InvalidTimeGrid(
                        "time points must be finite".to_string(),
                    ));
                }
                if points.windows(2).any(|pair| pair[1] <= pair[0]) {
                    return Err(IntegrationError::InvalidTimeGrid(
                        "time points must be strictly increasing".to_string(),
                    ));
                }
                Ok(points.clone())
            }
            TimeGrid::Span { t_min, t_max, samples } => {
                if *samples < 2 {
                    return Err(IntegrationError::InvalidTimeGrid(
                        "a span grid needs at least two samples".to_string(),
                    ));
                }
                if !(t_min.is_finite() && t_max.is_finite() && t_max > t_min) {
                    return Err(IntegrationError::InvalidTimeGrid(
                        "a span grid needs finite bounds with t_max > t_min".to_string(),
                    ));
                }
                let step = (t_max - t_min) / (samples - 1) as f64;
                Ok((0..*samples).map(|i| t_min + step * i as f64).collect())
            }
        }
    }
}

impl Default for TimeGrid {
    /// The configured default span: 100 uniform samples over `[0, 1]`
    fn default() -> Self {
        let configuration = CONFIGURATION.read().unwrap();
        TimeGrid::Span {
            t_min: configuration.t_min,
            t_max: configuration.t_max,
            samples: configuration.sample_count,
        }
    }
}
