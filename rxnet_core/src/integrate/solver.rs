//! Adapter between a reaction network and the external ODE solver

use nalgebra::{DMatrix, DVector};
use peroxide::fuga::{ODEIntegrator, ODEProblem, RK5};

use crate::configuration::CONFIGURATION;
use crate::integrate::{InitialState, IntegrationError, TimeGrid, Trajectory};
use crate::reaction_network::network::ReactionNetwork;

/// Presents a network's derivative as the solver's right hand side
struct NetworkProblem<'a> {
    network: &'a ReactionNetwork,
}

impl ODEProblem for NetworkProblem<'_> {
    fn rhs(&self, t: f64, y: &[f64], dy: &mut [f64]) -> Result<(), anyhow::Error> {
        let state = DVector::from_column_slice(y);
        let derivative = self.network.derivative(&state, t)?;
        dy.copy_from_slice(derivative.as_slice());
        Ok(())
    }
}

/// Integrate `network` from `initial` across `grid`, sampling the state at
/// every grid point
///
/// Each consecutive grid interval `[t_k, t_k+1]` is advanced by stepping the
/// integrator exactly `substeps_per_sample` times with step size
/// `(t_k+1 - t_k) / substeps_per_sample`, so the final step lands on the
/// grid point and every recorded row is the state at the time it claims,
/// for uniform and non-uniform grids alike. Row 0 of the output is the
/// initial state itself. The stepper is a fixed step explicit method, so
/// identical inputs always produce identical trajectories.
pub(crate) fn integrate_network(
    network: &ReactionNetwork,
    initial: InitialState,
    grid: &TimeGrid,
) -> Result<Trajectory, IntegrationError> {
    let time = grid.sample_times()?;
    let initial = match initial {
        InitialState::Vector(state) => {
            network.check_dimension(&state)?;
            state
        }
        InitialState::Mapping(mapping) => network.state_from_mapping(&mapping)?,
    };

    let species: Vec<String> = network.variables().iter().cloned().collect();
    let n = species.len();
    let mut states = DMatrix::zeros(time.len(), n);
    for j in 0..n {
        states[(0, j)] = initial[j];
    }

    // With no species there is nothing to advance, and a single-point grid
    // is just the initial state
    if n == 0 || time.len() == 1 {
        return Ok(Trajectory { time, states, species });
    }

    let substeps = CONFIGURATION.read().unwrap().substeps_per_sample.max(1);
    let problem = NetworkProblem { network };
    let integrator = RK5::default();
    let mut current: Vec<f64> = initial.iter().copied().collect();
    for k in 1..time.len() {
        let (t_start, t_end) = (time[k - 1], time[k]);
        let dt = (t_end - t_start) / substeps as f64;
        for i in 0..substeps {
            let t = t_start + dt * i as f64;
            integrator
                .step(&problem, t, &mut current, dt)
                .map_err(|e| IntegrationError::Solver(e.to_string()))?;
        }
        for j in 0..n {
            states[(k, j)] = current[j];
        }
    }

    Ok(Trajectory { time, states, species })
}
