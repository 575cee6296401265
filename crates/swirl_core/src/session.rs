use crate::field::{Attractor, ParameterCountError, State, VectorField};
use crate::solvers::Solver;
use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of samples batched before the rolling averages refresh.
const STATS_WINDOW: usize = 20;

/// Default step-size exponent; the effective step is `10^exponent`.
pub const DEFAULT_STEP_EXPONENT: f64 = -2.0;

/// Display range for the step-exponent control. A UI hint only; the engine
/// enforces no bounds on the exponent.
pub const STEP_EXPONENT_RANGE: (f64, f64) = (-5.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Paused,
}

/// Averaged per-step readings, refreshed once per full sample window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsReading {
    pub mean_calc_time: Duration,
    /// `None` when every sample in the window had a degenerate estimate.
    pub mean_relative_error: Option<f64>,
}

/// Outcome of [`IntegrationSession::restart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartStatus {
    /// Trajectory reseeded as requested.
    Restarted,
    /// The supplied seed had a non-finite component; the attractor's
    /// default initial state was used instead.
    InvalidSeedReplaced,
}

/// Fixed-window batches of per-step timing and error samples. Degenerate
/// error samples are dropped so the average never absorbs a NaN.
#[derive(Debug, Clone, Default)]
struct RollingStats {
    calc_times: Vec<Duration>,
    errors: Vec<f64>,
    latest: Option<StatsReading>,
}

impl RollingStats {
    fn push(&mut self, calc_time: Duration, relative_error: Option<f64>) {
        self.calc_times.push(calc_time);
        if let Some(err) = relative_error {
            self.errors.push(err);
        }
        if self.calc_times.len() >= STATS_WINDOW {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let mean_calc_time =
            self.calc_times.iter().sum::<Duration>() / self.calc_times.len() as u32;
        let mean_relative_error = if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.iter().sum::<f64>() / self.errors.len() as f64)
        };
        self.latest = Some(StatsReading {
            mean_calc_time,
            mean_relative_error,
        });
        self.calc_times.clear();
        self.errors.clear();
    }

    fn clear(&mut self) {
        self.calc_times.clear();
        self.errors.clear();
        self.latest = None;
    }
}

/// Drives one attractor plot: owns the field, the solver selection, the
/// step size, the trajectory, and the rolling statistics.
///
/// An external timer ticks the session through [`advance`]; every other
/// method is a plain mutator for the host's controls to call between
/// ticks. A session assumes single-threaded ownership and does no internal
/// locking; independent sessions share nothing.
///
/// [`advance`]: IntegrationSession::advance
#[derive(Debug, Clone)]
pub struct IntegrationSession {
    field: VectorField,
    solver: Solver,
    step_exponent: f64,
    trajectory: Trajectory,
    stats: RollingStats,
    elapsed: f64,
    run_state: RunState,
}

impl IntegrationSession {
    /// Running session seeded with the attractor's default initial state.
    pub fn new(attractor: Attractor, solver: Solver) -> Self {
        Self {
            field: VectorField::new(attractor),
            solver,
            step_exponent: DEFAULT_STEP_EXPONENT,
            trajectory: Trajectory::seeded(attractor.default_initial_state()),
            stats: RollingStats::default(),
            elapsed: 0.0,
            run_state: RunState::Running,
        }
    }

    /// Performs exactly one integration step, unless paused.
    ///
    /// Returns the freshly appended state, or `None` when the session is
    /// paused (in which case nothing changes).
    pub fn advance(&mut self) -> Option<State> {
        if self.run_state == RunState::Paused {
            return None;
        }
        let y = self.trajectory.last()?;
        let h = self.step_size();
        let result = self.solver.step(&self.field, y, h);
        self.trajectory.append(result.state);
        self.elapsed += h;
        self.stats.push(result.calc_time, result.relative_error);
        Some(result.state)
    }

    /// Effective step size, `10^exponent`.
    pub fn step_size(&self) -> f64 {
        10f64.powf(self.step_exponent)
    }

    pub fn step_exponent(&self) -> f64 {
        self.step_exponent
    }

    /// Takes effect on the next [`advance`](IntegrationSession::advance).
    pub fn set_step_exponent(&mut self, exponent: f64) {
        self.step_exponent = exponent;
    }

    /// Rebuilds the field with new coefficients. A count that does not
    /// match the attractor's arity is rejected and the current field kept.
    pub fn set_parameters(&mut self, parameters: &[f64]) -> Result<(), ParameterCountError> {
        self.field = VectorField::with_parameters(self.field.attractor(), parameters)?;
        Ok(())
    }

    /// Switches to `attractor` with its default coefficients. Trajectory
    /// and elapsed time are kept; call [`restart`] for a clean run.
    ///
    /// [`restart`]: IntegrationSession::restart
    pub fn set_attractor(&mut self, attractor: Attractor) {
        self.field = VectorField::new(attractor);
    }

    pub fn set_solver(&mut self, solver: Solver) {
        self.solver = solver;
    }

    pub fn pause(&mut self) {
        self.run_state = RunState::Paused;
    }

    pub fn resume(&mut self) {
        self.run_state = RunState::Running;
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_paused(&self) -> bool {
        self.run_state == RunState::Paused
    }

    /// Reseeds the trajectory and zeroes the run.
    ///
    /// A missing seed falls back to the attractor's default initial state.
    /// A seed with a non-finite component falls back the same way, and the
    /// substitution is reported as a degraded success rather than an
    /// error. The session always comes back running, with elapsed time at
    /// zero and the statistics window discarded unflushed.
    pub fn restart(&mut self, seed: Option<State>) -> RestartStatus {
        let (seed, status) = match seed {
            Some(s) if s.iter().all(|c| c.is_finite()) => (s, RestartStatus::Restarted),
            Some(_) => (
                self.field.attractor().default_initial_state(),
                RestartStatus::InvalidSeedReplaced,
            ),
            None => (
                self.field.attractor().default_initial_state(),
                RestartStatus::Restarted,
            ),
        };
        self.trajectory.reset(Some(seed));
        self.elapsed = 0.0;
        self.stats.clear();
        self.run_state = RunState::Running;
        status
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Elapsed simulation time, the sum of all performed step sizes.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn field(&self) -> &VectorField {
        &self.field
    }

    pub fn solver(&self) -> Solver {
        self.solver
    }

    /// Latest averaged reading, refreshed every `STATS_WINDOW` steps.
    /// `None` until the first window has filled.
    pub fn latest_stats(&self) -> Option<StatsReading> {
        self.stats.latest
    }
}
