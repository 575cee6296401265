use crate::field::{State, VectorField};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Outcome of a single integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// State after the step.
    pub state: State,
    /// Wall-clock cost of the step arithmetic, error estimate included.
    /// Unrelated to the step size `h`.
    pub calc_time: Duration,
    /// Relative local error estimate, dimensionless and >= 0. `None` when
    /// the reference norm vanished and the ratio is undefined.
    pub relative_error: Option<f64>,
}

/// Fixed-step integration schemes selectable at runtime.
///
/// All three are explicit and keep no state between calls, so a session can
/// swap them freely mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Solver {
    ExplicitEuler,
    RungeKutta4,
    Fehlberg45,
}

impl Solver {
    /// Every selectable solver, in display order.
    pub const ALL: [Solver; 3] = [
        Solver::ExplicitEuler,
        Solver::RungeKutta4,
        Solver::Fehlberg45,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Solver::ExplicitEuler => "Explicit Euler",
            Solver::RungeKutta4 => "Runge Kutta 4",
            Solver::Fehlberg45 => "Fehlberg 4,5",
        }
    }

    /// Formal order of accuracy of the propagated solution.
    pub fn order(&self) -> usize {
        match self {
            Solver::ExplicitEuler => 1,
            Solver::RungeKutta4 => 4,
            Solver::Fehlberg45 => 4,
        }
    }

    /// Advances `y` by one step of size `h` through `field`.
    pub fn step(&self, field: &VectorField, y: State, h: f64) -> StepResult {
        let start = Instant::now();
        let (state, relative_error) = match self {
            Solver::ExplicitEuler => explicit_euler(field, y, h),
            Solver::RungeKutta4 => runge_kutta_4(field, y, h),
            Solver::Fehlberg45 => fehlberg_45(field, y, h),
        };
        StepResult {
            state,
            calc_time: start.elapsed(),
            relative_error,
        }
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown solver {0:?}")]
pub struct UnknownSolver(pub String);

impl FromStr for Solver {
    type Err = UnknownSolver;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Solver::ALL
            .into_iter()
            .find(|solver| solver.label() == s)
            .ok_or_else(|| UnknownSolver(s.to_string()))
    }
}

/// `‖other - reference‖ / ‖reference‖`, or `None` when the reference norm
/// is zero or the ratio fails to be finite.
fn relative_error(reference: State, other: State) -> Option<f64> {
    let denom = reference.norm();
    if denom == 0.0 {
        return None;
    }
    let err = (other - reference).norm() / denom;
    err.is_finite().then_some(err)
}

fn euler_update(field: &VectorField, y: State, h: f64) -> State {
    y + h * field.derivative(y)
}

/// First-order step. The error estimate compares against two half steps of
/// `h / 2`; the half-step trajectory is the reference.
fn explicit_euler(field: &VectorField, y: State, h: f64) -> (State, Option<f64>) {
    let yn = euler_update(field, y, h);
    let yn_half = euler_update(field, euler_update(field, y, h / 2.0), h / 2.0);
    (yn, relative_error(yn_half, yn))
}

fn rk4_update(field: &VectorField, y: State, h: f64) -> State {
    let f1 = field.derivative(y);
    let f2 = field.derivative(y + h / 2.0 * f1);
    let f3 = field.derivative(y + h / 2.0 * f2);
    let f4 = field.derivative(y + h * f3);
    y + h / 6.0 * (f1 + 2.0 * f2 + 2.0 * f3 + f4)
}

/// Classic four-stage scheme, error estimated by step-halving like the
/// Euler solver. The estimate repeats the whole step at half size; it is
/// advisory only and never drives step-size control.
fn runge_kutta_4(field: &VectorField, y: State, h: f64) -> (State, Option<f64>) {
    let yn = rk4_update(field, y, h);
    let yn_half = rk4_update(field, rk4_update(field, y, h / 2.0), h / 2.0);
    (yn, relative_error(yn_half, yn))
}

/// Fehlberg 4(5): six stages feed embedded solutions of order 4 and 5, so
/// the error estimate costs no extra derivative evaluations. The
/// fourth-order solution is propagated; the fifth serves as reference.
fn fehlberg_45(field: &VectorField, y: State, h: f64) -> (State, Option<f64>) {
    let f1 = field.derivative(y);
    let f2 = field.derivative(y + h / 4.0 * f1);
    let f3 = field.derivative(y + h * (3.0 / 32.0 * f1 + 9.0 / 32.0 * f2));
    let f4 = field.derivative(
        y + h * (1932.0 / 2197.0 * f1 - 7200.0 / 2197.0 * f2 + 7296.0 / 2197.0 * f3),
    );
    let f5 = field.derivative(
        y + h * (439.0 / 216.0 * f1 - 8.0 * f2 + 3680.0 / 513.0 * f3 - 845.0 / 4104.0 * f4),
    );
    let f6 = field.derivative(
        y + h
            * (-8.0 / 27.0 * f1 + 2.0 * f2 - 3544.0 / 2565.0 * f3 + 1859.0 / 4104.0 * f4
                - 11.0 / 40.0 * f5),
    );

    let y5 = y + h
        * (16.0 / 135.0 * f1 + 6656.0 / 12825.0 * f3 + 28561.0 / 56430.0 * f4 - 9.0 / 50.0 * f5
            + 2.0 / 55.0 * f6);
    let y4 = y + h
        * (25.0 / 216.0 * f1 + 1408.0 / 2565.0 * f3 + 2197.0 / 4104.0 * f4 - 1.0 / 5.0 * f5);

    (y4, relative_error(y4, y5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Attractor;
    use nalgebra::Vector3;

    #[test]
    fn zero_step_returns_input_state() {
        let field = VectorField::new(Attractor::Lorenz);
        let y = Vector3::new(1.0, 1.0, 1.0);
        for solver in Solver::ALL {
            let result = solver.step(&field, y, 0.0);
            assert_eq!(result.state, y, "{solver} moved the state at h = 0");
        }
    }

    #[test]
    fn euler_step_matches_hand_computation() {
        let field = VectorField::new(Attractor::Lorenz);
        let y = Vector3::new(1.0, 1.0, 1.0);
        let h = 0.01;
        let result = Solver::ExplicitEuler.step(&field, y, h);

        // f(1,1,1) = (0, 26, 1 - 8/3) for the default Lorenz coefficients.
        let expected = Vector3::new(
            1.0,
            1.0 + h * 26.0,
            1.0 + h * (1.0 - 8.0 / 3.0),
        );
        assert!((result.state - expected).norm() < 1e-14);
    }

    #[test]
    fn rk4_lorenz_step_matches_reference() {
        // Golden regression: sigma = 10, rho = 28, beta = 8/3, y0 = (1,1,1),
        // h = 10^-2, against an independently written textbook RK4.
        let field = VectorField::new(Attractor::Lorenz);
        let y = Vector3::new(1.0, 1.0, 1.0);
        let h = 0.01;

        let lorenz = |y: [f64; 3]| -> [f64; 3] {
            [
                10.0 * (y[1] - y[0]),
                y[0] * (28.0 - y[2]) - y[1],
                y[0] * y[1] - 8.0 / 3.0 * y[2],
            ]
        };
        let add = |y: [f64; 3], s: f64, k: [f64; 3]| -> [f64; 3] {
            [y[0] + s * k[0], y[1] + s * k[1], y[2] + s * k[2]]
        };

        let k1 = lorenz([1.0, 1.0, 1.0]);
        let k2 = lorenz(add([1.0, 1.0, 1.0], h / 2.0, k1));
        let k3 = lorenz(add([1.0, 1.0, 1.0], h / 2.0, k2));
        let k4 = lorenz(add([1.0, 1.0, 1.0], h, k3));
        let mut expected = [0.0; 3];
        for i in 0..3 {
            expected[i] = 1.0 + h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }

        let result = Solver::RungeKutta4.step(&field, y, h);
        for i in 0..3 {
            assert!(
                (result.state[i] - expected[i]).abs() < 1e-12,
                "component {i}: {} vs {}",
                result.state[i],
                expected[i]
            );
        }
    }

    #[test]
    fn fehlberg_thomas_error_is_finite_and_nonnegative() {
        let field = VectorField::new(Attractor::Thomas);
        let y = Vector3::new(0.0, -1.0, 7.0);
        let result = Solver::Fehlberg45.step(&field, y, 0.01);

        let err = result.relative_error.expect("estimate should be defined");
        assert!(err.is_finite());
        assert!(err >= 0.0);
    }

    #[test]
    fn fehlberg_stays_close_to_rk4_for_small_steps() {
        let field = VectorField::new(Attractor::Roessler);
        let y = Vector3::new(1.0, 1.0, 0.0);
        let h = 1e-3;

        let a = Solver::Fehlberg45.step(&field, y, h).state;
        let b = Solver::RungeKutta4.step(&field, y, h).state;
        assert!((a - b).norm() < 1e-10);
    }

    #[test]
    fn fixed_point_flags_degenerate_estimate() {
        // The origin is an equilibrium of the Lorenz flow, so every scheme
        // stays put and the reference norm for the error ratio is zero.
        let field = VectorField::new(Attractor::Lorenz);
        let origin = Vector3::new(0.0, 0.0, 0.0);
        for solver in Solver::ALL {
            let result = solver.step(&field, origin, 0.01);
            assert_eq!(result.state, origin);
            assert_eq!(result.relative_error, None);
        }
    }

    #[test]
    fn error_estimates_shrink_with_the_step() {
        let field = VectorField::new(Attractor::Lorenz);
        let y = Vector3::new(1.0, 1.0, 1.0);
        for solver in Solver::ALL {
            let coarse = solver
                .step(&field, y, 1e-2)
                .relative_error
                .expect("estimate");
            let fine = solver
                .step(&field, y, 1e-4)
                .relative_error
                .expect("estimate");
            assert!(fine < coarse, "{solver}: {fine} >= {coarse}");
        }
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for solver in Solver::ALL {
            let parsed: Solver = solver.label().parse().expect("label should parse");
            assert_eq!(parsed, solver);
        }
        assert!("Dormand Prince".parse::<Solver>().is_err());
    }
}
