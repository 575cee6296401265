use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// State vector of an attractor flow.
pub type State = Vector3<f64>;

/// The attractor systems the engine knows how to integrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attractor {
    Lorenz,
    Thomas,
    Roessler,
}

impl Attractor {
    /// Every selectable attractor, in display order.
    pub const ALL: [Attractor; 3] = [Attractor::Lorenz, Attractor::Thomas, Attractor::Roessler];

    pub fn label(&self) -> &'static str {
        match self {
            Attractor::Lorenz => "Lorenz",
            Attractor::Thomas => "Thomas",
            Attractor::Roessler => "Roessler",
        }
    }

    /// Names of the tunable coefficients, in parameter order.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            Attractor::Lorenz => &["a", "b", "c"],
            Attractor::Thomas => &["b"],
            Attractor::Roessler => &["a", "b", "c"],
        }
    }

    pub fn default_parameters(&self) -> &'static [f64] {
        match self {
            Attractor::Lorenz => &[10.0, 28.0, 8.0 / 3.0],
            Attractor::Thomas => &[0.208186],
            Attractor::Roessler => &[0.2, 0.2, 14.0],
        }
    }

    /// Slider display ranges per coefficient. Purely a UI hint; the engine
    /// accepts any real values.
    pub fn parameter_intervals(&self) -> &'static [(f64, f64)] {
        match self {
            Attractor::Lorenz => &[(1.0, 100.0), (1.0, 50.0), (0.1, 10.0)],
            Attractor::Thomas => &[(0.0001, 1.0)],
            Attractor::Roessler => &[(0.0, 2.0), (0.0, 2.0), (1.0, 20.0)],
        }
    }

    pub fn default_initial_state(&self) -> State {
        match self {
            Attractor::Lorenz => Vector3::new(1.0, 1.0, 1.0),
            Attractor::Thomas => Vector3::new(0.0, -1.0, 7.0),
            Attractor::Roessler => Vector3::new(1.0, 1.0, 0.0),
        }
    }

    /// Number of coefficients the variant takes.
    pub fn parameter_count(&self) -> usize {
        self.parameter_names().len()
    }
}

impl fmt::Display for Attractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown attractor {0:?}")]
pub struct UnknownAttractor(pub String);

impl FromStr for Attractor {
    type Err = UnknownAttractor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attractor::ALL
            .into_iter()
            .find(|a| a.label() == s)
            .ok_or_else(|| UnknownAttractor(s.to_string()))
    }
}

/// Coefficient count did not match the attractor's arity; the requested
/// reconfiguration was discarded.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{attractor} takes {expected} parameters, got {got}")]
pub struct ParameterCountError {
    pub attractor: Attractor,
    pub expected: usize,
    pub got: usize,
}

/// A concrete flow: an attractor tag plus a snapshot of its coefficients.
///
/// Fields are never mutated in place. Parameter edits and variant switches
/// construct a fresh `VectorField`, so a derivative evaluation cannot
/// observe a half-updated coefficient set.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    attractor: Attractor,
    parameters: Vec<f64>,
}

impl VectorField {
    /// Field with the variant's default coefficients.
    pub fn new(attractor: Attractor) -> Self {
        Self {
            attractor,
            parameters: attractor.default_parameters().to_vec(),
        }
    }

    /// Field with caller-supplied coefficients. The count must match the
    /// variant's arity; values themselves are unconstrained.
    pub fn with_parameters(
        attractor: Attractor,
        parameters: &[f64],
    ) -> Result<Self, ParameterCountError> {
        let expected = attractor.parameter_count();
        if parameters.len() != expected {
            return Err(ParameterCountError {
                attractor,
                expected,
                got: parameters.len(),
            });
        }
        Ok(Self {
            attractor,
            parameters: parameters.to_vec(),
        })
    }

    pub fn attractor(&self) -> Attractor {
        self.attractor
    }

    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Evaluates dy/dt at `y`. Pure and O(1); the flows are autonomous, so
    /// there is no time argument.
    pub fn derivative(&self, y: State) -> State {
        let p = &self.parameters;
        match self.attractor {
            Attractor::Lorenz => Vector3::new(
                p[0] * (y.y - y.x),
                y.x * (p[1] - y.z) - y.y,
                y.x * y.y - p[2] * y.z,
            ),
            Attractor::Thomas => Vector3::new(
                y.y.sin() - p[0] * y.x,
                y.z.sin() - p[0] * y.y,
                y.x.sin() - p[0] * y.z,
            ),
            Attractor::Roessler => Vector3::new(
                -y.y - y.z,
                y.x + p[0] * y.y,
                p[1] + y.z * (y.x - p[2]),
            ),
        }
    }
}
