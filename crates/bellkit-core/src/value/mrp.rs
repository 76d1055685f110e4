use std::{fs, path::Path};

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::value::{config::ConfigError, error::ValueError, ids::StateKey, returns::compute_return};

/// Tolerance used when checking that transition rows sum to one.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Relative pivot size below which `I - gamma * P` is reported as singular.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Serializable MRP schema used for YAML IO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MrpSpec {
    /// Discount factor in `(0, 1]`.
    pub gamma: f64,
    /// Optional state labels, one per matrix row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,
    /// Row-stochastic transition matrix.
    pub transitions: Vec<Vec<f64>>,
    /// Immediate reward per state.
    pub rewards: Vec<f64>,
}

impl MrpSpec {
    /// Parse a spec from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(ConfigError::Yaml)
    }

    /// Load a spec from a YAML file.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_yaml_str(&yaml)
    }

    /// Write this spec to a YAML file.
    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self).map_err(ConfigError::Yaml)?;
        fs::write(path, yaml).map_err(ConfigError::Io)
    }

    /// Validate and build the runtime model.
    pub fn compile(&self) -> Result<Mrp, ValueError> {
        let mrp = Mrp::new(self.transitions.clone(), self.rewards.clone(), self.gamma)?;
        if self.states.is_empty() {
            Ok(mrp)
        } else {
            mrp.with_labels(self.states.clone())
        }
    }
}

/// Markov reward process with a dense transition matrix.
#[derive(Debug, Clone)]
pub struct Mrp {
    transitions: DMatrix<f64>,
    rewards: DVector<f64>,
    gamma: f64,
    labels: Vec<String>,
}

impl Mrp {
    /// Build an MRP from row-major transition rows, a reward vector, and a discount.
    ///
    /// Rows must be non-negative and sum to 1 within [`ROW_SUM_TOLERANCE`].
    pub fn new(
        transitions: Vec<Vec<f64>>,
        rewards: Vec<f64>,
        gamma: f64,
    ) -> Result<Self, ValueError> {
        let n = transitions.len();
        if n == 0 {
            return Err(ValueError::EmptyModel);
        }
        if rewards.len() != n {
            return Err(ValueError::DimensionMismatch {
                expected: n,
                found: rewards.len(),
            });
        }
        if !gamma.is_finite() || gamma <= 0.0 || gamma > 1.0 {
            return Err(ValueError::InvalidGamma { gamma });
        }

        let mut data = Vec::with_capacity(n * n);
        for (row, values) in transitions.iter().enumerate() {
            if values.len() != n {
                return Err(ValueError::DimensionMismatch {
                    expected: n,
                    found: values.len(),
                });
            }

            let mut sum = 0.0_f64;
            for (column, &value) in values.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(ValueError::InvalidTransition { row, column, value });
                }
                sum += value;
            }
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(ValueError::RowSum {
                    row,
                    sum,
                    tolerance: ROW_SUM_TOLERANCE,
                });
            }
            data.extend_from_slice(values);
        }

        for (state, &value) in rewards.iter().enumerate() {
            if !value.is_finite() {
                return Err(ValueError::InvalidReward { state, value });
            }
        }

        Ok(Mrp {
            transitions: DMatrix::from_row_slice(n, n, &data),
            rewards: DVector::from_vec(rewards),
            gamma,
            labels: (1..=n).map(|i| format!("s{i}")).collect(),
        })
    }

    /// Replace the default `s1..sn` labels.
    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self, ValueError> {
        if labels.len() != self.state_count() {
            return Err(ValueError::DimensionMismatch {
                expected: self.state_count(),
                found: labels.len(),
            });
        }
        self.labels = labels;
        Ok(self)
    }

    pub fn state_count(&self) -> usize {
        self.rewards.len()
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn rewards(&self) -> &[f64] {
        self.rewards.as_slice()
    }

    pub fn transitions(&self) -> &DMatrix<f64> {
        &self.transitions
    }

    /// Transition probability from `from` to `to`, or `None` for unknown states.
    pub fn transition(&self, from: StateKey, to: StateKey) -> Option<f64> {
        self.transitions.get((from.index(), to.index())).copied()
    }

    pub fn label(&self, state: StateKey) -> Option<&str> {
        self.labels.get(state.index()).map(String::as_str)
    }

    /// Resolve a state label into its key.
    pub fn state_key(&self, label: &str) -> Result<StateKey, ValueError> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(StateKey::from)
            .ok_or_else(|| ValueError::UnknownState {
                id: label.to_string(),
            })
    }

    /// Discounted return of `chain` from `start_index` using this model's rewards.
    pub fn compute_return(
        &self,
        chain: &[StateKey],
        start_index: usize,
    ) -> Result<f64, ValueError> {
        let state_count = self.state_count();
        if let Some(state) = chain.iter().find(|s| s.index() >= state_count) {
            return Err(ValueError::StateOutOfRange {
                state: *state,
                state_count,
            });
        }
        Ok(compute_return(chain, self.rewards(), self.gamma, start_index))
    }

    /// Solve `(I - gamma * P) V = R` with an LU decomposition.
    pub fn solve(&self) -> Result<Vec<f64>, ValueError> {
        solve_bellman(&self.transitions, &self.rewards, self.gamma)
    }

    /// Largest absolute deviation of `values` from `R + gamma * P * values`.
    pub fn bellman_residual(&self, values: &[f64]) -> Result<f64, ValueError> {
        if values.len() != self.state_count() {
            return Err(ValueError::DimensionMismatch {
                expected: self.state_count(),
                found: values.len(),
            });
        }
        let v = DVector::from_column_slice(values);
        let backup = &self.rewards + (&self.transitions * &v) * self.gamma;
        Ok((v - backup).amax())
    }
}

/// Solve the Bellman linear system for the value vector of an MRP.
///
/// The system is factorized rather than inverted. A pivot smaller than
/// [`SINGULARITY_TOLERANCE`] relative to the largest matrix entry is reported as
/// [`ValueError::Singular`].
pub fn solve_bellman(
    transitions: &DMatrix<f64>,
    rewards: &DVector<f64>,
    gamma: f64,
) -> Result<Vec<f64>, ValueError> {
    let n = rewards.len();
    if n == 0 {
        return Err(ValueError::EmptyModel);
    }
    if transitions.nrows() != n || transitions.ncols() != n {
        return Err(ValueError::DimensionMismatch {
            expected: n,
            found: transitions.nrows().max(transitions.ncols()),
        });
    }

    let system = DMatrix::<f64>::identity(n, n) - transitions * gamma;
    let tolerance = SINGULARITY_TOLERANCE * system.amax();
    let lu = system.lu();

    let smallest_pivot = lu
        .u()
        .diagonal()
        .iter()
        .map(|p| p.abs())
        .fold(f64::INFINITY, f64::min);
    if smallest_pivot <= tolerance {
        return Err(ValueError::Singular {
            pivot: smallest_pivot,
            tolerance,
        });
    }

    let solution = lu.solve(rewards).ok_or(ValueError::Singular {
        pivot: smallest_pivot,
        tolerance,
    })?;
    if solution.iter().any(|v| !v.is_finite()) {
        return Err(ValueError::NonFinite);
    }

    debug!(states = n, gamma, smallest_pivot, "solved bellman system");
    Ok(solution.iter().copied().collect())
}
