use std::fmt;

use crate::value::ids::StateKey;

/// Error type for MRP construction, analytic solves, and value accumulation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    /// The model declares no states.
    EmptyModel,
    /// A matrix row, reward vector, or label list has the wrong length.
    DimensionMismatch { expected: usize, found: usize },
    /// A transition entry is negative, NaN, or infinite.
    InvalidTransition {
        row: usize,
        column: usize,
        value: f64,
    },
    /// A transition row does not sum to 1 within tolerance.
    RowSum {
        row: usize,
        sum: f64,
        tolerance: f64,
    },
    /// A reward is NaN or infinite.
    InvalidReward { state: usize, value: f64 },
    /// The discount factor lies outside `(0, 1]`.
    InvalidGamma { gamma: f64 },
    /// `I - gamma * P` is singular or too close to singular to solve.
    Singular { pivot: f64, tolerance: f64 },
    /// The solve produced NaN or infinite values.
    NonFinite,
    /// A state index falls outside the value table.
    StateOutOfRange {
        state: StateKey,
        state_count: usize,
    },
    /// A state label could not be resolved.
    UnknownState { id: String },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::EmptyModel => write!(f, "model must declare at least one state"),
            ValueError::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            ValueError::InvalidTransition { row, column, value } => write!(
                f,
                "invalid transition probability at ({row}, {column}): {value}"
            ),
            ValueError::RowSum {
                row,
                sum,
                tolerance,
            } => write!(
                f,
                "transition row {row} must sum to 1.0 within {tolerance}, got {sum}"
            ),
            ValueError::InvalidReward { state, value } => {
                write!(f, "invalid reward for state {state}: {value}")
            }
            ValueError::InvalidGamma { gamma } => {
                write!(f, "discount factor must lie in (0, 1], got {gamma}")
            }
            ValueError::Singular { pivot, tolerance } => write!(
                f,
                "bellman system is singular: pivot {pivot} is below tolerance {tolerance}"
            ),
            ValueError::NonFinite => write!(f, "bellman solve produced non-finite values"),
            ValueError::StateOutOfRange { state, state_count } => write!(
                f,
                "state {} is out of range for a table of {} states",
                state.index(),
                state_count
            ),
            ValueError::UnknownState { id } => write!(f, "unknown state id '{id}'"),
        }
    }
}

impl std::error::Error for ValueError {}
