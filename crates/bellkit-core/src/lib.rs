pub mod demo;
mod value;

pub use value::config::{ConfigError, EvaluationConfig};
pub use value::episode::{Episode, Step};
pub use value::error::ValueError;
pub use value::ids::{ActionId, StateKey};
pub use value::monte_carlo::every_visit_monte_carlo;
pub use value::mrp::{Mrp, MrpSpec, ROW_SUM_TOLERANCE, SINGULARITY_TOLERANCE, solve_bellman};
pub use value::occupancy::{OccupancyCounts, occupancy};
pub use value::returns::compute_return;
pub use value::stats::{StateValueSnapshot, ValueTable, ValueTableSnapshot, VisitStats};
