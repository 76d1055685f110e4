pub mod config;
pub mod episode;
pub mod error;
pub mod ids;
pub mod monte_carlo;
pub mod mrp;
pub mod occupancy;
pub mod returns;
pub mod stats;

#[cfg(test)]
mod tests;
