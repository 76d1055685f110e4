mod monte_carlo_tests;
mod occupancy_tests;
mod returns_tests;
