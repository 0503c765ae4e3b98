//! Exponential trend fitting and short-horizon projection.

pub mod fitter;
pub mod forecast;
pub mod grid;

pub use fitter::fit_exponential;
pub use forecast::fit_and_project;
