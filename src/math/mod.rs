//! Numeric primitives shared by the trend fitter.

pub mod ols;

pub use ols::solve_least_squares;
