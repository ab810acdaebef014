pub mod analyzer;
pub mod indicators;
pub mod long_term;
pub mod series;
pub mod short_term;
pub mod signals;
pub mod styles;

#[cfg(test)]
mod indicators_tests;

pub use analyzer::*;
pub use signals::*;
pub use styles::*;
