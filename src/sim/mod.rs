//! Simulation: Life-like rules and the memoized quadtree stepper.

mod hashlife;
mod rule;

pub use hashlife::HashLife;
pub use rule::{Rule, RuleError};

#[cfg(test)]
mod tests;
