//! The Factory engine: steady-state production-rate optimization.
//!
//! One JSON problem in, one JSON result out. The pipeline is:
//! classify items → compute effective craft rates → build the LP →
//! solve (with a relaxed-target search on infeasibility) → shape the
//! result document.

pub mod error;
pub mod lp;
pub mod problem;
pub mod rates;
pub mod schema;
pub mod solve;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::FactoryError;

/// Solve one factory problem presented as a JSON document and return the
/// serialized result document.
pub fn solve_json(input: &str) -> Result<String, FactoryError> {
    let data: schema::FactoryInput = serde_json::from_str(input)?;
    let problem = problem::FactoryProblem::from_input(data)?;
    let output = solve::solve_problem(&problem)?;
    Ok(serde_json::to_string(&output)?)
}
