//! The Belts engine: generalized maximum flow.
//!
//! One JSON problem in, one JSON result out. The pipeline is:
//! validate → normalize (node splitting) → lower-bound transform with
//! virtual wiring → feasibility phase → main max-flow phase → certificate
//! or flow reconstruction.

pub mod error;
pub mod graph;
pub mod problem;
pub mod schema;
pub mod solve;
pub mod transform;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::BeltsError;

/// Solve one belts problem presented as a JSON document and return the
/// serialized result document.
pub fn solve_json(input: &str) -> Result<String, BeltsError> {
    let data: schema::BeltsInput = serde_json::from_str(input)?;
    let problem = problem::BeltsProblem::from_input(data)?;
    let output = solve::solve_problem(&problem)?;
    Ok(serde_json::to_string(&output)?)
}
