/// Errors surfaced by the Factory engine.
///
/// Load-time violations name the offending field or identifier; the solver
/// variant covers anomalies that should not occur for well-formed problems
/// (unbounded objective, internal simplex failure). Constraint
/// inconsistency is not an error: it is answered with an infeasible result
/// document.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate recipe name '{0}'")]
    DuplicateRecipe(String),

    #[error("recipe '{recipe}' references unknown machine '{machine}'")]
    UnknownMachine { recipe: String, machine: String },

    #[error("recipe '{0}' references an empty item identifier")]
    EmptyItem(String),

    #[error("recipe '{recipe}' has a negative or non-finite quantity for item '{item}'")]
    BadQuantity { recipe: String, item: String },

    #[error("recipe '{0}' has a non-positive crafting time")]
    NonPositiveTime(String),

    #[error("recipe '{0}' has a non-positive effective craft rate")]
    NonPositiveRate(String),

    #[error("machine '{0}' has a speed multiplier below -1")]
    SpeedMultTooLow(String),

    #[error("machine '{0}' has a negative productivity multiplier")]
    NegativeProductivity(String),

    #[error("machine '{0}' has a non-positive base speed")]
    NonPositiveBaseSpeed(String),

    #[error("negative or non-finite supply cap for raw item '{0}'")]
    BadSupplyCap(String),

    #[error("target item identifier is empty")]
    EmptyTarget,

    #[error("target item '{0}' is not produced by any recipe")]
    TargetNotProduced(String),

    #[error("target rate must be a non-negative finite number, got {0}")]
    BadTargetRate(f64),

    #[error("LP solver failure: {0}")]
    Solver(String),
}
