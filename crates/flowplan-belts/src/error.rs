/// Errors surfaced by the Belts engine.
///
/// Load-time violations name the offending field or identifier. The
/// numeric-anomaly variants cover conditions that cannot arise from a
/// correct solve; infeasible networks are not errors and get a certificate
/// in the result document instead.
#[derive(Debug, thiserror::Error)]
pub enum BeltsError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("edge {index} references an empty node identifier")]
    EmptyNodeId { index: usize },

    #[error("edge {from} -> {to} has a negative or non-finite lower bound")]
    BadLowerBound { from: String, to: String },

    #[error("edge {from} -> {to} has upper bound below lower bound (or non-finite)")]
    BadBounds { from: String, to: String },

    #[error("node '{0}' has a negative or non-finite capacity")]
    BadNodeCapacity(String),

    #[error("source '{0}' has a negative or non-finite capacity")]
    BadSourceCapacity(String),

    #[error("source '{0}' declared more than once")]
    DuplicateSource(String),

    #[error("sink '{0}' declared more than once")]
    DuplicateSink(String),

    #[error("node '{0}' declared more than once")]
    DuplicateNode(String),

    #[error("node '{0}' is declared both source and sink")]
    SourceIsSink(String),

    #[error("source '{0}' must not also appear in the nodes list")]
    SourceRedeclared(String),

    #[error("empty identifier in the {0} list")]
    EmptyDeclaredId(&'static str),

    #[error("problem declares no sources")]
    NoSources,

    #[error("problem declares no sinks")]
    NoSinks,

    #[error("negative residual on arc {detail}")]
    NegativeResidual { detail: String },

    #[error("flow conservation violated at node '{node}' by {imbalance}")]
    ConservationViolated { node: String, imbalance: f64 },
}
