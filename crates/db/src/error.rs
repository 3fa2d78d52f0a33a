use std::time::Duration;

use teyvat_core::search::ValidationErrors;

/// The SQL for a repository call could not be assembled.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryBuildError {
    #[error("statement needs {count} bind parameters, the limit is {max}")]
    TooManyBindParameters { count: usize, max: usize },

    #[error("unsigned operand {0} does not fit a signed 64-bit parameter")]
    OperandOutOfRange(u64),

    #[error("operand {0} is not a finite number")]
    NonFiniteOperand(f64),

    #[error("operand has no numeric value")]
    UnknownOperand,
}

/// Error returned by [`CharacterRepo`](crate::repositories::CharacterRepo).
#[derive(Debug, thiserror::Error)]
pub enum CharacterRepoError {
    #[error("invalid search arguments: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("failed to build query: {0}")]
    QueryBuild(#[from] QueryBuildError),

    /// Propagated unchanged from the store.
    #[error(transparent)]
    Store(#[from] sqlx::Error),

    #[error("query cancelled")]
    Cancelled,

    #[error("query did not finish within {0:?}")]
    Timeout(Duration),
}
