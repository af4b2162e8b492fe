//! Error types for evaluation.

use thiserror::Error;

/// Errors produced while evaluating a module.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EvalError {
    /// No function to start from.
    #[error("Entry point not found: {0}")]
    EntryPointNotFound(String),

    /// Reachable declarations outside the intrinsic catalog.
    #[error("Unsupported functions {}.", quote_names(.0))]
    UnsupportedIntrinsic(Vec<String>),

    /// A measurement needed a value the result stream no longer has.
    #[error("Result stream exhausted after {consumed} values")]
    ResultStreamExhausted {
        /// Number of values consumed before the failing measurement.
        consumed: usize,
    },

    /// A local was read before any instruction bound it.
    #[error("`%{name}` is not bound in `{function}`")]
    UnboundValue { function: String, name: String },

    /// A value had a different kind or width than its use requires.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Shift by at least the bit width, division by zero, signed overflow.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// `EvalConfig::max_steps` instructions executed without returning.
    #[error("Step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },

    /// Too many nested calls to defined functions.
    #[error("Call depth limit of {limit} exceeded")]
    CallDepthExceeded { limit: usize },

    /// An operand the evaluator cannot interpret.
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),
}

impl EvalError {
    /// Check if this error happened while executing instructions, as
    /// opposed to while preparing the run.
    pub fn is_evaluation_fault(&self) -> bool {
        matches!(
            self,
            EvalError::UnboundValue { .. }
                | EvalError::TypeMismatch(_)
                | EvalError::Arithmetic(_)
                | EvalError::StepLimitExceeded { .. }
                | EvalError::CallDepthExceeded { .. }
                | EvalError::InvalidOperand(_)
        )
    }
}

fn quote_names(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = EvalError::UnsupportedIntrinsic(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Unsupported functions `a`, `b`.");
        assert!(!err.is_evaluation_fault());
    }

    #[test]
    fn test_fault_classification() {
        assert!(EvalError::Arithmetic("division by zero".into()).is_evaluation_fault());
        assert!(!EvalError::ResultStreamExhausted { consumed: 2 }.is_evaluation_fault());
    }
}
