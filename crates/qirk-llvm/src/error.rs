//! Error types for loading and verifying IR.

use thiserror::Error;

/// Errors that can occur while parsing IR text.
///
/// Every variant carries a 1-based line and column.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("{line}:{column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Unexpected token.
    #[error("{line}:{column}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("{line}:{column}: unexpected end of input, expected {expected}")]
    UnexpectedEof {
        line: usize,
        column: usize,
        expected: String,
    },

    /// Syntax that is valid LLVM but outside the supported subset.
    #[error("{line}:{column}: unsupported {construct}")]
    Unsupported {
        line: usize,
        column: usize,
        construct: String,
    },

    /// Reference to an attribute group that is never defined.
    #[error("{line}:{column}: undefined attribute group #{group}")]
    UndefinedAttributeGroup {
        line: usize,
        column: usize,
        group: u32,
    },

    /// A name defined twice at module level.
    #[error("{line}:{column}: redefinition of `{name}`")]
    Redefinition {
        line: usize,
        column: usize,
        name: String,
    },
}

impl ParseError {
    /// 1-based line and column of the error.
    pub fn position(&self) -> (usize, usize) {
        match self {
            ParseError::LexerError { line, column, .. }
            | ParseError::UnexpectedToken { line, column, .. }
            | ParseError::UnexpectedEof { line, column, .. }
            | ParseError::Unsupported { line, column, .. }
            | ParseError::UndefinedAttributeGroup { line, column, .. }
            | ParseError::Redefinition { line, column, .. } => (*line, *column),
        }
    }
}

/// A well-formed module that violates a structural rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum VerificationError {
    #[error("no function is marked as entry point")]
    NoEntryPoint,

    #[error("multiple entry points: {}", .0.join(", "))]
    MultipleEntryPoints(Vec<String>),

    #[error("entry point `{function}` is a declaration without a body")]
    EntryPointWithoutBody { function: String },

    #[error("entry point `{function}` is missing the `{attribute}` attribute")]
    MissingRequiredAttribute { function: String, attribute: String },

    #[error("entry point `{function}` has invalid `{attribute}` value `{value}`")]
    InvalidRequiredAttribute {
        function: String,
        attribute: String,
        value: String,
    },

    #[error("block `{block}` in `{function}` has no terminator")]
    MissingTerminator { function: String, block: String },

    #[error("block `{block}` in `{function}` has a terminator before its end")]
    MisplacedTerminator { function: String, block: String },

    #[error("label `{label}` defined more than once in `{function}`")]
    DuplicateLabel { function: String, label: String },

    #[error("branch in `{function}` block `{block}` targets unknown block `{target}`")]
    UnknownBranchTarget {
        function: String,
        block: String,
        target: String,
    },

    #[error("`{function}` calls undeclared function `{callee}`")]
    UnknownCallee { function: String, callee: String },

    #[error("`{function}` calls `{callee}` with {found} arguments, expected {expected}")]
    ArgumentCountMismatch {
        function: String,
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("`%{name}` is assigned more than once in `{function}`")]
    DuplicateAssignment { function: String, name: String },

    #[error("function `{0}` is defined more than once")]
    DuplicateFunction(String),

    #[error("`{function}` uses unsupported integer width i{width}")]
    UnsupportedIntegerWidth { function: String, width: u32 },

    #[error("{kind} {index} used in `{function}` is out of range (declared {limit})")]
    OperandOutOfRange {
        function: String,
        kind: &'static str,
        index: u64,
        limit: u64,
    },
}

impl VerificationError {
    /// Short identifier of the violated rule.
    pub fn rule(&self) -> &'static str {
        match self {
            VerificationError::NoEntryPoint
            | VerificationError::MultipleEntryPoints(_)
            | VerificationError::EntryPointWithoutBody { .. } => "entry-point",
            VerificationError::MissingRequiredAttribute { .. }
            | VerificationError::InvalidRequiredAttribute { .. } => "required-attributes",
            VerificationError::MissingTerminator { .. }
            | VerificationError::MisplacedTerminator { .. } => "terminator",
            VerificationError::DuplicateLabel { .. } => "unique-labels",
            VerificationError::UnknownBranchTarget { .. } => "branch-target",
            VerificationError::UnknownCallee { .. }
            | VerificationError::ArgumentCountMismatch { .. } => "call-target",
            VerificationError::DuplicateAssignment { .. } => "single-assignment",
            VerificationError::DuplicateFunction(_) => "unique-functions",
            VerificationError::UnsupportedIntegerWidth { .. } => "integer-width",
            VerificationError::OperandOutOfRange { .. } => "operand-range",
        }
    }
}

/// Either a parse or a verification failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for verification.
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Result type for loading.
pub type LoadResult<T> = Result<T, LoadError>;
