//! Non-adaptive QIR evaluation.
//!
//! The evaluator walks a module's entry point instruction by instruction.
//! Classical instructions are executed with fixed-width integer semantics,
//! quantum intrinsics are handed to a caller-supplied [`GateSet`], and
//! branches on measurement results take their outcomes from an optional
//! result stream. No quantum state is simulated.
//!
//! # Example
//!
//! ```rust
//! use qirk_eval::{GateLogger, eval};
//! use qirk_ir::{ModuleBuilder, QubitId, ResultId};
//!
//! let mut builder = ModuleBuilder::new("bell", 2, 2).unwrap();
//! builder.h(QubitId(0)).unwrap();
//! builder.cx(QubitId(0), QubitId(1)).unwrap();
//! builder.mz(QubitId(0), ResultId(0)).unwrap();
//! builder.mz(QubitId(1), ResultId(1)).unwrap();
//! builder.emit_return().unwrap();
//! let module = builder.finish().unwrap();
//!
//! let mut logger = GateLogger::new();
//! eval(&module, &mut logger, None, None).unwrap();
//! assert_eq!(
//!     logger.to_string(),
//!     "qubits[2]\nout[2]\nh qubit[0]\ncx qubit[0], qubit[1]\n\
//!      m qubit[0] => out[0]\nm qubit[1] => out[1]\n"
//! );
//! ```
//!
//! # Result streams
//!
//! Each measurement (`mz`, `mresetz`, `m`) takes the next value of the
//! stream. Reading a result that was never measured also takes one. Without
//! a stream every outcome is `false`; a stream that runs out fails the run
//! with [`EvalError::ResultStreamExhausted`].

pub mod arith;
pub mod error;
pub mod evaluator;
pub mod gateset;
pub mod logger;

pub use error::{EvalError, EvalResult};
pub use evaluator::{
    DEFAULT_MAX_CALL_DEPTH, EvalConfig, Evaluator, Measurement, OutputRecord, RunMetadata, eval,
};
pub use gateset::{GateSet, QuantumOp};
pub use logger::{GateLogger, format_op};
