//! qirk Intermediate Representation
//!
//! This crate holds the in-memory model of a QIR module and the tools to
//! produce one: a typed [`ModuleBuilder`] and a canonical textual emitter.
//! The loader (`qirk-llvm`) and the evaluator (`qirk-eval`) both work on the
//! types defined here.
//!
//! # Overview
//!
//! QIR is LLVM IR in which quantum operations are calls to conventionally
//! named functions. Qubits and results are opaque pointers; a static index
//! N is written `null` (N = 0) or `inttoptr (i64 N to %Qubit*)`.
//!
//! # Core Components
//!
//! - **Identifiers**: [`QubitId`], [`ResultId`]
//! - **Types and values**: [`Type`], [`Value`], [`Operand`]
//! - **Instructions**: [`Instruction`] with [`BinaryOp`], [`IntPredicate`], [`CastOp`]
//! - **Structure**: [`Module`], [`Function`], [`BasicBlock`], [`Attribute`]
//! - **Catalog**: [`Intrinsic`] lists every recognized `__quantum__*` function
//! - **Graphs**: [`CallGraph`], [`ControlFlowGraph`]
//! - **Construction**: [`ModuleBuilder`], [`emit`]
//!
//! # Example: Building a Bell pair
//!
//! ```rust
//! use qirk_ir::{ModuleBuilder, QubitId, ResultId};
//!
//! let mut builder = ModuleBuilder::new("bell", 2, 2).unwrap();
//! builder.h(QubitId(0)).unwrap();
//! builder.cx(QubitId(0), QubitId(1)).unwrap();
//! builder.mz(QubitId(0), ResultId(0)).unwrap();
//! builder.mz(QubitId(1), ResultId(1)).unwrap();
//! builder.emit_return().unwrap();
//!
//! let module = builder.finish().unwrap();
//! assert_eq!(module.entry_point().unwrap().required_num_qubits(), Some(2));
//!
//! let text = qirk_ir::emit(&module);
//! assert!(text.starts_with("; ModuleID = 'bell'"));
//! ```
//!
//! # Example: Branching on a measurement
//!
//! ```rust
//! use qirk_ir::{ModuleBuilder, QubitId, ResultId};
//!
//! let mut builder = ModuleBuilder::new("if_then", 1, 1).unwrap();
//! builder.mz(QubitId(0), ResultId(0)).unwrap();
//! builder
//!     .if_result(ResultId(0), |b| b.x(QubitId(0)).map(|_| ()), |_| Ok(()))
//!     .unwrap();
//! builder.emit_return().unwrap();
//!
//! let ir = builder.ir().unwrap();
//! assert!(ir.contains("br i1 %0, label %then, label %else"));
//! ```

pub mod builder;
pub mod emitter;
pub mod error;
pub mod graph;
pub mod instruction;
pub mod intrinsic;
pub mod module;
pub mod qubit;
pub mod types;
pub mod value;

pub use builder::{ENTRY_FUNCTION, ModuleBuilder};
pub use emitter::emit;
pub use error::{IrError, IrResult};
pub use graph::{CallGraph, ControlFlowGraph};
pub use instruction::{BinaryOp, CastOp, Instruction, IntPredicate};
pub use intrinsic::{Intrinsic, Signature};
pub use module::{Attribute, BasicBlock, Function, GlobalString, Module, Param};
pub use qubit::{QubitId, ResultId};
pub use types::Type;
pub use value::{Operand, Value, format_double};
