//! Textual LLVM IR loader and verifier for QIR modules.
//!
//! Reads the subset of LLVM assembly that QIR programs use into a
//! [`qirk_ir::Module`] and checks the structural rules evaluation relies on.
//!
//! # Supported Syntax
//!
//! | Construct | Example |
//! |-----------|---------|
//! | Opaque types | `%Qubit = type opaque` |
//! | Global strings | `@0 = internal constant [3 x i8] c"r0\00"` |
//! | Declarations | `declare void @__quantum__qis__h__body(%Qubit*)` |
//! | Definitions | `define void @main() #0 { ... }` |
//! | Attribute groups | `attributes #0 = { "entry_point" }` |
//! | Calls | `call void @f(%Qubit* inttoptr (i64 1 to %Qubit*))` |
//! | Integer ops | `add`, `icmp`, `zext`, `select`, ... |
//! | Branches | `br i1 %c, label %then, label %else` |
//! | Pointers | typed (`%Qubit*`) and opaque (`ptr`) |
//!
//! Target triples, data layouts, metadata, `tail` markers and parameter
//! attributes are accepted and dropped.
//!
//! # Example
//!
//! ```rust
//! use qirk_ir::{ModuleBuilder, QubitId};
//!
//! let mut builder = ModuleBuilder::new("bell", 2, 2).unwrap();
//! builder.h(QubitId(0)).unwrap();
//! builder.emit_return().unwrap();
//! let ir = builder.ir().unwrap();
//!
//! let module = qirk_llvm::load(&ir).unwrap();
//! let main = module.entry_point().unwrap();
//! assert_eq!(main.required_num_qubits(), Some(2));
//! ```

mod error;
mod lexer;
mod parser;
mod verify;

use std::path::Path;

use qirk_ir::Module;
use tracing::instrument;

pub use error::{
    LoadError, LoadResult, ParseError, ParseResult, VerificationError, VerifyResult,
};
pub use parser::parse;
pub use verify::{MAX_INTEGER_WIDTH, verify};

/// Parse and verify IR text.
#[instrument(skip(source), fields(bytes = source.len()))]
pub fn load(source: &str) -> LoadResult<Module> {
    let module = parse(source)?;
    verify(&module)?;
    tracing::debug!(
        name = %module.name,
        functions = module.functions.len(),
        "module loaded"
    );
    Ok(module)
}

/// Read, parse and verify an `.ll` file.
pub fn load_file(path: impl AsRef<Path>) -> LoadResult<Module> {
    let source = std::fs::read_to_string(path)?;
    load(&source)
}
