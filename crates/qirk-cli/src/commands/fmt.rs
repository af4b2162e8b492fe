//! Fmt command implementation.

use std::path::Path;

use anyhow::Result;

use super::common::{parse_module, write_output};

/// Execute the fmt command: re-emit a module in canonical form.
pub fn execute(input: &Path, output: Option<&Path>) -> Result<()> {
    let module = parse_module(input)?;
    write_output(&qirk_ir::emit(&module), output)
}
