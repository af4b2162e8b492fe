//! Verify command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use qirk_ir::Intrinsic;

use super::common::load_module;

/// Execute the verify command.
pub fn execute(input: &Path) -> Result<()> {
    let module = load_module(input)?;
    let entry = module
        .entry_point()
        .context("Verified module has no entry point")?;

    println!(
        "{} {} is valid QIR",
        style("✓").green().bold(),
        style(input.display()).green()
    );
    println!("  Entry point: {}", style(&entry.name).cyan());
    println!(
        "  Qubits:      {}",
        entry.required_num_qubits().unwrap_or_default()
    );
    println!(
        "  Results:     {}",
        entry.required_num_results().unwrap_or_default()
    );

    let (intrinsics, external): (Vec<_>, Vec<_>) = module
        .declarations()
        .partition(|f| Intrinsic::from_name(&f.name).is_some());

    println!("  Intrinsics:  {}", intrinsics.len());
    for function in &intrinsics {
        println!("    {}", function.name);
    }
    if !external.is_empty() {
        println!(
            "  {} {} declarations outside the intrinsic catalog",
            style("!").yellow().bold(),
            external.len()
        );
        for function in &external {
            println!("    {}", style(&function.name).yellow());
        }
    }

    Ok(())
}
