//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use qirk_ir::Module;

/// Read an `.ll` file.
pub fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Read, parse and verify a module.
pub fn load_module(path: &Path) -> Result<Module> {
    let source = read_source(path)?;
    qirk_llvm::load(&source).with_context(|| format!("Failed to load {}", path.display()))
}

/// Read and parse a module without verifying it.
pub fn parse_module(path: &Path) -> Result<Module> {
    let source = read_source(path)?;
    qirk_llvm::parse(&source).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display())),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

/// Parse a result stream given as a bit string (`1011`) or a
/// comma-separated list (`true,false,1,0`).
pub fn parse_results(text: &str) -> Result<Vec<bool>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(vec![]);
    }

    if text.contains(',') {
        return text
            .split(',')
            .map(|item| match item.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => {
                    anyhow::bail!("Invalid result value: '{other}'. Expected true, false, 1 or 0")
                }
            })
            .collect();
    }

    match text.to_ascii_lowercase().as_str() {
        "true" => return Ok(vec![true]),
        "false" => return Ok(vec![false]),
        _ => {}
    }

    text.chars()
        .map(|c| match c {
            '1' => Ok(true),
            '0' => Ok(false),
            other => anyhow::bail!("Invalid result bit: '{other}'. Expected a string of 0s and 1s"),
        })
        .collect()
}
