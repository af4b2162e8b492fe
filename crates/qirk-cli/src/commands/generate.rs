//! Generate command implementation.

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use qirk_ir::{Module, ModuleBuilder, QubitId, ResultId};

use super::common::write_output;

/// Demo programs `qirk generate` can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Program {
    /// Bell pair with both qubits measured
    Bell,
    /// Three-qubit teleportation with measurement-controlled corrections
    Teleport,
    /// Bernstein-Vazirani parity recovery
    BernsteinVazirani,
}

/// Default query register size for Bernstein-Vazirani.
pub const DEFAULT_BV_QUBITS: u64 = 8;
/// Default hidden pattern for Bernstein-Vazirani.
pub const DEFAULT_BV_PATTERN: u64 = 12;

/// Execute the generate command.
pub fn execute(
    program: Program,
    qubits: Option<u64>,
    pattern: Option<u64>,
    output: Option<&Path>,
) -> Result<()> {
    let module = build(program, qubits, pattern)?;
    write_output(&qirk_ir::emit(&module), output)
}

/// Build the requested program.
pub fn build(program: Program, qubits: Option<u64>, pattern: Option<u64>) -> Result<Module> {
    if program != Program::BernsteinVazirani && (qubits.is_some() || pattern.is_some()) {
        anyhow::bail!("--qubits and --pattern only apply to bernstein-vazirani");
    }
    match program {
        Program::Bell => bell(),
        Program::Teleport => teleport(),
        Program::BernsteinVazirani => bernstein_vazirani(
            qubits.unwrap_or(DEFAULT_BV_QUBITS),
            pattern.unwrap_or(DEFAULT_BV_PATTERN),
        ),
    }
}

fn bell() -> Result<Module> {
    let mut builder = ModuleBuilder::new("bell", 2, 2)?;
    builder.h(QubitId(0))?;
    builder.cx(QubitId(0), QubitId(1))?;
    builder.mz(QubitId(0), ResultId(0))?;
    builder.mz(QubitId(1), ResultId(1))?;
    record_results(&mut builder, 2)?;
    builder.emit_return()?;
    Ok(builder.finish()?)
}

fn teleport() -> Result<Module> {
    let (msg, target, register) = (QubitId(0), QubitId(1), QubitId(2));
    let mut builder = ModuleBuilder::new("teleport", 3, 2)?;

    // Entangle target and register.
    builder.h(register)?;
    builder.cx(register, target)?;

    builder.cx(msg, register)?;
    builder.h(msg)?;

    builder.mz(msg, ResultId(0))?;
    builder.reset(msg)?;
    builder.if_result(ResultId(0), |b| b.z(target).map(|_| ()), |_| Ok(()))?;

    builder.mz(register, ResultId(1))?;
    builder.reset(register)?;
    builder.if_result(ResultId(1), |b| b.x(target).map(|_| ()), |_| Ok(()))?;

    builder.emit_return()?;
    Ok(builder.finish()?)
}

/// `n` query qubits plus one target; bit `i` of `pattern` (little-endian)
/// is the parity coefficient of query qubit `i`.
fn bernstein_vazirani(n: u64, pattern: u64) -> Result<Module> {
    if !(1..=63).contains(&n) {
        anyhow::bail!("--qubits must be between 1 and 63, got {n}");
    }
    if pattern >= 1 << n {
        anyhow::bail!("--pattern must be below 2^{n}, got {pattern}");
    }

    let num_qubits = i64::try_from(n + 1)?;
    let num_results = i64::try_from(n)?;
    let mut builder = ModuleBuilder::new("bernstein_vazirani", num_qubits, num_results)?;
    let target = QubitId(n);
    let query = || (0..n).map(QubitId);

    builder.x(target)?;
    for q in query() {
        builder.h(q)?;
    }
    builder.h(target)?;

    for q in query().filter(|q| pattern & (1 << q.0) != 0) {
        builder.cx(q, target)?;
    }

    for q in query() {
        builder.h(q)?;
    }
    builder.reset(target)?;

    for q in query() {
        builder.mz(q, ResultId(q.0))?;
        builder.reset(q)?;
    }
    record_results(&mut builder, n)?;
    builder.emit_return()?;
    Ok(builder.finish()?)
}

fn record_results(builder: &mut ModuleBuilder, n: u64) -> Result<()> {
    builder.array_record_output(i64::try_from(n)?, None)?;
    for r in 0..n {
        builder.result_record_output(ResultId(r), Some(&format!("r{r}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qirk_eval::{GateLogger, OutputRecord, eval};

    #[test]
    fn test_bell_loads() {
        let module = build(Program::Bell, None, None).unwrap();
        let reloaded = qirk_llvm::load(&qirk_ir::emit(&module)).unwrap();
        assert_eq!(reloaded.entry_point().unwrap().required_num_qubits(), Some(2));
    }

    #[test]
    fn test_teleport_corrections() {
        let module = build(Program::Teleport, None, None).unwrap();
        let mut logger = GateLogger::new();
        eval(&module, &mut logger, None, Some(&[true, true])).unwrap();
        assert!(logger.instructions.contains(&"z qubit[1]".to_string()));
        assert!(logger.instructions.contains(&"x qubit[1]".to_string()));

        let mut logger = GateLogger::new();
        eval(&module, &mut logger, None, Some(&[false, false])).unwrap();
        assert!(!logger.instructions.contains(&"z qubit[1]".to_string()));
    }

    #[test]
    fn test_bernstein_vazirani_structure() {
        let module = build(Program::BernsteinVazirani, Some(4), Some(0b0101)).unwrap();
        let mut logger = GateLogger::new();
        let metadata = eval(&module, &mut logger, None, None).unwrap();

        let cx: Vec<&String> = logger
            .instructions
            .iter()
            .filter(|line| line.starts_with("cx"))
            .collect();
        assert_eq!(cx, vec!["cx qubit[0], qubit[4]", "cx qubit[2], qubit[4]"]);
        assert_eq!(metadata.num_qubits, 5);
        assert_eq!(
            metadata.output[0],
            OutputRecord::Array {
                len: 4,
                label: None
            }
        );
    }

    #[test]
    fn test_bernstein_vazirani_bounds() {
        assert!(build(Program::BernsteinVazirani, Some(3), Some(8)).is_err());
        assert!(build(Program::BernsteinVazirani, Some(0), None).is_err());
        assert!(build(Program::Bell, Some(3), None).is_err());
    }
}
