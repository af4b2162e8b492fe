//! A gate set that records a human-readable log.

use std::fmt;

use serde::Serialize;

use crate::evaluator::RunMetadata;
use crate::gateset::{GateSet, QuantumOp};

/// Records every dispatched operation, both as [`QuantumOp`]s and as text
/// lines such as `h qubit[0]` or `m qubit[0] => out[0]`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GateLogger {
    pub ops: Vec<QuantumOp>,
    pub instructions: Vec<String>,
    pub number_of_qubits: u64,
    pub number_of_registers: u64,
}

impl GateLogger {
    /// Create an empty logger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GateSet for GateLogger {
    fn apply(&mut self, op: &QuantumOp) {
        self.instructions.push(format_op(op));
        self.ops.push(op.clone());
    }

    fn finish(&mut self, metadata: &RunMetadata) {
        self.number_of_qubits = metadata.num_qubits;
        self.number_of_registers = metadata.num_qubits;
    }
}

/// `qubits[N]`, `out[N]`, then one line per instruction.
impl fmt::Display for GateLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "qubits[{}]", self.number_of_qubits)?;
        writeln!(f, "out[{}]", self.number_of_registers)?;
        for line in &self.instructions {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// One log line for an operation.
pub fn format_op(op: &QuantumOp) -> String {
    let name = op.name();
    match *op {
        QuantumOp::Barrier => name.to_string(),
        QuantumOp::Ccx {
            control1,
            control2,
            target,
        } => format!("{name} qubit[{control1}], qubit[{control2}], qubit[{target}]"),
        QuantumOp::Cx { control, target } | QuantumOp::Cz { control, target } => {
            format!("{name} qubit[{control}], qubit[{target}]")
        }
        QuantumOp::Swap { qubit1, qubit2 } => format!("{name} qubit[{qubit1}], qubit[{qubit2}]"),
        QuantumOp::Rx { theta, qubit }
        | QuantumOp::Ry { theta, qubit }
        | QuantumOp::Rz { theta, qubit } => format!("{name} theta[{theta:?}] qubit[{qubit}]"),
        QuantumOp::Rxx {
            theta,
            qubit1,
            qubit2,
        }
        | QuantumOp::Ryy {
            theta,
            qubit1,
            qubit2,
        }
        | QuantumOp::Rzz {
            theta,
            qubit1,
            qubit2,
        } => format!("{name} theta[{theta:?}] qubit[{qubit1}], qubit[{qubit2}]"),
        QuantumOp::Reset { qubit } => format!("{name} {qubit}"),
        QuantumOp::M { qubit } => format!("{name} qubit[{qubit}] => out[]"),
        QuantumOp::Mz { qubit, result } | QuantumOp::MResetZ { qubit, result } => {
            format!("{name} qubit[{qubit}] => out[{result}]")
        }
        QuantumOp::H { qubit }
        | QuantumOp::S { qubit }
        | QuantumOp::SAdj { qubit }
        | QuantumOp::T { qubit }
        | QuantumOp::TAdj { qubit }
        | QuantumOp::X { qubit }
        | QuantumOp::Y { qubit }
        | QuantumOp::Z { qubit } => format!("{name} qubit[{qubit}]"),
    }
}
