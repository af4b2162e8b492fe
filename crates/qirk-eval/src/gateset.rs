//! Quantum operations and the handler interface they are dispatched to.

use serde::Serialize;

use crate::evaluator::RunMetadata;

/// A dispatched quantum intrinsic with its qubit and result indices
/// resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QuantumOp {
    Barrier,
    Ccx {
        control1: u64,
        control2: u64,
        target: u64,
    },
    Cx {
        control: u64,
        target: u64,
    },
    Cz {
        control: u64,
        target: u64,
    },
    H {
        qubit: u64,
    },
    S {
        qubit: u64,
    },
    SAdj {
        qubit: u64,
    },
    T {
        qubit: u64,
    },
    TAdj {
        qubit: u64,
    },
    X {
        qubit: u64,
    },
    Y {
        qubit: u64,
    },
    Z {
        qubit: u64,
    },
    Rx {
        theta: f64,
        qubit: u64,
    },
    Ry {
        theta: f64,
        qubit: u64,
    },
    Rz {
        theta: f64,
        qubit: u64,
    },
    Rxx {
        theta: f64,
        qubit1: u64,
        qubit2: u64,
    },
    Ryy {
        theta: f64,
        qubit1: u64,
        qubit2: u64,
    },
    Rzz {
        theta: f64,
        qubit1: u64,
        qubit2: u64,
    },
    Swap {
        qubit1: u64,
        qubit2: u64,
    },
    Reset {
        qubit: u64,
    },
    /// `m`: measurement whose result is returned rather than stored.
    M {
        qubit: u64,
    },
    Mz {
        qubit: u64,
        result: u64,
    },
    MResetZ {
        qubit: u64,
        result: u64,
    },
}

impl QuantumOp {
    /// Short gate name.
    pub fn name(&self) -> &'static str {
        match self {
            QuantumOp::Barrier => "barrier",
            QuantumOp::Ccx { .. } => "ccx",
            QuantumOp::Cx { .. } => "cx",
            QuantumOp::Cz { .. } => "cz",
            QuantumOp::H { .. } => "h",
            QuantumOp::S { .. } => "s",
            QuantumOp::SAdj { .. } => "s_adj",
            QuantumOp::T { .. } => "t",
            QuantumOp::TAdj { .. } => "t_adj",
            QuantumOp::X { .. } => "x",
            QuantumOp::Y { .. } => "y",
            QuantumOp::Z { .. } => "z",
            QuantumOp::Rx { .. } => "rx",
            QuantumOp::Ry { .. } => "ry",
            QuantumOp::Rz { .. } => "rz",
            QuantumOp::Rxx { .. } => "rxx",
            QuantumOp::Ryy { .. } => "ryy",
            QuantumOp::Rzz { .. } => "rzz",
            QuantumOp::Swap { .. } => "swap",
            QuantumOp::Reset { .. } => "reset",
            QuantumOp::M { .. } | QuantumOp::Mz { .. } => "m",
            QuantumOp::MResetZ { .. } => "mresetz",
        }
    }

    /// Qubits this operation acts on.
    pub fn qubits(&self) -> Vec<u64> {
        match *self {
            QuantumOp::Barrier => vec![],
            QuantumOp::Ccx {
                control1,
                control2,
                target,
            } => vec![control1, control2, target],
            QuantumOp::Cx { control, target } | QuantumOp::Cz { control, target } => {
                vec![control, target]
            }
            QuantumOp::H { qubit }
            | QuantumOp::S { qubit }
            | QuantumOp::SAdj { qubit }
            | QuantumOp::T { qubit }
            | QuantumOp::TAdj { qubit }
            | QuantumOp::X { qubit }
            | QuantumOp::Y { qubit }
            | QuantumOp::Z { qubit }
            | QuantumOp::Rx { qubit, .. }
            | QuantumOp::Ry { qubit, .. }
            | QuantumOp::Rz { qubit, .. }
            | QuantumOp::Reset { qubit }
            | QuantumOp::M { qubit }
            | QuantumOp::Mz { qubit, .. }
            | QuantumOp::MResetZ { qubit, .. } => vec![qubit],
            QuantumOp::Rxx { qubit1, qubit2, .. }
            | QuantumOp::Ryy { qubit1, qubit2, .. }
            | QuantumOp::Rzz { qubit1, qubit2, .. }
            | QuantumOp::Swap { qubit1, qubit2 } => vec![qubit1, qubit2],
        }
    }

    /// Check if this operation measures a qubit.
    pub fn is_measurement(&self) -> bool {
        matches!(
            self,
            QuantumOp::M { .. } | QuantumOp::Mz { .. } | QuantumOp::MResetZ { .. }
        )
    }
}

/// Receives every quantum operation an evaluation dispatches.
///
/// Handlers are called synchronously and in program order. A handler only
/// observes the program; measurement outcomes come from the result stream.
pub trait GateSet {
    /// Handle one operation.
    fn apply(&mut self, op: &QuantumOp);

    /// Called once after the entry point returns.
    fn finish(&mut self, metadata: &RunMetadata) {
        let _ = metadata;
    }
}

/// Collects the raw operation trace.
impl GateSet for Vec<QuantumOp> {
    fn apply(&mut self, op: &QuantumOp) {
        self.push(op.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_qubits() {
        let op = QuantumOp::Ccx {
            control1: 0,
            control2: 1,
            target: 2,
        };
        assert_eq!(op.name(), "ccx");
        assert_eq!(op.qubits(), vec![0, 1, 2]);
        assert!(QuantumOp::Mz { qubit: 0, result: 1 }.is_measurement());
        assert!(QuantumOp::Barrier.qubits().is_empty());
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_string(&QuantumOp::SAdj { qubit: 3 }).unwrap();
        assert_eq!(json, r#"{"op":"s_adj","qubit":3}"#);
    }

    #[test]
    fn test_vec_records_trace() {
        let mut trace: Vec<QuantumOp> = Vec::new();
        trace.apply(&QuantumOp::H { qubit: 0 });
        trace.finish(&RunMetadata::default());
        assert_eq!(trace, vec![QuantumOp::H { qubit: 0 }]);
    }
}
