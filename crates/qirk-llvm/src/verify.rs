//! Structural verification of parsed modules.

use qirk_ir::{Function, Instruction, Intrinsic, Module, Type};
use rustc_hash::FxHashSet;
use tracing::warn;

use crate::error::{VerificationError, VerifyResult};

const QUBITS_ATTR: &str = "num_required_qubits";
const RESULTS_ATTR: &str = "num_required_results";

/// Widest integer the evaluator can execute.
pub const MAX_INTEGER_WIDTH: u32 = 64;

/// Check a module against the structural rules evaluation relies on.
///
/// Returns the first violation found, walking functions in module order.
/// Unreachable blocks are not an error; they are reported through
/// `tracing` at warn level.
pub fn verify(module: &Module) -> VerifyResult<()> {
    check_unique_functions(module)?;
    let entry = check_entry_point(module)?;
    let (num_qubits, num_results) = check_required_counts(entry)?;

    for function in &module.functions {
        check_widths(function)?;
        if function.is_declaration() {
            continue;
        }
        check_blocks(function)?;
        check_assignments(function)?;
        check_calls(module, function)?;

        for label in function.control_flow_graph().unreachable() {
            warn!(function = %function.name, block = label, "unreachable block");
        }
    }

    check_operand_ranges(entry, num_qubits, num_results)
}

fn check_unique_functions(module: &Module) -> VerifyResult<()> {
    let mut seen = FxHashSet::default();
    for function in &module.functions {
        if !seen.insert(function.name.as_str()) {
            return Err(VerificationError::DuplicateFunction(function.name.clone()));
        }
    }
    Ok(())
}

fn check_entry_point(module: &Module) -> VerifyResult<&Function> {
    match module.entry_points().as_slice() {
        [] => Err(VerificationError::NoEntryPoint),
        [entry] if entry.is_declaration() => Err(VerificationError::EntryPointWithoutBody {
            function: entry.name.clone(),
        }),
        [entry] => Ok(entry),
        many => Err(VerificationError::MultipleEntryPoints(
            many.iter().map(|f| f.name.clone()).collect(),
        )),
    }
}

fn check_required_counts(entry: &Function) -> VerifyResult<(u64, u64)> {
    let qubits = required_count(entry, &qirk_ir::module::REQUIRED_QUBITS_ATTRS, QUBITS_ATTR)?;
    let results = required_count(entry, &qirk_ir::module::REQUIRED_RESULTS_ATTRS, RESULTS_ATTR)?;
    Ok((qubits, results))
}

fn required_count(entry: &Function, keys: &[&str], canonical: &str) -> VerifyResult<u64> {
    let Some(attr) = keys.iter().find_map(|k| entry.attribute(k)) else {
        return Err(VerificationError::MissingRequiredAttribute {
            function: entry.name.clone(),
            attribute: canonical.to_string(),
        });
    };
    let value = attr.value().unwrap_or_default();
    value
        .parse::<u64>()
        .map_err(|_| VerificationError::InvalidRequiredAttribute {
            function: entry.name.clone(),
            attribute: attr.key().to_string(),
            value: value.to_string(),
        })
}

fn check_widths(function: &Function) -> VerifyResult<()> {
    let unsupported = |width: u32| VerificationError::UnsupportedIntegerWidth {
        function: function.name.clone(),
        width,
    };
    let check_type = |ty: &Type| match ty.int_width() {
        Some(w) if w == 0 || w > MAX_INTEGER_WIDTH => Err(unsupported(w)),
        _ => Ok(()),
    };

    check_type(&function.ret)?;
    for param in &function.params {
        check_type(&param.ty)?;
    }
    for inst in function.instructions() {
        match inst {
            Instruction::Binary { width, .. } | Instruction::ICmp { width, .. } => {
                check_type(&Type::Int(*width))?;
            }
            Instruction::Cast { from, to, .. } => {
                check_type(&Type::Int(*from))?;
                check_type(&Type::Int(*to))?;
            }
            Instruction::Call { ret, .. } => check_type(ret)?,
            Instruction::Select { ty, .. } => check_type(ty)?,
            _ => {}
        }
        for (ty, _) in inst.operands() {
            if let Some(ty) = ty {
                check_type(ty)?;
            }
        }
    }
    Ok(())
}

fn check_blocks(function: &Function) -> VerifyResult<()> {
    let mut labels = FxHashSet::default();
    for block in &function.blocks {
        if !labels.insert(block.label.as_str()) {
            return Err(VerificationError::DuplicateLabel {
                function: function.name.clone(),
                label: block.label.clone(),
            });
        }
    }

    for block in &function.blocks {
        let Some((last, body)) = block.instructions.split_last() else {
            return Err(VerificationError::MissingTerminator {
                function: function.name.clone(),
                block: block.label.clone(),
            });
        };
        if !last.is_terminator() {
            return Err(VerificationError::MissingTerminator {
                function: function.name.clone(),
                block: block.label.clone(),
            });
        }
        if body.iter().any(Instruction::is_terminator) {
            return Err(VerificationError::MisplacedTerminator {
                function: function.name.clone(),
                block: block.label.clone(),
            });
        }
        for target in last.successors() {
            if !labels.contains(target) {
                return Err(VerificationError::UnknownBranchTarget {
                    function: function.name.clone(),
                    block: block.label.clone(),
                    target: target.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_assignments(function: &Function) -> VerifyResult<()> {
    let mut names = FxHashSet::default();
    let params = function.params.iter().filter_map(|p| p.name.as_deref());
    let results = function.instructions().filter_map(Instruction::result);
    for name in params.chain(results) {
        if !names.insert(name) {
            return Err(VerificationError::DuplicateAssignment {
                function: function.name.clone(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn check_calls(module: &Module, function: &Function) -> VerifyResult<()> {
    for inst in function.instructions() {
        let Instruction::Call { callee, args, .. } = inst else {
            continue;
        };
        let Some(target) = module.function(callee) else {
            return Err(VerificationError::UnknownCallee {
                function: function.name.clone(),
                callee: callee.clone(),
            });
        };
        if target.params.len() != args.len() {
            return Err(VerificationError::ArgumentCountMismatch {
                function: function.name.clone(),
                callee: callee.clone(),
                expected: target.params.len(),
                found: args.len(),
            });
        }
    }
    Ok(())
}

/// Constant qubit and result operands of the entry point must be below the
/// declared counts. Operands of known intrinsics are classified by the
/// catalog signature so that opaque-pointer modules are covered too.
fn check_operand_ranges(entry: &Function, num_qubits: u64, num_results: u64) -> VerifyResult<()> {
    for inst in entry.instructions() {
        let Instruction::Call { callee, args, .. } = inst else {
            continue;
        };
        let catalog = Intrinsic::from_name(callee).map(|i| i.signature().params);
        for (i, arg) in args.iter().enumerate() {
            let ty = catalog.as_ref().and_then(|p| p.get(i)).unwrap_or(&arg.ty);
            let Some(index) = arg.value.as_pointer_index() else {
                continue;
            };
            let (kind, limit) = if ty.is_qubit() {
                ("qubit", num_qubits)
            } else if ty.is_result() {
                ("result", num_results)
            } else {
                continue;
            };
            if index >= limit {
                return Err(VerificationError::OperandOutOfRange {
                    function: entry.name.clone(),
                    kind,
                    index,
                    limit,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn module(body: &str, attrs: &str) -> Module {
        let source = format!(
            "%Qubit = type opaque\n%Result = type opaque\n\
             define void @main() #0 {{\n{body}\n}}\n\
             declare void @__quantum__qis__h__body(%Qubit*)\n\
             declare void @__quantum__qis__mz__body(%Qubit*, %Result*)\n\
             attributes #0 = {{ {attrs} }}\n"
        );
        parse(&source).unwrap()
    }

    const COUNTS: &str = r#""entry_point" "num_required_qubits"="2" "num_required_results"="1""#;

    #[test]
    fn test_valid_module() {
        let m = module(
            "entry:\n  call void @__quantum__qis__h__body(%Qubit* inttoptr (i64 1 to %Qubit*))\n  ret void",
            COUNTS,
        );
        assert_eq!(verify(&m), Ok(()));
    }

    #[test]
    fn test_no_entry_point() {
        let m = module("entry:\n  ret void", r#""num_required_qubits"="2""#);
        assert_eq!(verify(&m), Err(VerificationError::NoEntryPoint));
    }

    #[test]
    fn test_missing_required_results() {
        let m = module("entry:\n  ret void", r#""entry_point" "num_required_qubits"="2""#);
        let err = verify(&m).unwrap_err();
        assert_eq!(err.rule(), "required-attributes");
    }

    #[test]
    fn test_negative_required_count() {
        let m = module(
            "entry:\n  ret void",
            r#""EntryPoint" "requiredQubits"="-1" "requiredResults"="0""#,
        );
        assert!(matches!(
            verify(&m),
            Err(VerificationError::InvalidRequiredAttribute { .. })
        ));
    }

    #[test]
    fn test_missing_terminator() {
        let m = module(
            "entry:\n  call void @__quantum__qis__h__body(%Qubit* null)",
            COUNTS,
        );
        assert!(matches!(
            verify(&m),
            Err(VerificationError::MissingTerminator { .. })
        ));
    }

    #[test]
    fn test_unknown_branch_target() {
        let m = module("entry:\n  br label %nowhere", COUNTS);
        assert_eq!(verify(&m).unwrap_err().rule(), "branch-target");
    }

    #[test]
    fn test_unknown_callee() {
        let m = module("entry:\n  call void @missing()\n  ret void", COUNTS);
        assert!(matches!(
            verify(&m),
            Err(VerificationError::UnknownCallee { .. })
        ));
    }

    #[test]
    fn test_argument_count() {
        let m = module(
            "entry:\n  call void @__quantum__qis__h__body()\n  ret void",
            COUNTS,
        );
        assert!(matches!(
            verify(&m),
            Err(VerificationError::ArgumentCountMismatch {
                expected: 1,
                found: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_assignment() {
        let m = module(
            "entry:\n  %a = add i64 1, 2\n  %a = add i64 3, 4\n  ret void",
            COUNTS,
        );
        assert_eq!(verify(&m).unwrap_err().rule(), "single-assignment");
    }

    #[test]
    fn test_duplicate_label() {
        let m = module("a:\n  br label %a\na:\n  ret void", COUNTS);
        assert!(matches!(
            verify(&m),
            Err(VerificationError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_integer_width() {
        let m = module("entry:\n  %a = add i128 1, 2\n  ret void", COUNTS);
        assert!(matches!(
            verify(&m),
            Err(VerificationError::UnsupportedIntegerWidth { width: 128, .. })
        ));
    }

    #[test]
    fn test_qubit_out_of_range() {
        let m = module(
            "entry:\n  call void @__quantum__qis__mz__body(%Qubit* inttoptr (i64 2 to %Qubit*), %Result* null)\n  ret void",
            COUNTS,
        );
        assert_eq!(
            verify(&m),
            Err(VerificationError::OperandOutOfRange {
                function: "main".into(),
                kind: "qubit",
                index: 2,
                limit: 2,
            })
        );
    }

    #[test]
    fn test_unreachable_block_is_not_an_error() {
        let m = module("entry:\n  ret void\ndead:\n  ret void", COUNTS);
        assert_eq!(verify(&m), Ok(()));
    }
}
