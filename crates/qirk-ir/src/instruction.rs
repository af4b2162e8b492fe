//! Instructions inside a basic block.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::module::format_name;
use crate::types::Type;
use crate::value::{Operand, Value};

/// Integer binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,
    UDiv,
    SDiv,
    URem,
    SRem,
}

impl BinaryOp {
    /// All operators, in opcode order.
    pub const ALL: [BinaryOp; 13] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Shl,
        BinaryOp::LShr,
        BinaryOp::AShr,
        BinaryOp::UDiv,
        BinaryOp::SDiv,
        BinaryOp::URem,
        BinaryOp::SRem,
    ];

    /// LLVM opcode mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::LShr => "lshr",
            BinaryOp::AShr => "ashr",
            BinaryOp::UDiv => "udiv",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::URem => "urem",
            BinaryOp::SRem => "srem",
        }
    }

    /// Look up an operator by mnemonic.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == s)
    }
}

/// Integer comparison predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntPredicate {
    Eq,
    Ne,
    Ugt,
    Uge,
    Ult,
    Ule,
    Sgt,
    Sge,
    Slt,
    Sle,
}

impl IntPredicate {
    /// All predicates.
    pub const ALL: [IntPredicate; 10] = [
        IntPredicate::Eq,
        IntPredicate::Ne,
        IntPredicate::Ugt,
        IntPredicate::Uge,
        IntPredicate::Ult,
        IntPredicate::Ule,
        IntPredicate::Sgt,
        IntPredicate::Sge,
        IntPredicate::Slt,
        IntPredicate::Sle,
    ];

    /// LLVM predicate keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Ugt => "ugt",
            IntPredicate::Uge => "uge",
            IntPredicate::Ult => "ult",
            IntPredicate::Ule => "ule",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sge => "sge",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
        }
    }

    /// Look up a predicate by keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == s)
    }
}

/// Integer conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastOp {
    ZExt,
    SExt,
    Trunc,
}

impl CastOp {
    /// LLVM opcode mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            CastOp::ZExt => "zext",
            CastOp::SExt => "sext",
            CastOp::Trunc => "trunc",
        }
    }

    /// Look up a cast by mnemonic.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        match s {
            "zext" => Some(CastOp::ZExt),
            "sext" => Some(CastOp::SExt),
            "trunc" => Some(CastOp::Trunc),
            _ => None,
        }
    }
}

/// A single instruction.
///
/// Terminators (`br`, conditional `br`, `ret`) are instructions too; a
/// well-formed block ends with exactly one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// `[%result =] call <ret> @callee(<args>)`
    Call {
        /// Bound name, for non-void calls.
        result: Option<String>,
        /// Return type.
        ret: Type,
        /// Callee function name.
        callee: String,
        /// Arguments.
        args: Vec<Operand>,
    },
    /// `%result = <op> iN lhs, rhs`
    Binary {
        result: String,
        op: BinaryOp,
        width: u32,
        lhs: Value,
        rhs: Value,
    },
    /// `%result = icmp <pred> iN lhs, rhs`
    ICmp {
        result: String,
        predicate: IntPredicate,
        width: u32,
        lhs: Value,
        rhs: Value,
    },
    /// `%result = <cast> iN value to iM`
    Cast {
        result: String,
        op: CastOp,
        from: u32,
        value: Value,
        to: u32,
    },
    /// `%result = select i1 cond, T a, T b`
    Select {
        result: String,
        condition: Value,
        ty: Type,
        then_value: Value,
        else_value: Value,
    },
    /// `br label %target`
    Br { target: String },
    /// `br i1 cond, label %then, label %else`
    CondBr {
        condition: Value,
        then_target: String,
        else_target: String,
    },
    /// `ret void` or `ret T v`
    Ret { value: Option<Operand> },
}

impl Instruction {
    /// Check if this instruction ends a block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Br { .. } | Instruction::CondBr { .. } | Instruction::Ret { .. }
        )
    }

    /// Name bound by this instruction, if any.
    pub fn result(&self) -> Option<&str> {
        match self {
            Instruction::Call { result, .. } => result.as_deref(),
            Instruction::Binary { result, .. }
            | Instruction::ICmp { result, .. }
            | Instruction::Cast { result, .. }
            | Instruction::Select { result, .. } => Some(result),
            Instruction::Br { .. } | Instruction::CondBr { .. } | Instruction::Ret { .. } => None,
        }
    }

    /// Mutable access to the bound name.
    pub fn result_mut(&mut self) -> Option<&mut String> {
        match self {
            Instruction::Call { result, .. } => result.as_mut(),
            Instruction::Binary { result, .. }
            | Instruction::ICmp { result, .. }
            | Instruction::Cast { result, .. }
            | Instruction::Select { result, .. } => Some(result),
            Instruction::Br { .. } | Instruction::CondBr { .. } | Instruction::Ret { .. } => None,
        }
    }

    /// Mutable access to every value read by this instruction.
    pub fn operands_mut(&mut self) -> Vec<&mut Value> {
        match self {
            Instruction::Call { args, .. } => args.iter_mut().map(|a| &mut a.value).collect(),
            Instruction::Binary { lhs, rhs, .. } | Instruction::ICmp { lhs, rhs, .. } => {
                vec![lhs, rhs]
            }
            Instruction::Cast { value, .. } => vec![value],
            Instruction::Select {
                condition,
                then_value,
                else_value,
                ..
            } => vec![condition, then_value, else_value],
            Instruction::CondBr { condition, .. } => vec![condition],
            Instruction::Ret { value } => value.iter_mut().map(|v| &mut v.value).collect(),
            Instruction::Br { .. } => vec![],
        }
    }

    /// Branch targets of a terminator.
    pub fn successors(&self) -> Vec<&str> {
        match self {
            Instruction::Br { target } => vec![target],
            Instruction::CondBr {
                then_target,
                else_target,
                ..
            } => vec![then_target, else_target],
            _ => vec![],
        }
    }

    /// Callee name, for calls.
    pub fn callee(&self) -> Option<&str> {
        match self {
            Instruction::Call { callee, .. } => Some(callee),
            _ => None,
        }
    }

    /// Every value read by this instruction, with its type where known.
    pub fn operands(&self) -> Vec<(Option<&Type>, &Value)> {
        match self {
            Instruction::Call { args, .. } => {
                args.iter().map(|a| (Some(&a.ty), &a.value)).collect()
            }
            Instruction::Binary { lhs, rhs, .. } | Instruction::ICmp { lhs, rhs, .. } => {
                vec![(None, lhs), (None, rhs)]
            }
            Instruction::Cast { value, .. } => vec![(None, value)],
            Instruction::Select {
                condition,
                ty,
                then_value,
                else_value,
                ..
            } => vec![(None, condition), (Some(ty), then_value), (Some(ty), else_value)],
            Instruction::CondBr { condition, .. } => vec![(None, condition)],
            Instruction::Ret { value } => value.iter().map(|v| (Some(&v.ty), &v.value)).collect(),
            Instruction::Br { .. } => vec![],
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Call {
                result,
                ret,
                callee,
                args,
            } => {
                if let Some(name) = result {
                    write!(f, "%{} = ", format_name(name))?;
                }
                let args = args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "call {ret} @{}({args})", format_name(callee))
            }
            Instruction::Binary {
                result,
                op,
                width,
                lhs,
                rhs,
            } => {
                let ty = Type::Int(*width);
                write!(
                    f,
                    "%{} = {} {ty} {}, {}",
                    format_name(result),
                    op.mnemonic(),
                    lhs.display(&ty),
                    rhs.display(&ty)
                )
            }
            Instruction::ICmp {
                result,
                predicate,
                width,
                lhs,
                rhs,
            } => {
                let ty = Type::Int(*width);
                write!(
                    f,
                    "%{} = icmp {} {ty} {}, {}",
                    format_name(result),
                    predicate.keyword(),
                    lhs.display(&ty),
                    rhs.display(&ty)
                )
            }
            Instruction::Cast {
                result,
                op,
                from,
                value,
                to,
            } => {
                let from_ty = Type::Int(*from);
                write!(
                    f,
                    "%{} = {} {from_ty} {} to i{to}",
                    format_name(result),
                    op.mnemonic(),
                    value.display(&from_ty)
                )
            }
            Instruction::Select {
                result,
                condition,
                ty,
                then_value,
                else_value,
            } => write!(
                f,
                "%{} = select i1 {}, {ty} {}, {ty} {}",
                format_name(result),
                condition.display(&Type::bool()),
                then_value.display(ty),
                else_value.display(ty)
            ),
            Instruction::Br { target } => write!(f, "br label %{}", format_name(target)),
            Instruction::CondBr {
                condition,
                then_target,
                else_target,
            } => write!(
                f,
                "br i1 {}, label %{}, label %{}",
                condition.display(&Type::bool()),
                format_name(then_target),
                format_name(else_target)
            ),
            Instruction::Ret { value: None } => write!(f, "ret void"),
            Instruction::Ret { value: Some(v) } => write!(f, "ret {v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubit::QubitId;

    #[test]
    fn test_call_display() {
        let inst = Instruction::Call {
            result: None,
            ret: Type::Void,
            callee: "__quantum__qis__h__body".into(),
            args: vec![Operand::qubit(QubitId(1))],
        };
        assert_eq!(
            inst.to_string(),
            "call void @__quantum__qis__h__body(%Qubit* inttoptr (i64 1 to %Qubit*))"
        );
        assert!(!inst.is_terminator());
    }

    #[test]
    fn test_branch_display() {
        let inst = Instruction::CondBr {
            condition: Value::local("0"),
            then_target: "then".into(),
            else_target: "else".into(),
        };
        assert_eq!(inst.to_string(), "br i1 %0, label %then, label %else");
        assert!(inst.is_terminator());
        assert_eq!(inst.successors(), vec!["then", "else"]);
    }

    #[test]
    fn test_arith_display() {
        let inst = Instruction::Binary {
            result: "x".into(),
            op: BinaryOp::LShr,
            width: 32,
            lhs: Value::local("a"),
            rhs: Value::Int(3),
        };
        assert_eq!(inst.to_string(), "%x = lshr i32 %a, 3");

        let cmp = Instruction::ICmp {
            result: "c".into(),
            predicate: IntPredicate::Sle,
            width: 1,
            lhs: Value::Int(1),
            rhs: Value::local("b"),
        };
        assert_eq!(cmp.to_string(), "%c = icmp sle i1 true, %b");
    }

    #[test]
    fn test_mnemonic_lookup() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_mnemonic(op.mnemonic()), Some(op));
        }
        for p in IntPredicate::ALL {
            assert_eq!(IntPredicate::from_keyword(p.keyword()), Some(p));
        }
        assert_eq!(CastOp::from_mnemonic("zext"), Some(CastOp::ZExt));
        assert_eq!(BinaryOp::from_mnemonic("fadd"), None);
    }
}
