//! The catalog of recognized QIR intrinsics.
//!
//! Quantum instructions are named `__quantum__qis__<gate>__body` (or
//! `__adj` for adjoints); runtime functions are named `__quantum__rt__<op>`.
//! The catalog gives every recognized function its canonical signature, used
//! by the builder to auto-declare callees and by the evaluator to dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Type;

/// Prefix of quantum instruction set functions.
pub const QIS_PREFIX: &str = "__quantum__qis__";
/// Prefix of runtime functions.
pub const RT_PREFIX: &str = "__quantum__rt__";

/// A recognized intrinsic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intrinsic {
    // Quantum gates
    Barrier,
    Ccx,
    Cx,
    Cz,
    H,
    S,
    SAdj,
    T,
    TAdj,
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
    Rxx,
    Ryy,
    Rzz,
    Swap,
    Reset,
    // Measurement
    M,
    Mz,
    MResetZ,
    ReadResult,
    // Runtime
    Initialize,
    ResultRecordOutput,
    ArrayRecordOutput,
    TupleRecordOutput,
    BoolRecordOutput,
    IntRecordOutput,
    DoubleRecordOutput,
    ResultGetOne,
    ResultGetZero,
    ResultEqual,
    QubitAllocate,
    QubitRelease,
}

/// Return and parameter types of a function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub ret: Type,
    pub params: Vec<Type>,
}

impl Signature {
    pub fn new(ret: Type, params: Vec<Type>) -> Self {
        Self { ret, params }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} ({params})", self.ret)
    }
}

impl Intrinsic {
    /// Every intrinsic in the catalog.
    pub const ALL: [Intrinsic; 36] = [
        Intrinsic::Barrier,
        Intrinsic::Ccx,
        Intrinsic::Cx,
        Intrinsic::Cz,
        Intrinsic::H,
        Intrinsic::S,
        Intrinsic::SAdj,
        Intrinsic::T,
        Intrinsic::TAdj,
        Intrinsic::X,
        Intrinsic::Y,
        Intrinsic::Z,
        Intrinsic::Rx,
        Intrinsic::Ry,
        Intrinsic::Rz,
        Intrinsic::Rxx,
        Intrinsic::Ryy,
        Intrinsic::Rzz,
        Intrinsic::Swap,
        Intrinsic::Reset,
        Intrinsic::M,
        Intrinsic::Mz,
        Intrinsic::MResetZ,
        Intrinsic::ReadResult,
        Intrinsic::Initialize,
        Intrinsic::ResultRecordOutput,
        Intrinsic::ArrayRecordOutput,
        Intrinsic::TupleRecordOutput,
        Intrinsic::BoolRecordOutput,
        Intrinsic::IntRecordOutput,
        Intrinsic::DoubleRecordOutput,
        Intrinsic::ResultGetOne,
        Intrinsic::ResultGetZero,
        Intrinsic::ResultEqual,
        Intrinsic::QubitAllocate,
        Intrinsic::QubitRelease,
    ];

    /// Canonical function name.
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Barrier => "__quantum__qis__barrier__body",
            Intrinsic::Ccx => "__quantum__qis__ccx__body",
            Intrinsic::Cx => "__quantum__qis__cnot__body",
            Intrinsic::Cz => "__quantum__qis__cz__body",
            Intrinsic::H => "__quantum__qis__h__body",
            Intrinsic::S => "__quantum__qis__s__body",
            Intrinsic::SAdj => "__quantum__qis__s__adj",
            Intrinsic::T => "__quantum__qis__t__body",
            Intrinsic::TAdj => "__quantum__qis__t__adj",
            Intrinsic::X => "__quantum__qis__x__body",
            Intrinsic::Y => "__quantum__qis__y__body",
            Intrinsic::Z => "__quantum__qis__z__body",
            Intrinsic::Rx => "__quantum__qis__rx__body",
            Intrinsic::Ry => "__quantum__qis__ry__body",
            Intrinsic::Rz => "__quantum__qis__rz__body",
            Intrinsic::Rxx => "__quantum__qis__rxx__body",
            Intrinsic::Ryy => "__quantum__qis__ryy__body",
            Intrinsic::Rzz => "__quantum__qis__rzz__body",
            Intrinsic::Swap => "__quantum__qis__swap__body",
            Intrinsic::Reset => "__quantum__qis__reset__body",
            Intrinsic::M => "__quantum__qis__m__body",
            Intrinsic::Mz => "__quantum__qis__mz__body",
            Intrinsic::MResetZ => "__quantum__qis__mresetz__body",
            Intrinsic::ReadResult => "__quantum__qis__read_result__body",
            Intrinsic::Initialize => "__quantum__rt__initialize",
            Intrinsic::ResultRecordOutput => "__quantum__rt__result_record_output",
            Intrinsic::ArrayRecordOutput => "__quantum__rt__array_record_output",
            Intrinsic::TupleRecordOutput => "__quantum__rt__tuple_record_output",
            Intrinsic::BoolRecordOutput => "__quantum__rt__bool_record_output",
            Intrinsic::IntRecordOutput => "__quantum__rt__int_record_output",
            Intrinsic::DoubleRecordOutput => "__quantum__rt__double_record_output",
            Intrinsic::ResultGetOne => "__quantum__rt__result_get_one",
            Intrinsic::ResultGetZero => "__quantum__rt__result_get_zero",
            Intrinsic::ResultEqual => "__quantum__rt__result_equal",
            Intrinsic::QubitAllocate => "__quantum__rt__qubit_allocate",
            Intrinsic::QubitRelease => "__quantum__rt__qubit_release",
        }
    }

    /// Look up an intrinsic by function name.
    ///
    /// Accepts every canonical name plus `__quantum__qis__cx__body` as an
    /// alias of `cnot`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "__quantum__qis__cx__body" {
            return Some(Intrinsic::Cx);
        }
        Self::ALL.into_iter().find(|i| i.name() == name)
    }

    /// Canonical signature.
    pub fn signature(self) -> Signature {
        let q = Type::qubit;
        let r = Type::result;
        let label = Type::i8_ptr;
        let (ret, params) = match self {
            Intrinsic::Barrier => (Type::Void, vec![]),
            Intrinsic::ResultGetOne | Intrinsic::ResultGetZero => (r(), vec![]),
            Intrinsic::Ccx => (Type::Void, vec![q(), q(), q()]),
            Intrinsic::Cx | Intrinsic::Cz | Intrinsic::Swap => (Type::Void, vec![q(), q()]),
            Intrinsic::H
            | Intrinsic::S
            | Intrinsic::SAdj
            | Intrinsic::T
            | Intrinsic::TAdj
            | Intrinsic::X
            | Intrinsic::Y
            | Intrinsic::Z
            | Intrinsic::Reset
            | Intrinsic::QubitRelease => (Type::Void, vec![q()]),
            Intrinsic::Rx | Intrinsic::Ry | Intrinsic::Rz => {
                (Type::Void, vec![Type::Double, q()])
            }
            Intrinsic::Rxx | Intrinsic::Ryy | Intrinsic::Rzz => {
                (Type::Void, vec![Type::Double, q(), q()])
            }
            Intrinsic::M => (r(), vec![q()]),
            Intrinsic::Mz | Intrinsic::MResetZ => (Type::Void, vec![q(), r()]),
            Intrinsic::ReadResult => (Type::bool(), vec![r()]),
            Intrinsic::Initialize => (Type::Void, vec![label()]),
            Intrinsic::ResultRecordOutput => (Type::Void, vec![r(), label()]),
            Intrinsic::ArrayRecordOutput
            | Intrinsic::TupleRecordOutput
            | Intrinsic::IntRecordOutput => (Type::Void, vec![Type::i64(), label()]),
            Intrinsic::BoolRecordOutput => (Type::Void, vec![Type::bool(), label()]),
            Intrinsic::DoubleRecordOutput => (Type::Void, vec![Type::Double, label()]),
            Intrinsic::ResultEqual => (Type::bool(), vec![r(), r()]),
            Intrinsic::QubitAllocate => (q(), vec![]),
        };
        Signature::new(ret, params)
    }

    /// Check if this is a quantum instruction (`__quantum__qis__*`).
    pub fn is_quantum(self) -> bool {
        self.name().starts_with(QIS_PREFIX)
    }

    /// Check if this intrinsic produces a measurement outcome.
    pub fn is_measurement(self) -> bool {
        matches!(self, Intrinsic::M | Intrinsic::Mz | Intrinsic::MResetZ)
    }

    /// Check if this intrinsic is irreversible (measurement or reset).
    pub fn is_irreversible(self) -> bool {
        self.is_measurement() || self == Intrinsic::Reset
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
