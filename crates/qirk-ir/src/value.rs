//! Instruction operands.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::module::format_name;
use crate::qubit::{QubitId, ResultId};
use crate::types::Type;

/// A value as it appears in an instruction operand position.
///
/// Values carry no type; the surrounding instruction or [`Operand`] does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A local SSA value `%name`.
    Local(String),
    /// An integer constant. `i1` constants print as `true`/`false`.
    Int(i64),
    /// A floating-point constant.
    Double(f64),
    /// `null`
    Null,
    /// `inttoptr (i64 N to T)`
    IntToPtr(i64),
    /// A global reference `@name`.
    Global(String),
    /// First character of a global string:
    /// `getelementptr inbounds ([N x i8], [N x i8]* @name, i64 0, i64 0)`.
    StringElement {
        /// Name of the global.
        global: String,
        /// Length of the global byte array.
        len: u64,
    },
}

impl Value {
    /// Local value reference.
    pub fn local(name: impl Into<String>) -> Self {
        Value::Local(name.into())
    }

    /// Pointer constant encoding a static index.
    pub fn pointer_index(index: u64) -> Self {
        if index == 0 {
            Value::Null
        } else {
            Value::IntToPtr(i64::try_from(index).unwrap_or(i64::MAX))
        }
    }

    /// Static index encoded by a pointer constant.
    pub fn as_pointer_index(&self) -> Option<u64> {
        match self {
            Value::Null => Some(0),
            Value::IntToPtr(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Name of the local this value refers to.
    pub fn as_local(&self) -> Option<&str> {
        match self {
            Value::Local(name) => Some(name),
            _ => None,
        }
    }

    /// Render the value in the context of its type.
    pub fn display<'a>(&'a self, ty: &'a Type) -> ValueDisplay<'a> {
        ValueDisplay { value: self, ty }
    }
}

/// Formats a [`Value`] together with its type.
pub struct ValueDisplay<'a> {
    value: &'a Value,
    ty: &'a Type,
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Local(name) => write!(f, "%{}", format_name(name)),
            Value::Int(v) if *self.ty == Type::Int(1) => {
                write!(f, "{}", if *v != 0 { "true" } else { "false" })
            }
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{}", format_double(*v)),
            Value::Null => write!(f, "null"),
            Value::IntToPtr(n) => write!(f, "inttoptr (i64 {n} to {})", self.ty),
            Value::Global(name) => write!(f, "@{}", format_name(name)),
            Value::StringElement { global, len } => write!(
                f,
                "getelementptr inbounds ([{len} x i8], [{len} x i8]* @{}, i64 0, i64 0)",
                format_name(global)
            ),
        }
    }
}

/// Format a double so that LLVM accepts it and parsing it back is exact.
///
/// Uses the shortest round-tripping scientific notation and makes sure the
/// mantissa always contains a decimal point (`1.0e0`, `2.5e-1`).
pub fn format_double(value: f64) -> String {
    if !value.is_finite() {
        return format!("0x{:016X}", value.to_bits());
    }
    let text = format!("{value:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0e{exponent}")
        }
        _ => text,
    }
}

/// A typed operand, as used in call argument lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operand {
    /// Operand type.
    pub ty: Type,
    /// Operand value.
    pub value: Value,
}

impl Operand {
    /// Create an operand.
    pub fn new(ty: Type, value: Value) -> Self {
        Self { ty, value }
    }

    /// `%Qubit*` operand for a static qubit.
    pub fn qubit(id: QubitId) -> Self {
        Self::new(Type::qubit(), Value::pointer_index(id.0))
    }

    /// `%Result*` operand for a static result.
    pub fn result(id: ResultId) -> Self {
        Self::new(Type::result(), Value::pointer_index(id.0))
    }

    /// `iN` integer constant.
    pub fn int(width: u32, value: i64) -> Self {
        Self::new(Type::Int(width), Value::Int(value))
    }

    /// `i1` constant.
    pub fn bool(value: bool) -> Self {
        Self::int(1, i64::from(value))
    }

    /// `double` constant.
    pub fn double(value: f64) -> Self {
        Self::new(Type::Double, Value::Double(value))
    }

    /// `i8* null`, the empty record-output label.
    pub fn null_label() -> Self {
        Self::new(Type::i8_ptr(), Value::Null)
    }
}

impl From<QubitId> for Operand {
    fn from(id: QubitId) -> Self {
        Operand::qubit(id)
    }
}

impl From<ResultId> for Operand {
    fn from(id: ResultId) -> Self {
        Operand::result(id)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.value.display(&self.ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_encoding() {
        assert_eq!(Operand::qubit(QubitId(0)).to_string(), "%Qubit* null");
        assert_eq!(
            Operand::qubit(QubitId(2)).to_string(),
            "%Qubit* inttoptr (i64 2 to %Qubit*)"
        );
        assert_eq!(Value::pointer_index(5).as_pointer_index(), Some(5));
        assert_eq!(Value::Null.as_pointer_index(), Some(0));
    }

    #[test]
    fn test_bool_and_int_display() {
        assert_eq!(Operand::bool(true).to_string(), "i1 true");
        assert_eq!(Operand::int(64, -3).to_string(), "i64 -3");
    }

    #[test]
    fn test_double_format() {
        assert_eq!(format_double(1.0), "1.0e0");
        assert_eq!(format_double(0.25), "2.5e-1");
        assert_eq!(format_double(-3.5), "-3.5e0");
        let pi = std::f64::consts::PI;
        assert_eq!(format_double(pi).parse::<f64>().unwrap(), pi);
    }

    #[test]
    fn test_string_element_display() {
        let label = Operand::new(
            Type::i8_ptr(),
            Value::StringElement {
                global: "0".into(),
                len: 3,
            },
        );
        assert_eq!(
            label.to_string(),
            "i8* getelementptr inbounds ([3 x i8], [3 x i8]* @0, i64 0, i64 0)"
        );
    }
}
