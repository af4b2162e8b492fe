//! LLVM types used by QIR programs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::module::format_name;

/// Name of the opaque qubit type.
pub const QUBIT_TYPE: &str = "Qubit";
/// Name of the opaque result type.
pub const RESULT_TYPE: &str = "Result";

/// The subset of LLVM types qirk understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// `void`
    Void,
    /// `iN`
    Int(u32),
    /// `double`
    Double,
    /// A named struct type such as `%Qubit`.
    Named(String),
    /// A typed pointer `T*`.
    Pointer(Box<Type>),
    /// An opaque pointer `ptr`.
    OpaquePointer,
    /// `[N x T]`
    Array(u64, Box<Type>),
}

impl Type {
    /// `i1`
    pub fn bool() -> Self {
        Type::Int(1)
    }

    /// `i64`
    pub fn i64() -> Self {
        Type::Int(64)
    }

    /// `%Qubit*`
    pub fn qubit() -> Self {
        Type::Pointer(Box::new(Type::Named(QUBIT_TYPE.into())))
    }

    /// `%Result*`
    pub fn result() -> Self {
        Type::Pointer(Box::new(Type::Named(RESULT_TYPE.into())))
    }

    /// `i8*`
    pub fn i8_ptr() -> Self {
        Type::Pointer(Box::new(Type::Int(8)))
    }

    /// Pointer to this type.
    pub fn ptr_to(self) -> Self {
        Type::Pointer(Box::new(self))
    }

    /// Integer width, if this is an integer type.
    pub fn int_width(&self) -> Option<u32> {
        match self {
            Type::Int(w) => Some(*w),
            _ => None,
        }
    }

    /// Check if this is a pointer (typed or opaque).
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_) | Type::OpaquePointer)
    }

    /// Check if this is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Check if this is `%Qubit*`.
    pub fn is_qubit(&self) -> bool {
        self.points_to_named(QUBIT_TYPE)
    }

    /// Check if this is `%Result*`.
    pub fn is_result(&self) -> bool {
        self.points_to_named(RESULT_TYPE)
    }

    fn points_to_named(&self, name: &str) -> bool {
        matches!(
            self,
            Type::Pointer(inner) if matches!(inner.as_ref(), Type::Named(n) if n == name)
        )
    }

    /// Named types this type refers to, innermost first.
    pub fn named_types(&self) -> Vec<&str> {
        match self {
            Type::Named(n) => vec![n.as_str()],
            Type::Pointer(inner) | Type::Array(_, inner) => inner.named_types(),
            _ => vec![],
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int(w) => write!(f, "i{w}"),
            Type::Double => write!(f, "double"),
            Type::Named(n) => write!(f, "%{}", format_name(n)),
            Type::Pointer(inner) => write!(f, "{inner}*"),
            Type::OpaquePointer => write!(f, "ptr"),
            Type::Array(n, inner) => write!(f, "[{n} x {inner}]"),
        }
    }
}
