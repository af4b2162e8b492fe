//! Qubit and result identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Static qubit identifier.
///
/// In QIR a qubit is an opaque pointer; index 0 is encoded as `null` and
/// index N as `inttoptr (i64 N to %Qubit*)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u64);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u64> for QubitId {
    fn from(id: u64) -> Self {
        QubitId(id)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(u64::from(id))
    }
}

/// Static measurement result identifier, encoded the same way as [`QubitId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResultId(pub u64);

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl From<u64> for ResultId {
    fn from(id: u64) -> Self {
        ResultId(id)
    }
}

impl From<u32> for ResultId {
    fn from(id: u32) -> Self {
        ResultId(u64::from(id))
    }
}
