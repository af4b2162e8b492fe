//! Modules, functions and basic blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::{CallGraph, ControlFlowGraph};
use crate::instruction::Instruction;
use crate::types::Type;

/// Attribute keys that mark a function as the entry point.
pub const ENTRY_POINT_ATTRS: [&str; 2] = ["entry_point", "EntryPoint"];
/// Accepted spellings of the required-qubit count attribute.
pub const REQUIRED_QUBITS_ATTRS: [&str; 3] =
    ["num_required_qubits", "required_num_qubits", "requiredQubits"];
/// Accepted spellings of the required-result count attribute.
pub const REQUIRED_RESULTS_ATTRS: [&str; 3] =
    ["num_required_results", "required_num_results", "requiredResults"];

/// A function attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// A quoted string attribute without a value, e.g. `"entry_point"`.
    Flag(String),
    /// A quoted key/value pair, e.g. `"num_required_qubits"="2"`.
    KeyValue(String, String),
    /// A bare LLVM keyword such as `nounwind`.
    Keyword(String),
}

impl Attribute {
    /// Attribute key.
    pub fn key(&self) -> &str {
        match self {
            Attribute::Flag(k) | Attribute::KeyValue(k, _) | Attribute::Keyword(k) => k,
        }
    }

    /// Attribute value, for key/value pairs.
    pub fn value(&self) -> Option<&str> {
        match self {
            Attribute::KeyValue(_, v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Flag(k) => write!(f, "\"{}\"", escape_string(k.as_bytes())),
            Attribute::KeyValue(k, v) => write!(
                f,
                "\"{}\"=\"{}\"",
                escape_string(k.as_bytes()),
                escape_string(v.as_bytes())
            ),
            Attribute::Keyword(k) => write!(f, "{k}"),
        }
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub ty: Type,
    pub name: Option<String>,
}

/// A labelled sequence of instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    /// Create an empty block.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: vec![],
        }
    }

    /// The block's terminator, if its last instruction is one.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.is_terminator())
    }
}

/// A function declaration (no blocks) or definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub ret: Type,
    pub params: Vec<Param>,
    pub blocks: Vec<BasicBlock>,
    pub attributes: Vec<Attribute>,
}

impl Function {
    /// Create an external declaration.
    pub fn declaration(name: impl Into<String>, ret: Type, params: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            ret,
            params: params
                .into_iter()
                .map(|ty| Param { ty, name: None })
                .collect(),
            blocks: vec![],
            attributes: vec![],
        }
    }

    /// Check if this function has no body.
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Parameter types, in order.
    pub fn param_types(&self) -> Vec<&Type> {
        self.params.iter().map(|p| &p.ty).collect()
    }

    /// Look up an attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.key() == key)
    }

    /// Check if this function carries an entry-point marker.
    pub fn is_entry_point(&self) -> bool {
        ENTRY_POINT_ATTRS.iter().any(|k| self.attribute(k).is_some())
    }

    /// Raw value of the first attribute found under any of `keys`.
    pub fn attribute_value(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.attribute(k))
            .and_then(Attribute::value)
    }

    /// Declared number of required qubits, if present and well-formed.
    pub fn required_num_qubits(&self) -> Option<u64> {
        self.attribute_value(&REQUIRED_QUBITS_ATTRS)?.parse().ok()
    }

    /// Declared number of required results, if present and well-formed.
    pub fn required_num_results(&self) -> Option<u64> {
        self.attribute_value(&REQUIRED_RESULTS_ATTRS)?.parse().ok()
    }

    /// Look up a block by label.
    pub fn block(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    /// Index of a block by label.
    pub fn block_index(&self, label: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.label == label)
    }

    /// Control-flow graph over this function's blocks.
    pub fn control_flow_graph(&self) -> ControlFlowGraph {
        ControlFlowGraph::build(self)
    }

    /// Iterate over every instruction in block order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }
}

/// A global byte-string constant, used for output labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalString {
    pub name: String,
    /// Bytes including the trailing NUL.
    pub bytes: Vec<u8>,
}

impl GlobalString {
    /// Length of the byte array.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Check if the array is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Text up to the first NUL, lossily decoded.
    pub fn text(&self) -> String {
        let end = self
            .bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.bytes.len());
        String::from_utf8_lossy(&self.bytes[..end]).into_owned()
    }
}

/// A QIR module.
///
/// Modules are produced by [`crate::ModuleBuilder`] or by the loader and are
/// treated as read-only afterwards; evaluators only ever borrow them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub source_filename: Option<String>,
    /// Opaque struct types, e.g. `Qubit`.
    pub opaque_types: Vec<String>,
    pub globals: Vec<GlobalString>,
    pub functions: Vec<Function>,
}

impl Module {
    /// Create an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_filename: None,
            opaque_types: vec![],
            globals: vec![],
            functions: vec![],
        }
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Look up a global string by name.
    pub fn global(&self, name: &str) -> Option<&GlobalString> {
        self.globals.iter().find(|g| g.name == name)
    }

    /// Functions carrying an entry-point marker, in module order.
    pub fn entry_points(&self) -> Vec<&Function> {
        self.functions.iter().filter(|f| f.is_entry_point()).collect()
    }

    /// The sole entry point, if exactly one exists.
    pub fn entry_point(&self) -> Option<&Function> {
        match self.entry_points().as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Function declarations, in module order.
    pub fn declarations(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| f.is_declaration())
    }

    /// Function definitions, in module order.
    pub fn definitions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| !f.is_declaration())
    }

    /// Static call graph between the module's functions.
    pub fn call_graph(&self) -> CallGraph {
        CallGraph::build(self)
    }
}

/// Escape bytes for an LLVM `c"..."` string or quoted attribute.
pub fn escape_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b == b'"' || b == b'\\' || !(0x20..0x7f).contains(&b) {
            out.push_str(&format!("\\{b:02X}"));
        } else {
            out.push(b as char);
        }
    }
    out
}

/// Check if a name can be printed after `@`/`%` without quotes.
pub fn is_plain_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => false,
        Some(c) if c.is_ascii_digit() => name.chars().all(|c| c.is_ascii_digit()),
        Some(c) => {
            (c.is_ascii_alphabetic() || "$._-".contains(c))
                && chars.all(|c| c.is_ascii_alphanumeric() || "$._-".contains(c))
        }
    }
}

/// Print a name, quoting it if necessary.
pub fn format_name(name: &str) -> String {
    if is_plain_name(name) {
        name.to_string()
    } else {
        format!("\"{}\"", escape_string(name.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(attrs: Vec<Attribute>) -> Function {
        Function {
            name: "main".into(),
            ret: Type::Void,
            params: vec![],
            blocks: vec![BasicBlock {
                label: "entry".into(),
                instructions: vec![Instruction::Ret { value: None }],
            }],
            attributes: attrs,
        }
    }

    #[test]
    fn test_entry_point_markers() {
        let f = entry(vec![Attribute::Flag("EntryPoint".into())]);
        assert!(f.is_entry_point());
        let g = entry(vec![Attribute::Keyword("nounwind".into())]);
        assert!(!g.is_entry_point());
    }

    #[test]
    fn test_required_count_aliases() {
        let f = entry(vec![
            Attribute::Flag("entry_point".into()),
            Attribute::KeyValue("requiredQubits".into(), "3".into()),
            Attribute::KeyValue("required_num_results".into(), "2".into()),
        ]);
        assert_eq!(f.required_num_qubits(), Some(3));
        assert_eq!(f.required_num_results(), Some(2));
    }

    #[test]
    fn test_sole_entry_point() {
        let mut module = Module::new("m");
        module
            .functions
            .push(entry(vec![Attribute::Flag("entry_point".into())]));
        assert_eq!(module.entry_point().map(|f| f.name.as_str()), Some("main"));

        let mut second = entry(vec![Attribute::Flag("entry_point".into())]);
        second.name = "other".into();
        module.functions.push(second);
        assert!(module.entry_point().is_none());
        assert_eq!(module.entry_points().len(), 2);
    }

    #[test]
    fn test_global_text() {
        let g = GlobalString {
            name: "0".into(),
            bytes: b"r0\0".to_vec(),
        };
        assert_eq!(g.text(), "r0");
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn test_name_quoting() {
        assert_eq!(format_name("__quantum__qis__h__body"), "__quantum__qis__h__body");
        assert_eq!(format_name("12"), "12");
        assert_eq!(format_name("1a"), "\"1a\"");
        assert_eq!(format_name("has space"), "\"has space\"");
        assert_eq!(escape_string(b"a\"\0"), "a\\22\\00");
    }
}
