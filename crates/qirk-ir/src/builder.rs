//! Incremental construction of QIR modules.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::emitter;
use crate::error::{IrError, IrResult};
use crate::instruction::{BinaryOp, CastOp, Instruction, IntPredicate};
use crate::intrinsic::{Intrinsic, Signature};
use crate::module::{Attribute, BasicBlock, Function, GlobalString, Module};
use crate::qubit::{QubitId, ResultId};
use crate::types::{QUBIT_TYPE, RESULT_TYPE, Type};
use crate::value::{Operand, Value};

/// Name of the entry function created by the builder.
pub const ENTRY_FUNCTION: &str = "main";

/// Builds a QIR module with a single entry function.
///
/// The builder owns its declaration table, so independent builders never
/// share state. Instructions are appended at the end of the current block;
/// once a block is terminated, a different block has to be positioned
/// before anything else can be emitted.
///
/// ```rust
/// use qirk_ir::{ModuleBuilder, QubitId, ResultId};
///
/// let mut builder = ModuleBuilder::new("bell", 2, 2).unwrap();
/// builder.h(QubitId(0)).unwrap();
/// builder.cx(QubitId(0), QubitId(1)).unwrap();
/// builder.mz(QubitId(0), ResultId(0)).unwrap();
/// builder.mz(QubitId(1), ResultId(1)).unwrap();
/// builder.emit_return().unwrap();
///
/// let ir = builder.ir().unwrap();
/// assert!(ir.contains("call void @__quantum__qis__h__body(%Qubit* null)"));
/// ```
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    name: String,
    num_qubits: u64,
    num_results: u64,
    blocks: Vec<BasicBlock>,
    labels: FxHashSet<String>,
    current: usize,
    declarations: Vec<Function>,
    declared: FxHashMap<String, usize>,
    globals: Vec<GlobalString>,
    next_value: u64,
}

impl ModuleBuilder {
    /// Create a builder with `num_qubits` qubits and `num_results` results.
    pub fn new(name: impl Into<String>, num_qubits: i64, num_results: i64) -> IrResult<Self> {
        let num_qubits = u64::try_from(num_qubits).map_err(|_| {
            IrError::InvalidArgument(format!("qubit count must be non-negative, got {num_qubits}"))
        })?;
        let num_results = u64::try_from(num_results).map_err(|_| {
            IrError::InvalidArgument(format!(
                "result count must be non-negative, got {num_results}"
            ))
        })?;

        let mut labels = FxHashSet::default();
        labels.insert("entry".to_string());
        Ok(Self {
            name: name.into(),
            num_qubits,
            num_results,
            blocks: vec![BasicBlock::new("entry")],
            labels,
            current: 0,
            declarations: vec![],
            declared: FxHashMap::default(),
            globals: vec![],
            next_value: 0,
        })
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of preallocated qubits.
    pub fn num_qubits(&self) -> u64 {
        self.num_qubits
    }

    /// Number of preallocated results.
    pub fn num_results(&self) -> u64 {
        self.num_results
    }

    /// Operand for qubit `index`.
    pub fn qubit(&self, index: u64) -> IrResult<Operand> {
        if index >= self.num_qubits {
            return Err(IrError::InvalidArgument(format!(
                "qubit {index} out of range (module has {} qubits)",
                self.num_qubits
            )));
        }
        Ok(Operand::qubit(QubitId(index)))
    }

    /// Operand for result `index`.
    pub fn result(&self, index: u64) -> IrResult<Operand> {
        if index >= self.num_results {
            return Err(IrError::InvalidArgument(format!(
                "result {index} out of range (module has {} results)",
                self.num_results
            )));
        }
        Ok(Operand::result(ResultId(index)))
    }

    /// Operands for every preallocated qubit.
    pub fn qubits(&self) -> Vec<Operand> {
        (0..self.num_qubits).map(|i| Operand::qubit(QubitId(i))).collect()
    }

    /// Operands for every preallocated result.
    pub fn results(&self) -> Vec<Operand> {
        (0..self.num_results)
            .map(|i| Operand::result(ResultId(i)))
            .collect()
    }

    /// Label of the block instructions are currently appended to.
    pub fn current_block(&self) -> &str {
        &self.blocks[self.current].label
    }

    // =========================================================================
    // Declarations and calls
    // =========================================================================

    /// Declare an external function.
    ///
    /// Declaring the same name twice is fine as long as the signatures agree.
    pub fn add_external_function(&mut self, name: &str, signature: Signature) -> IrResult<()> {
        if name == ENTRY_FUNCTION {
            return Err(IrError::InvalidArgument(format!(
                "`{name}` is reserved for the entry point"
            )));
        }
        if let Some(&idx) = self.declared.get(name) {
            let existing = &self.declarations[idx];
            let params: Vec<Type> = existing.params.iter().map(|p| p.ty.clone()).collect();
            if existing.ret != signature.ret || params != signature.params {
                return Err(IrError::InvalidArgument(format!(
                    "`{name}` was declared as {} but is used as {signature}",
                    Signature::new(existing.ret.clone(), params)
                )));
            }
            return Ok(());
        }

        let mut declaration = Function::declaration(name, signature.ret, signature.params);
        if Intrinsic::from_name(name).is_some_and(Intrinsic::is_irreversible) {
            declaration
                .attributes
                .push(Attribute::Flag("irreversible".into()));
        }
        self.declared.insert(name.to_string(), self.declarations.len());
        self.declarations.push(declaration);
        Ok(())
    }

    /// Append a call to `name`, declaring it on first use.
    ///
    /// Returns the bound value for non-void calls.
    pub fn emit_call(
        &mut self,
        name: &str,
        ret: Type,
        args: Vec<Operand>,
    ) -> IrResult<Option<Value>> {
        self.ensure_open()?;
        for arg in &args {
            self.check_operand(arg)?;
        }
        let params = args.iter().map(|a| a.ty.clone()).collect();
        self.add_external_function(name, Signature::new(ret.clone(), params))?;

        let result = (!ret.is_void()).then(|| self.fresh_name());
        self.push(Instruction::Call {
            result: result.clone(),
            ret,
            callee: name.to_string(),
            args,
        })?;
        Ok(result.map(Value::Local))
    }

    /// Append a call to a catalog intrinsic using its canonical signature.
    pub fn emit_intrinsic(
        &mut self,
        intrinsic: Intrinsic,
        args: Vec<Operand>,
    ) -> IrResult<Option<Value>> {
        let signature = intrinsic.signature();
        if args.len() != signature.params.len() {
            return Err(IrError::InvalidArgument(format!(
                "`{intrinsic}` takes {} arguments, got {}",
                signature.params.len(),
                args.len()
            )));
        }
        let args = args
            .into_iter()
            .zip(&signature.params)
            .map(|(arg, ty)| Operand::new(ty.clone(), arg.value))
            .collect();
        self.emit_call(intrinsic.name(), signature.ret, args)
    }

    fn emit_valued(&mut self, intrinsic: Intrinsic, args: Vec<Operand>) -> IrResult<Value> {
        self.emit_intrinsic(intrinsic, args)?.ok_or_else(|| {
            IrError::InvalidState(format!("`{intrinsic}` produced no value"))
        })
    }

    fn gate(&mut self, intrinsic: Intrinsic, args: Vec<Operand>) -> IrResult<&mut Self> {
        self.emit_intrinsic(intrinsic, args)?;
        Ok(self)
    }

    // =========================================================================
    // Quantum instructions
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::H, vec![qubit.into()])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::X, vec![qubit.into()])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Y, vec![qubit.into()])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Z, vec![qubit.into()])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::S, vec![qubit.into()])
    }

    /// Apply the adjoint of S.
    pub fn s_adj(&mut self, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::SAdj, vec![qubit.into()])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::T, vec![qubit.into()])
    }

    /// Apply the adjoint of T.
    pub fn t_adj(&mut self, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::TAdj, vec![qubit.into()])
    }

    /// Apply Rx rotation.
    pub fn rx(&mut self, theta: f64, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Rx, vec![Operand::double(theta), qubit.into()])
    }

    /// Apply Ry rotation.
    pub fn ry(&mut self, theta: f64, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Ry, vec![Operand::double(theta), qubit.into()])
    }

    /// Apply Rz rotation.
    pub fn rz(&mut self, theta: f64, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Rz, vec![Operand::double(theta), qubit.into()])
    }

    /// Apply CNOT.
    pub fn cx(
        &mut self,
        control: impl Into<Operand>,
        target: impl Into<Operand>,
    ) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Cx, vec![control.into(), target.into()])
    }

    /// Apply CZ.
    pub fn cz(
        &mut self,
        control: impl Into<Operand>,
        target: impl Into<Operand>,
    ) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Cz, vec![control.into(), target.into()])
    }

    /// Apply SWAP.
    pub fn swap(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Swap, vec![a.into(), b.into()])
    }

    /// Apply Toffoli.
    pub fn ccx(
        &mut self,
        c1: impl Into<Operand>,
        c2: impl Into<Operand>,
        target: impl Into<Operand>,
    ) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Ccx, vec![c1.into(), c2.into(), target.into()])
    }

    /// Apply an Rxx/Ryy/Rzz two-qubit rotation.
    pub fn two_qubit_rotation(
        &mut self,
        intrinsic: Intrinsic,
        theta: f64,
        a: impl Into<Operand>,
        b: impl Into<Operand>,
    ) -> IrResult<&mut Self> {
        if !matches!(intrinsic, Intrinsic::Rxx | Intrinsic::Ryy | Intrinsic::Rzz) {
            return Err(IrError::InvalidArgument(format!(
                "`{intrinsic}` is not a two-qubit rotation"
            )));
        }
        self.gate(intrinsic, vec![Operand::double(theta), a.into(), b.into()])
    }

    /// Emit a barrier.
    pub fn barrier(&mut self) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Barrier, vec![])
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: impl Into<Operand>) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Reset, vec![qubit.into()])
    }

    /// Measure `qubit` in the Z basis into `result`.
    pub fn mz(
        &mut self,
        qubit: impl Into<Operand>,
        result: impl Into<Operand>,
    ) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Mz, vec![qubit.into(), result.into()])
    }

    /// Measure and reset `qubit`, storing the outcome in `result`.
    pub fn mresetz(
        &mut self,
        qubit: impl Into<Operand>,
        result: impl Into<Operand>,
    ) -> IrResult<&mut Self> {
        self.gate(Intrinsic::MResetZ, vec![qubit.into(), result.into()])
    }

    /// Measure `qubit`, returning a dynamic result pointer.
    pub fn m(&mut self, qubit: impl Into<Operand>) -> IrResult<Value> {
        self.emit_valued(Intrinsic::M, vec![qubit.into()])
    }

    /// Read a measurement result as an `i1`.
    pub fn read_result(&mut self, result: impl Into<Operand>) -> IrResult<Value> {
        self.emit_valued(Intrinsic::ReadResult, vec![result.into()])
    }

    // =========================================================================
    // Runtime functions
    // =========================================================================

    /// Emit `__quantum__rt__initialize(i8* null)`.
    pub fn initialize(&mut self) -> IrResult<&mut Self> {
        self.gate(Intrinsic::Initialize, vec![Operand::null_label()])
    }

    /// Allocate a qubit dynamically.
    pub fn qubit_allocate(&mut self) -> IrResult<Value> {
        self.emit_valued(Intrinsic::QubitAllocate, vec![])
    }

    /// Release a dynamically allocated qubit.
    pub fn qubit_release(&mut self, qubit: Value) -> IrResult<&mut Self> {
        self.gate(Intrinsic::QubitRelease, vec![Operand::new(Type::qubit(), qubit)])
    }

    /// The result constant for one.
    pub fn result_get_one(&mut self) -> IrResult<Value> {
        self.emit_valued(Intrinsic::ResultGetOne, vec![])
    }

    /// The result constant for zero.
    pub fn result_get_zero(&mut self) -> IrResult<Value> {
        self.emit_valued(Intrinsic::ResultGetZero, vec![])
    }

    /// Compare two results.
    pub fn result_equal(
        &mut self,
        a: impl Into<Operand>,
        b: impl Into<Operand>,
    ) -> IrResult<Value> {
        self.emit_valued(Intrinsic::ResultEqual, vec![a.into(), b.into()])
    }

    /// Record a result for output.
    pub fn result_record_output(
        &mut self,
        result: impl Into<Operand>,
        label: Option<&str>,
    ) -> IrResult<&mut Self> {
        let label = self.label(label);
        self.gate(Intrinsic::ResultRecordOutput, vec![result.into(), label])
    }

    /// Start an array of `len` recorded values.
    pub fn array_record_output(&mut self, len: i64, label: Option<&str>) -> IrResult<&mut Self> {
        let label = self.label(label);
        self.gate(
            Intrinsic::ArrayRecordOutput,
            vec![Operand::int(64, len), label],
        )
    }

    /// Start a tuple of `len` recorded values.
    pub fn tuple_record_output(&mut self, len: i64, label: Option<&str>) -> IrResult<&mut Self> {
        let label = self.label(label);
        self.gate(
            Intrinsic::TupleRecordOutput,
            vec![Operand::int(64, len), label],
        )
    }

    /// Record an `i1` for output.
    pub fn bool_record_output(&mut self, value: Value, label: Option<&str>) -> IrResult<&mut Self> {
        let label = self.label(label);
        self.gate(
            Intrinsic::BoolRecordOutput,
            vec![Operand::new(Type::bool(), value), label],
        )
    }

    /// Record an `i64` for output.
    pub fn int_record_output(&mut self, value: Value, label: Option<&str>) -> IrResult<&mut Self> {
        let label = self.label(label);
        self.gate(
            Intrinsic::IntRecordOutput,
            vec![Operand::new(Type::i64(), value), label],
        )
    }

    /// Record a `double` for output.
    pub fn double_record_output(
        &mut self,
        value: Value,
        label: Option<&str>,
    ) -> IrResult<&mut Self> {
        let label = self.label(label);
        self.gate(
            Intrinsic::DoubleRecordOutput,
            vec![Operand::new(Type::Double, value), label],
        )
    }

    fn label(&mut self, label: Option<&str>) -> Operand {
        match label {
            Some(text) => Operand::new(Type::i8_ptr(), self.add_string(text)),
            None => Operand::null_label(),
        }
    }

    /// Add a NUL-terminated global string and return a pointer to its first byte.
    pub fn add_string(&mut self, text: &str) -> Value {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let global = GlobalString {
            name: self.globals.len().to_string(),
            bytes,
        };
        let value = Value::StringElement {
            global: global.name.clone(),
            len: global.len(),
        };
        self.globals.push(global);
        value
    }

    // =========================================================================
    // Classical instructions
    // =========================================================================

    /// Append an integer binary operation.
    pub fn binary(&mut self, op: BinaryOp, width: u32, lhs: Value, rhs: Value) -> IrResult<Value> {
        check_width(width)?;
        let result = self.fresh_name();
        self.push(Instruction::Binary {
            result: result.clone(),
            op,
            width,
            lhs,
            rhs,
        })?;
        Ok(Value::Local(result))
    }

    /// Append an integer comparison, producing an `i1`.
    pub fn icmp(
        &mut self,
        predicate: IntPredicate,
        width: u32,
        lhs: Value,
        rhs: Value,
    ) -> IrResult<Value> {
        check_width(width)?;
        let result = self.fresh_name();
        self.push(Instruction::ICmp {
            result: result.clone(),
            predicate,
            width,
            lhs,
            rhs,
        })?;
        Ok(Value::Local(result))
    }

    /// Append an integer width conversion.
    pub fn cast(&mut self, op: CastOp, from: u32, value: Value, to: u32) -> IrResult<Value> {
        check_width(from)?;
        check_width(to)?;
        let valid = match op {
            CastOp::ZExt | CastOp::SExt => to > from,
            CastOp::Trunc => to < from,
        };
        if !valid {
            return Err(IrError::InvalidArgument(format!(
                "cannot {} i{from} to i{to}",
                op.mnemonic()
            )));
        }
        let result = self.fresh_name();
        self.push(Instruction::Cast {
            result: result.clone(),
            op,
            from,
            value,
            to,
        })?;
        Ok(Value::Local(result))
    }

    /// Append a `select`.
    pub fn select(
        &mut self,
        condition: Value,
        ty: Type,
        then_value: Value,
        else_value: Value,
    ) -> IrResult<Value> {
        let result = self.fresh_name();
        self.push(Instruction::Select {
            result: result.clone(),
            condition,
            ty,
            then_value,
            else_value,
        })?;
        Ok(Value::Local(result))
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    /// Append a new block, returning its (uniquified) label.
    pub fn append_block(&mut self, label: &str) -> String {
        let label = if label.is_empty() { "block" } else { label };
        let mut unique = label.to_string();
        let mut n = 1;
        while self.labels.contains(&unique) {
            unique = format!("{label}{n}");
            n += 1;
        }
        self.labels.insert(unique.clone());
        self.blocks.push(BasicBlock::new(unique.clone()));
        unique
    }

    /// Continue emitting at the end of block `label`.
    pub fn position_at_end(&mut self, label: &str) -> IrResult<()> {
        self.current = self.block_index(label).ok_or_else(|| {
            IrError::InvalidArgument(format!("no block labelled `{label}`"))
        })?;
        Ok(())
    }

    /// Terminate the current block with `br label %target`.
    pub fn emit_branch(&mut self, target: &str) -> IrResult<()> {
        self.check_target(target)?;
        self.push(Instruction::Br {
            target: target.to_string(),
        })
    }

    /// Terminate the current block with a conditional branch on an `i1`.
    pub fn emit_conditional_branch(
        &mut self,
        condition: Value,
        then_target: &str,
        else_target: &str,
    ) -> IrResult<()> {
        self.check_target(then_target)?;
        self.check_target(else_target)?;
        self.push(Instruction::CondBr {
            condition,
            then_target: then_target.to_string(),
            else_target: else_target.to_string(),
        })
    }

    /// Terminate the current block with `ret void`.
    pub fn emit_return(&mut self) -> IrResult<()> {
        self.push(Instruction::Ret { value: None })
    }

    /// Emit a structured if/else on an `i1` condition.
    ///
    /// Creates `then`, `else` and `continue` blocks; each branch body falls
    /// through to `continue`, where emission resumes.
    pub fn if_<T, E>(&mut self, condition: Value, then_body: T, else_body: E) -> IrResult<()>
    where
        T: FnOnce(&mut Self) -> IrResult<()>,
        E: FnOnce(&mut Self) -> IrResult<()>,
    {
        self.ensure_open()?;
        let then_block = self.append_block("then");
        let else_block = self.append_block("else");
        self.emit_conditional_branch(condition, &then_block, &else_block)?;
        let continue_block = self.append_block("continue");

        self.position_at_end(&then_block)?;
        then_body(self)?;
        self.fall_through(&continue_block)?;

        self.position_at_end(&else_block)?;
        else_body(self)?;
        self.fall_through(&continue_block)?;

        self.position_at_end(&continue_block)
    }

    /// Emit a structured if/else on a measurement result.
    pub fn if_result<O, Z>(
        &mut self,
        result: impl Into<Operand>,
        one: O,
        zero: Z,
    ) -> IrResult<()>
    where
        O: FnOnce(&mut Self) -> IrResult<()>,
        Z: FnOnce(&mut Self) -> IrResult<()>,
    {
        let condition = self.read_result(result)?;
        self.if_(condition, one, zero)
    }

    fn fall_through(&mut self, target: &str) -> IrResult<()> {
        if self.blocks[self.current].terminator().is_none() {
            self.emit_branch(target)?;
        }
        Ok(())
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Finish building and return the module.
    pub fn finish(self) -> IrResult<Module> {
        if let Some(open) = self.blocks.iter().find(|b| b.terminator().is_none()) {
            return Err(IrError::InvalidState(format!(
                "block `{}` has no terminator",
                open.label
            )));
        }

        let mut blocks = self.blocks;
        renumber(&mut blocks);

        let entry = Function {
            name: ENTRY_FUNCTION.to_string(),
            ret: Type::Void,
            params: vec![],
            blocks,
            attributes: vec![
                Attribute::Flag("entry_point".into()),
                Attribute::KeyValue("num_required_qubits".into(), self.num_qubits.to_string()),
                Attribute::KeyValue("num_required_results".into(), self.num_results.to_string()),
                Attribute::Flag("output_labeling_schema".into()),
                Attribute::KeyValue("qir_profiles".into(), "custom".into()),
            ],
        };

        let mut functions = vec![entry];
        functions.extend(self.declarations);

        Ok(Module {
            source_filename: Some(self.name.clone()),
            name: self.name,
            opaque_types: vec![QUBIT_TYPE.to_string(), RESULT_TYPE.to_string()],
            globals: self.globals,
            functions,
        })
    }

    /// Textual IR of the module built so far.
    pub fn ir(&self) -> IrResult<String> {
        let module = self.clone().finish()?;
        Ok(emitter::emit(&module))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn fresh_name(&mut self) -> String {
        let name = self.next_value.to_string();
        self.next_value += 1;
        name
    }

    fn block_index(&self, label: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.label == label)
    }

    fn ensure_open(&self) -> IrResult<()> {
        let block = &self.blocks[self.current];
        if block.terminator().is_some() {
            return Err(IrError::InvalidState(format!(
                "block `{}` is already terminated",
                block.label
            )));
        }
        Ok(())
    }

    fn push(&mut self, instruction: Instruction) -> IrResult<()> {
        self.ensure_open()?;
        self.blocks[self.current].instructions.push(instruction);
        Ok(())
    }

    fn check_target(&self, label: &str) -> IrResult<()> {
        if self.block_index(label).is_none() {
            return Err(IrError::InvalidState(format!(
                "branch to unknown block `{label}`"
            )));
        }
        Ok(())
    }

    fn check_operand(&self, operand: &Operand) -> IrResult<()> {
        let Some(index) = operand.value.as_pointer_index() else {
            return Ok(());
        };
        if operand.ty.is_qubit() && index >= self.num_qubits {
            return Err(IrError::InvalidArgument(format!(
                "qubit {index} out of range (module has {} qubits)",
                self.num_qubits
            )));
        }
        if operand.ty.is_result() && index >= self.num_results {
            return Err(IrError::InvalidArgument(format!(
                "result {index} out of range (module has {} results)",
                self.num_results
            )));
        }
        Ok(())
    }
}

fn check_width(width: u32) -> IrResult<()> {
    if !(1..=64).contains(&width) {
        return Err(IrError::InvalidArgument(format!(
            "integer width must be between 1 and 64, got {width}"
        )));
    }
    Ok(())
}

/// Renumber unnamed values in block layout order.
fn renumber(blocks: &mut [BasicBlock]) {
    let mut names = FxHashMap::default();
    for instruction in blocks.iter_mut().flat_map(|b| b.instructions.iter_mut()) {
        if let Some(result) = instruction.result_mut() {
            let fresh = names.len().to_string();
            names.insert(std::mem::replace(result, fresh.clone()), fresh);
        }
    }
    for instruction in blocks.iter_mut().flat_map(|b| b.instructions.iter_mut()) {
        for value in instruction.operands_mut() {
            if let Value::Local(name) = value {
                if let Some(fresh) = names.get(name.as_str()) {
                    name.clone_from(fresh);
                }
            }
        }
    }
}
