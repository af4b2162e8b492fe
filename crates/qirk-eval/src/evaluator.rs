//! The non-adaptive evaluator.

use qirk_ir::{
    Function, Instruction, Intrinsic, Module, Operand, Type, Value, module::REQUIRED_QUBITS_ATTRS,
    module::REQUIRED_RESULTS_ATTRS,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::arith;
use crate::error::{EvalError, EvalResult};
use crate::gateset::{GateSet, QuantumOp};

/// Default bound on nested calls to defined functions.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Evaluation limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Fail with [`EvalError::StepLimitExceeded`] after this many
    /// instructions. Unbounded when `None`.
    pub max_steps: Option<u64>,
    /// Maximum number of simultaneously active frames, entry included.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// One measurement outcome, in the order it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Measurement {
    pub qubit: u64,
    /// Target result, `None` for `m`.
    pub result: Option<u64>,
    pub value: bool,
}

/// A value passed to one of the `*_record_output` runtime functions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputRecord {
    Result {
        value: bool,
        label: Option<String>,
    },
    Bool {
        value: bool,
        label: Option<String>,
    },
    Int {
        value: i64,
        label: Option<String>,
    },
    Double {
        value: f64,
        label: Option<String>,
    },
    Array {
        len: i64,
        label: Option<String>,
    },
    Tuple {
        len: i64,
        label: Option<String>,
    },
}

impl OutputRecord {
    /// The record's label, if one was given.
    pub fn label(&self) -> Option<&str> {
        match self {
            OutputRecord::Result { label, .. }
            | OutputRecord::Bool { label, .. }
            | OutputRecord::Int { label, .. }
            | OutputRecord::Double { label, .. }
            | OutputRecord::Array { label, .. }
            | OutputRecord::Tuple { label, .. } => label.as_deref(),
        }
    }
}

/// Summary of a finished run, handed to [`GateSet::finish`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunMetadata {
    pub entry_point: String,
    /// Declared qubit count, or highest used index + 1 when larger.
    pub num_qubits: u64,
    /// Declared result count, or highest used index + 1 when larger.
    pub num_results: u64,
    /// Instructions executed.
    pub steps: u64,
    /// Values taken from the result stream.
    pub consumed: usize,
    pub measurements: Vec<Measurement>,
    pub output: Vec<OutputRecord>,
}

/// Walks a module's entry point, dispatching quantum intrinsics to a
/// [`GateSet`] and resolving branches from a result stream.
///
/// Evaluation borrows the module and keeps all run state per call, so one
/// evaluator can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    /// Create an evaluator with the given limits.
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// The evaluator's limits.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate `module`.
    ///
    /// `entry_point` selects any defined function by name; without it the
    /// module's sole attribute-marked entry point is used. Measurements take
    /// successive values from `result_stream`, or read `false` when no
    /// stream is given.
    #[instrument(skip_all, fields(module = %module.name))]
    pub fn eval(
        &self,
        module: &Module,
        gates: &mut dyn GateSet,
        entry_point: Option<&str>,
        result_stream: Option<&[bool]>,
    ) -> EvalResult<RunMetadata> {
        let entry = resolve_entry(module, entry_point)?;
        check_supported(module, entry)?;
        debug!(entry = %entry.name, "starting evaluation");

        let mut machine = Machine::new(module, entry, &self.config, gates, result_stream);
        machine.run(entry)
    }
}

/// Evaluate with the default configuration.
pub fn eval(
    module: &Module,
    gates: &mut dyn GateSet,
    entry_point: Option<&str>,
    result_stream: Option<&[bool]>,
) -> EvalResult<RunMetadata> {
    Evaluator::default().eval(module, gates, entry_point, result_stream)
}

fn resolve_entry<'m>(module: &'m Module, name: Option<&str>) -> EvalResult<&'m Function> {
    match name {
        Some(name) => module
            .function(name)
            .filter(|f| !f.is_declaration())
            .ok_or_else(|| {
                EvalError::EntryPointNotFound(format!("no function `{name}` with a body"))
            }),
        None => module
            .entry_point()
            .filter(|f| !f.is_declaration())
            .ok_or_else(|| {
                EvalError::EntryPointNotFound(format!(
                    "module has {} functions marked as entry point, expected one",
                    module.entry_points().len()
                ))
            }),
    }
}

/// Every function the entry point can reach must either have a body or be
/// a catalog intrinsic.
fn check_supported(module: &Module, entry: &Function) -> EvalResult<()> {
    let graph = module.call_graph();
    let reachable: FxHashSet<&str> = graph.reachable_from(&entry.name).into_iter().collect();

    let mut unsupported: Vec<String> = module
        .functions
        .iter()
        .filter(|f| reachable.contains(f.name.as_str()))
        .filter(|f| f.is_declaration() && Intrinsic::from_name(&f.name).is_none())
        .map(|f| f.name.clone())
        .collect();

    let mut missing: Vec<String> = reachable
        .iter()
        .filter(|name| module.function(name).is_none() && Intrinsic::from_name(name).is_none())
        .map(|name| (*name).to_string())
        .collect();
    missing.sort_unstable();
    unsupported.extend(missing);

    if unsupported.is_empty() {
        Ok(())
    } else {
        Err(EvalError::UnsupportedIntrinsic(unsupported))
    }
}

// =============================================================================
// Runtime values
// =============================================================================

/// A value held in a frame's environment.
#[derive(Debug, Clone, PartialEq)]
enum RtValue {
    Int { width: u32, bits: u64 },
    Double(f64),
    Ptr(Pointer),
}

/// What a pointer value refers to.
#[derive(Debug, Clone, PartialEq)]
enum Pointer {
    /// Static or allocated index; `null` is index 0.
    Index(u64),
    /// A result handle carrying its outcome (`m`, `result_get_one/zero`).
    Outcome(bool),
    /// A global, used for output labels.
    Global(String),
}

impl RtValue {
    fn bool(value: bool) -> Self {
        RtValue::Int {
            width: 1,
            bits: u64::from(value),
        }
    }

    fn describe(&self) -> String {
        match self {
            RtValue::Int { width, .. } => format!("i{width}"),
            RtValue::Double(_) => "double".to_string(),
            RtValue::Ptr(_) => "pointer".to_string(),
        }
    }
}

/// Activation record of one function.
struct Frame<'m> {
    function: &'m Function,
    block: usize,
    index: usize,
    env: FxHashMap<&'m str, RtValue>,
    /// Name to bind the return value to in the caller.
    return_to: Option<&'m str>,
}

impl<'m> Frame<'m> {
    fn new(function: &'m Function, return_to: Option<&'m str>) -> Self {
        Self {
            function,
            block: 0,
            index: 0,
            env: FxHashMap::default(),
            return_to,
        }
    }

    fn lookup(&self, name: &str) -> EvalResult<RtValue> {
        self.env
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnboundValue {
                function: self.function.name.clone(),
                name: name.to_string(),
            })
    }

    /// Evaluate a value whose type is `ty`.
    fn value(&self, ty: &Type, value: &Value) -> EvalResult<RtValue> {
        match value {
            Value::Local(name) => self.lookup(name),
            Value::Int(v) => match ty.int_width() {
                Some(width) => {
                    arith::check_width(width)?;
                    Ok(RtValue::Int {
                        width,
                        bits: arith::truncate(*v, width),
                    })
                }
                None if *ty == Type::Double => Ok(RtValue::Double(*v as f64)),
                None => Err(EvalError::TypeMismatch(format!(
                    "integer constant {v} used as {ty}"
                ))),
            },
            Value::Double(v) => Ok(RtValue::Double(*v)),
            Value::Null => Ok(RtValue::Ptr(Pointer::Index(0))),
            Value::IntToPtr(n) => u64::try_from(*n)
                .map(|i| RtValue::Ptr(Pointer::Index(i)))
                .map_err(|_| EvalError::InvalidOperand(format!("negative pointer index {n}"))),
            Value::Global(name) | Value::StringElement { global: name, .. } => {
                Ok(RtValue::Ptr(Pointer::Global(name.clone())))
            }
        }
    }

    fn operand(&self, operand: &Operand) -> EvalResult<RtValue> {
        self.value(&operand.ty, &operand.value)
    }

    /// Evaluate an integer at an expected width.
    fn int(&self, width: u32, value: &Value) -> EvalResult<u64> {
        match self.value(&Type::Int(width), value)? {
            RtValue::Int { width: w, bits } if w == width => Ok(bits),
            other => Err(EvalError::TypeMismatch(format!(
                "expected i{width}, found {}",
                other.describe()
            ))),
        }
    }

    fn condition(&self, value: &Value) -> EvalResult<bool> {
        Ok(self.int(1, value)? != 0)
    }

    fn bind(&mut self, name: &'m str, value: RtValue) {
        trace!(name, ?value, "bind");
        self.env.insert(name, value);
    }
}

// =============================================================================
// Machine
// =============================================================================

/// Per-run state.
struct Machine<'m, 'g, 's> {
    module: &'m Module,
    config: &'m EvalConfig,
    gates: &'g mut dyn GateSet,
    stream: Option<&'s [bool]>,
    consumed: usize,
    results: FxHashMap<u64, bool>,
    measurements: Vec<Measurement>,
    output: Vec<OutputRecord>,
    steps: u64,
    num_qubits: u64,
    num_results: u64,
    next_allocated: u64,
    entry_point: String,
}

impl<'m, 'g, 's> Machine<'m, 'g, 's> {
    fn new(
        module: &'m Module,
        entry: &'m Function,
        config: &'m EvalConfig,
        gates: &'g mut dyn GateSet,
        stream: Option<&'s [bool]>,
    ) -> Self {
        let num_qubits = declared_count(entry, &REQUIRED_QUBITS_ATTRS);
        Self {
            module,
            config,
            gates,
            stream,
            consumed: 0,
            results: FxHashMap::default(),
            measurements: vec![],
            output: vec![],
            steps: 0,
            num_qubits,
            num_results: declared_count(entry, &REQUIRED_RESULTS_ATTRS),
            next_allocated: num_qubits,
            entry_point: entry.name.clone(),
        }
    }

    fn run(&mut self, entry: &'m Function) -> EvalResult<RunMetadata> {
        let mut frames = vec![Frame::new(entry, None)];

        loop {
            let Some(frame) = frames.last_mut() else {
                break;
            };
            let block = &frame.function.blocks[frame.block];
            let Some(inst) = block.instructions.get(frame.index) else {
                return Err(EvalError::InvalidOperand(format!(
                    "block `{}` in `{}` ends without a terminator",
                    block.label, frame.function.name
                )));
            };
            self.tick()?;
            trace!(function = %frame.function.name, block = %block.label, %inst, "execute");
            frame.index += 1;

            match inst {
                Instruction::Call {
                    result,
                    callee,
                    args,
                    ..
                } => {
                    let args = args
                        .iter()
                        .map(|a| frame.operand(a))
                        .collect::<EvalResult<Vec<_>>>()?;

                    let defined = self.module.function(callee).filter(|f| !f.is_declaration());
                    if let Some(target) = defined {
                        if frames.len() >= self.config.max_call_depth {
                            return Err(EvalError::CallDepthExceeded {
                                limit: self.config.max_call_depth,
                            });
                        }
                        debug!(callee = %target.name, "call");
                        let mut callee_frame = Frame::new(target, result.as_deref());
                        for (param, arg) in target.params.iter().zip(args) {
                            if let Some(name) = &param.name {
                                callee_frame.bind(name, arg);
                            }
                        }
                        frames.push(callee_frame);
                        continue;
                    }

                    let intrinsic = Intrinsic::from_name(callee).ok_or_else(|| {
                        EvalError::UnsupportedIntrinsic(vec![callee.clone()])
                    })?;
                    let value = self.call_intrinsic(intrinsic, &args)?;
                    if let (Some(name), Some(value)) = (result, value) {
                        frame.bind(name, value);
                    }
                }
                Instruction::Binary {
                    result,
                    op,
                    width,
                    lhs,
                    rhs,
                } => {
                    let a = frame.int(*width, lhs)?;
                    let b = frame.int(*width, rhs)?;
                    let bits = arith::binary(*op, *width, a, b)?;
                    frame.bind(result, RtValue::Int {
                        width: *width,
                        bits,
                    });
                }
                Instruction::ICmp {
                    result,
                    predicate,
                    width,
                    lhs,
                    rhs,
                } => {
                    let a = frame.int(*width, lhs)?;
                    let b = frame.int(*width, rhs)?;
                    frame.bind(result, RtValue::bool(arith::compare(*predicate, *width, a, b)));
                }
                Instruction::Cast {
                    result,
                    op,
                    from,
                    value,
                    to,
                } => {
                    let bits = arith::cast(*op, *from, frame.int(*from, value)?, *to)?;
                    frame.bind(result, RtValue::Int { width: *to, bits });
                }
                Instruction::Select {
                    result,
                    condition,
                    ty,
                    then_value,
                    else_value,
                } => {
                    let chosen = if frame.condition(condition)? {
                        then_value
                    } else {
                        else_value
                    };
                    let value = frame.value(ty, chosen)?;
                    frame.bind(result, value);
                }
                Instruction::Br { target } => jump(frame, target)?,
                Instruction::CondBr {
                    condition,
                    then_target,
                    else_target,
                } => {
                    let target = if frame.condition(condition)? {
                        then_target
                    } else {
                        else_target
                    };
                    jump(frame, target)?;
                }
                Instruction::Ret { value } => {
                    let value = value.as_ref().map(|v| frame.operand(v)).transpose()?;
                    let return_to = frame.return_to;
                    frames.pop();
                    if let (Some(caller), Some(name), Some(value)) =
                        (frames.last_mut(), return_to, value)
                    {
                        caller.bind(name, value);
                    }
                }
            }
        }

        let metadata = self.metadata();
        debug!(steps = metadata.steps, consumed = metadata.consumed, "evaluation finished");
        self.gates.finish(&metadata);
        Ok(metadata)
    }

    fn tick(&mut self) -> EvalResult<()> {
        self.steps += 1;
        match self.config.max_steps {
            Some(limit) if self.steps > limit => Err(EvalError::StepLimitExceeded { limit }),
            _ => Ok(()),
        }
    }

    fn metadata(&self) -> RunMetadata {
        RunMetadata {
            entry_point: self.entry_point.clone(),
            num_qubits: self.num_qubits,
            num_results: self.num_results,
            steps: self.steps,
            consumed: self.consumed,
            measurements: self.measurements.clone(),
            output: self.output.clone(),
        }
    }

    // =========================================================================
    // Intrinsics
    // =========================================================================

    fn call_intrinsic(
        &mut self,
        intrinsic: Intrinsic,
        args: &[RtValue],
    ) -> EvalResult<Option<RtValue>> {
        let expected = intrinsic.signature().params.len();
        if args.len() != expected {
            return Err(EvalError::InvalidOperand(format!(
                "`{}` takes {expected} arguments, got {}",
                intrinsic.name(),
                args.len()
            )));
        }

        let op = match intrinsic {
            Intrinsic::Barrier => QuantumOp::Barrier,
            Intrinsic::Ccx => QuantumOp::Ccx {
                control1: self.qubit(&args[0])?,
                control2: self.qubit(&args[1])?,
                target: self.qubit(&args[2])?,
            },
            Intrinsic::Cx => QuantumOp::Cx {
                control: self.qubit(&args[0])?,
                target: self.qubit(&args[1])?,
            },
            Intrinsic::Cz => QuantumOp::Cz {
                control: self.qubit(&args[0])?,
                target: self.qubit(&args[1])?,
            },
            Intrinsic::H => QuantumOp::H {
                qubit: self.qubit(&args[0])?,
            },
            Intrinsic::S => QuantumOp::S {
                qubit: self.qubit(&args[0])?,
            },
            Intrinsic::SAdj => QuantumOp::SAdj {
                qubit: self.qubit(&args[0])?,
            },
            Intrinsic::T => QuantumOp::T {
                qubit: self.qubit(&args[0])?,
            },
            Intrinsic::TAdj => QuantumOp::TAdj {
                qubit: self.qubit(&args[0])?,
            },
            Intrinsic::X => QuantumOp::X {
                qubit: self.qubit(&args[0])?,
            },
            Intrinsic::Y => QuantumOp::Y {
                qubit: self.qubit(&args[0])?,
            },
            Intrinsic::Z => QuantumOp::Z {
                qubit: self.qubit(&args[0])?,
            },
            Intrinsic::Rx => QuantumOp::Rx {
                theta: double(&args[0])?,
                qubit: self.qubit(&args[1])?,
            },
            Intrinsic::Ry => QuantumOp::Ry {
                theta: double(&args[0])?,
                qubit: self.qubit(&args[1])?,
            },
            Intrinsic::Rz => QuantumOp::Rz {
                theta: double(&args[0])?,
                qubit: self.qubit(&args[1])?,
            },
            Intrinsic::Rxx => QuantumOp::Rxx {
                theta: double(&args[0])?,
                qubit1: self.qubit(&args[1])?,
                qubit2: self.qubit(&args[2])?,
            },
            Intrinsic::Ryy => QuantumOp::Ryy {
                theta: double(&args[0])?,
                qubit1: self.qubit(&args[1])?,
                qubit2: self.qubit(&args[2])?,
            },
            Intrinsic::Rzz => QuantumOp::Rzz {
                theta: double(&args[0])?,
                qubit1: self.qubit(&args[1])?,
                qubit2: self.qubit(&args[2])?,
            },
            Intrinsic::Swap => QuantumOp::Swap {
                qubit1: self.qubit(&args[0])?,
                qubit2: self.qubit(&args[1])?,
            },
            Intrinsic::Reset => QuantumOp::Reset {
                qubit: self.qubit(&args[0])?,
            },
            Intrinsic::Mz | Intrinsic::MResetZ => {
                let qubit = self.qubit(&args[0])?;
                let result = self.result_index(&args[1])?;
                let value = self.next_outcome()?;
                self.results.insert(result, value);
                self.measurements.push(Measurement {
                    qubit,
                    result: Some(result),
                    value,
                });
                let op = if intrinsic == Intrinsic::Mz {
                    QuantumOp::Mz { qubit, result }
                } else {
                    QuantumOp::MResetZ { qubit, result }
                };
                self.dispatch(&op);
                return Ok(None);
            }
            Intrinsic::M => {
                let qubit = self.qubit(&args[0])?;
                let value = self.next_outcome()?;
                self.measurements.push(Measurement {
                    qubit,
                    result: None,
                    value,
                });
                self.dispatch(&QuantumOp::M { qubit });
                return Ok(Some(RtValue::Ptr(Pointer::Outcome(value))));
            }
            _ => return self.call_runtime(intrinsic, args),
        };

        self.dispatch(&op);
        Ok(None)
    }

    /// Classical runtime functions; nothing is dispatched to the gate set.
    fn call_runtime(
        &mut self,
        intrinsic: Intrinsic,
        args: &[RtValue],
    ) -> EvalResult<Option<RtValue>> {
        let value = match intrinsic {
            Intrinsic::ReadResult => Some(RtValue::bool(self.result_value(&args[0])?)),
            Intrinsic::ResultGetOne => Some(RtValue::Ptr(Pointer::Outcome(true))),
            Intrinsic::ResultGetZero => Some(RtValue::Ptr(Pointer::Outcome(false))),
            Intrinsic::ResultEqual => {
                let a = self.result_value(&args[0])?;
                let b = self.result_value(&args[1])?;
                Some(RtValue::bool(a == b))
            }
            Intrinsic::QubitAllocate => {
                let index = self.next_allocated;
                self.next_allocated = index.checked_add(1).ok_or_else(|| {
                    EvalError::InvalidOperand(format!(
                        "cannot allocate a qubit past index {index}"
                    ))
                })?;
                self.num_qubits = self.num_qubits.max(self.next_allocated);
                debug!(qubit = index, "qubit allocated");
                Some(RtValue::Ptr(Pointer::Index(index)))
            }
            Intrinsic::Initialize | Intrinsic::QubitRelease => None,
            Intrinsic::ResultRecordOutput => {
                let value = match &args[0] {
                    RtValue::Ptr(Pointer::Outcome(v)) => *v,
                    other => {
                        let index = self.result_index(other)?;
                        self.results.get(&index).copied().unwrap_or(false)
                    }
                };
                self.record(OutputRecord::Result {
                    value,
                    label: self.label(&args[1])?,
                })
            }
            Intrinsic::BoolRecordOutput => self.record(OutputRecord::Bool {
                value: int_arg(&args[0], 1)? != 0,
                label: self.label(&args[1])?,
            }),
            Intrinsic::IntRecordOutput => self.record(OutputRecord::Int {
                value: arith::sign_extend(int_arg(&args[0], 64)?, 64),
                label: self.label(&args[1])?,
            }),
            Intrinsic::DoubleRecordOutput => self.record(OutputRecord::Double {
                value: double(&args[0])?,
                label: self.label(&args[1])?,
            }),
            Intrinsic::ArrayRecordOutput => self.record(OutputRecord::Array {
                len: arith::sign_extend(int_arg(&args[0], 64)?, 64),
                label: self.label(&args[1])?,
            }),
            Intrinsic::TupleRecordOutput => self.record(OutputRecord::Tuple {
                len: arith::sign_extend(int_arg(&args[0], 64)?, 64),
                label: self.label(&args[1])?,
            }),
            other => {
                return Err(EvalError::UnsupportedIntrinsic(vec![other.name().to_string()]));
            }
        };
        Ok(value)
    }

    fn dispatch(&mut self, op: &QuantumOp) {
        debug!(op = op.name(), qubits = ?op.qubits(), "dispatch");
        self.gates.apply(op);
    }

    fn record(&mut self, record: OutputRecord) -> Option<RtValue> {
        debug!(?record, "output recorded");
        self.output.push(record);
        None
    }

    /// Next value of the result stream; `false` when there is no stream.
    fn next_outcome(&mut self) -> EvalResult<bool> {
        let Some(stream) = self.stream else {
            return Ok(false);
        };
        let value = stream
            .get(self.consumed)
            .copied()
            .ok_or(EvalError::ResultStreamExhausted {
                consumed: self.consumed,
            })?;
        self.consumed += 1;
        Ok(value)
    }

    /// Outcome behind a result handle. A result never measured takes the
    /// next stream value, which is then kept for later reads.
    fn result_value(&mut self, value: &RtValue) -> EvalResult<bool> {
        if let RtValue::Ptr(Pointer::Outcome(v)) = value {
            return Ok(*v);
        }
        let index = self.result_index(value)?;
        if let Some(v) = self.results.get(&index) {
            return Ok(*v);
        }
        let v = self.next_outcome()?;
        self.results.insert(index, v);
        Ok(v)
    }

    fn qubit(&mut self, value: &RtValue) -> EvalResult<u64> {
        let index = pointer_index(value, "qubit")?;
        self.num_qubits = self.num_qubits.max(index.saturating_add(1));
        Ok(index)
    }

    fn result_index(&mut self, value: &RtValue) -> EvalResult<u64> {
        let index = pointer_index(value, "result")?;
        self.num_results = self.num_results.max(index.saturating_add(1));
        Ok(index)
    }

    fn label(&self, value: &RtValue) -> EvalResult<Option<String>> {
        match value {
            RtValue::Ptr(Pointer::Index(0)) => Ok(None),
            RtValue::Ptr(Pointer::Global(name)) => self
                .module
                .global(name)
                .map(|g| Some(g.text()))
                .ok_or_else(|| EvalError::InvalidOperand(format!("unknown global `@{name}`"))),
            other => Err(EvalError::TypeMismatch(format!(
                "expected an output label, found {}",
                other.describe()
            ))),
        }
    }
}

fn declared_count(function: &Function, keys: &[&str]) -> u64 {
    function
        .attribute_value(keys)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
}

fn jump(frame: &mut Frame<'_>, target: &str) -> EvalResult<()> {
    let index = frame.function.block_index(target).ok_or_else(|| {
        EvalError::InvalidOperand(format!(
            "branch to unknown block `{target}` in `{}`",
            frame.function.name
        ))
    })?;
    debug!(from = %frame.function.blocks[frame.block].label, to = target, "branch");
    frame.block = index;
    frame.index = 0;
    Ok(())
}

fn pointer_index(value: &RtValue, kind: &str) -> EvalResult<u64> {
    match value {
        RtValue::Ptr(Pointer::Index(i)) => Ok(*i),
        other => Err(EvalError::TypeMismatch(format!(
            "expected a {kind} pointer, found {}",
            other.describe()
        ))),
    }
}

fn double(value: &RtValue) -> EvalResult<f64> {
    match value {
        RtValue::Double(v) => Ok(*v),
        other => Err(EvalError::TypeMismatch(format!(
            "expected double, found {}",
            other.describe()
        ))),
    }
}

fn int_arg(value: &RtValue, width: u32) -> EvalResult<u64> {
    match value {
        RtValue::Int { width: w, bits } if *w == width => Ok(*bits),
        other => Err(EvalError::TypeMismatch(format!(
            "expected i{width}, found {}",
            other.describe()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qirk_ir::{BinaryOp, IntPredicate, ModuleBuilder, QubitId, ResultId};

    fn bell() -> Module {
        let mut b = ModuleBuilder::new("bell", 2, 2).unwrap();
        b.h(QubitId(0)).unwrap();
        b.cx(QubitId(0), QubitId(1)).unwrap();
        b.mz(QubitId(0), ResultId(0)).unwrap();
        b.mz(QubitId(1), ResultId(1)).unwrap();
        b.emit_return().unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_bell_trace() {
        let mut trace = Vec::new();
        let metadata = eval(&bell(), &mut trace, None, None).unwrap();
        assert_eq!(
            trace,
            vec![
                QuantumOp::H { qubit: 0 },
                QuantumOp::Cx {
                    control: 0,
                    target: 1
                },
                QuantumOp::Mz {
                    qubit: 0,
                    result: 0
                },
                QuantumOp::Mz {
                    qubit: 1,
                    result: 1
                },
            ]
        );
        assert_eq!(metadata.entry_point, "main");
        assert_eq!(metadata.num_qubits, 2);
        assert_eq!(metadata.steps, 5);
        assert_eq!(metadata.consumed, 0);
        assert!(metadata.measurements.iter().all(|m| !m.value));
    }

    #[test]
    fn test_stream_consumed_in_order() {
        let mut trace = Vec::new();
        let metadata = eval(&bell(), &mut trace, None, Some(&[true, false, true])).unwrap();
        assert_eq!(metadata.consumed, 2);
        let values: Vec<bool> = metadata.measurements.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![true, false]);
    }

    #[test]
    fn test_stream_exhausted_before_dispatch() {
        let mut trace = Vec::new();
        let err = eval(&bell(), &mut trace, None, Some(&[true])).unwrap_err();
        assert_eq!(err, EvalError::ResultStreamExhausted { consumed: 1 });
        assert_eq!(trace.len(), 3);
    }

    #[test]
    fn test_entry_point_by_name() {
        let mut trace = Vec::new();
        let err = eval(&bell(), &mut trace, Some("missing"), None).unwrap_err();
        assert!(matches!(err, EvalError::EntryPointNotFound(_)));
        assert!(eval(&bell(), &mut trace, Some("main"), None).is_ok());
    }

    #[test]
    fn test_step_limit() {
        let evaluator = Evaluator::new(EvalConfig {
            max_steps: Some(3),
            ..EvalConfig::default()
        });
        let mut trace = Vec::new();
        let err = evaluator.eval(&bell(), &mut trace, None, None).unwrap_err();
        assert_eq!(err, EvalError::StepLimitExceeded { limit: 3 });
        assert!(err.is_evaluation_fault());
    }

    #[test]
    fn test_classical_select_and_record() {
        let mut b = ModuleBuilder::new("classical", 0, 0).unwrap();
        let sum = b.binary(BinaryOp::Add, 64, Value::Int(40), Value::Int(2)).unwrap();
        let big = b
            .icmp(IntPredicate::Sgt, 64, sum.clone(), Value::Int(10))
            .unwrap();
        let chosen = b.select(big, Type::i64(), sum, Value::Int(-1)).unwrap();
        b.int_record_output(chosen, Some("answer")).unwrap();
        b.emit_return().unwrap();

        let metadata = eval(&b.finish().unwrap(), &mut Vec::new(), None, None).unwrap();
        assert_eq!(
            metadata.output,
            vec![OutputRecord::Int {
                value: 42,
                label: Some("answer".into())
            }]
        );
    }

    #[test]
    fn test_division_by_zero_is_a_fault() {
        let mut b = ModuleBuilder::new("div", 0, 0).unwrap();
        b.binary(BinaryOp::UDiv, 32, Value::Int(1), Value::Int(0))
            .unwrap();
        b.emit_return().unwrap();
        let err = eval(&b.finish().unwrap(), &mut Vec::new(), None, None).unwrap_err();
        assert!(matches!(err, EvalError::Arithmetic(_)));
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: EvalConfig = serde_json::from_str(r#"{"max_steps": 10}"#).unwrap();
        assert_eq!(config.max_steps, Some(10));
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }
}
