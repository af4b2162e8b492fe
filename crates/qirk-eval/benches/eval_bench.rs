//! Benchmarks for loading and evaluating QIR
//!
//! Run with: cargo bench -p qirk-eval

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qirk_eval::{GateLogger, QuantumOp, eval};
use qirk_ir::{ModuleBuilder, QubitId, ResultId};

/// GHZ state preparation with measurement feedback on every qubit.
fn ghz_ir(n: u64) -> String {
    let mut builder = ModuleBuilder::new("ghz", n as i64, n as i64).unwrap();
    builder.h(QubitId(0)).unwrap();
    for q in 1..n {
        builder.cx(QubitId(q - 1), QubitId(q)).unwrap();
    }
    for q in 0..n {
        builder.mz(QubitId(q), ResultId(q)).unwrap();
        builder
            .if_result(ResultId(q), |b| b.x(QubitId(q)).map(|_| ()), |_| Ok(()))
            .unwrap();
    }
    builder.emit_return().unwrap();
    builder.ir().unwrap()
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for n in &[10u64, 100, 1000] {
        let ir = ghz_ir(*n);
        group.bench_with_input(BenchmarkId::new("ghz", n), &ir, |b, ir| {
            b.iter(|| qirk_llvm::load(black_box(ir)).unwrap());
        });
    }

    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");

    for n in &[10u64, 100, 1000] {
        let module = qirk_llvm::load(&ghz_ir(*n)).unwrap();
        let stream: Vec<bool> = (0..*n).map(|i| i % 2 == 0).collect();

        group.bench_with_input(BenchmarkId::new("trace", n), &module, |b, module| {
            b.iter(|| {
                let mut trace: Vec<QuantumOp> = Vec::new();
                eval(black_box(module), &mut trace, None, Some(&stream)).unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("logger", n), &module, |b, module| {
            b.iter(|| {
                let mut logger = GateLogger::new();
                eval(black_box(module), &mut logger, None, Some(&stream)).unwrap();
                logger
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_eval);
criterion_main!(benches);
