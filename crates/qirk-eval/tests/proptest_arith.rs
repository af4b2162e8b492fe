//! Property-based tests for classical instruction semantics.
//!
//! Evaluated 32-bit arithmetic and comparisons must agree with Rust's own
//! `i32`/`u32` operators.

use proptest::prelude::*;
use qirk_eval::{OutputRecord, eval};
use qirk_ir::{BinaryOp, CastOp, IntPredicate, Module, ModuleBuilder, Value, emit};

fn arb_binary_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Add),
        Just(BinaryOp::Sub),
        Just(BinaryOp::Mul),
        Just(BinaryOp::And),
        Just(BinaryOp::Or),
        Just(BinaryOp::Xor),
        Just(BinaryOp::SDiv),
        Just(BinaryOp::SRem),
    ]
}

fn arb_predicate() -> impl Strategy<Value = IntPredicate> {
    proptest::sample::select(IntPredicate::ALL.to_vec())
}

fn expected_binary(op: BinaryOp, a: i32, b: i32) -> i32 {
    match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::SDiv => a / b,
        BinaryOp::SRem => a % b,
        other => panic!("not generated: {other:?}"),
    }
}

fn expected_compare(predicate: IntPredicate, a: i32, b: i32) -> bool {
    let (ua, ub) = (a as u32, b as u32);
    match predicate {
        IntPredicate::Eq => a == b,
        IntPredicate::Ne => a != b,
        IntPredicate::Ugt => ua > ub,
        IntPredicate::Uge => ua >= ub,
        IntPredicate::Ult => ua < ub,
        IntPredicate::Ule => ua <= ub,
        IntPredicate::Sgt => a > b,
        IntPredicate::Sge => a >= b,
        IntPredicate::Slt => a < b,
        IntPredicate::Sle => a <= b,
    }
}

fn only_output(module: &Module) -> OutputRecord {
    let metadata = eval(module, &mut Vec::new(), None, None).unwrap();
    assert_eq!(metadata.output.len(), 1);
    metadata.output[0].clone()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn binary_matches_i32(op in arb_binary_op(), a in any::<i32>(), b in any::<i32>()) {
        if matches!(op, BinaryOp::SDiv | BinaryOp::SRem) {
            prop_assume!(b != 0);
            prop_assume!(!(a == i32::MIN && b == -1));
        }

        let mut builder = ModuleBuilder::new("arith", 0, 0).unwrap();
        let value = builder
            .binary(op, 32, Value::Int(i64::from(a)), Value::Int(i64::from(b)))
            .unwrap();
        let wide = builder.cast(CastOp::SExt, 32, value, 64).unwrap();
        builder.int_record_output(wide, None).unwrap();
        builder.emit_return().unwrap();

        let record = only_output(&builder.finish().unwrap());
        prop_assert_eq!(
            record,
            OutputRecord::Int { value: i64::from(expected_binary(op, a, b)), label: None }
        );
    }

    #[test]
    fn compare_matches_i32(predicate in arb_predicate(), a in any::<i32>(), b in any::<i32>()) {
        let mut builder = ModuleBuilder::new("compare", 0, 0).unwrap();
        let cmp = builder
            .icmp(predicate, 32, Value::Int(i64::from(a)), Value::Int(i64::from(b)))
            .unwrap();
        builder.bool_record_output(cmp, Some("cmp")).unwrap();
        builder.emit_return().unwrap();

        // Through text, so the loader's reading of negative constants is covered.
        let module = qirk_llvm::load(&emit(&builder.finish().unwrap())).unwrap();
        let record = only_output(&module);
        prop_assert_eq!(
            record,
            OutputRecord::Bool {
                value: expected_compare(predicate, a, b),
                label: Some("cmp".into())
            }
        );
    }

    #[test]
    fn zext_then_trunc_is_identity(a in any::<u8>()) {
        let mut builder = ModuleBuilder::new("casts", 0, 0).unwrap();
        let wide = builder.cast(CastOp::ZExt, 8, Value::Int(i64::from(a)), 32).unwrap();
        let narrow = builder.cast(CastOp::Trunc, 32, wide, 8).unwrap();
        let back = builder.cast(CastOp::ZExt, 8, narrow, 64).unwrap();
        builder.int_record_output(back, None).unwrap();
        builder.emit_return().unwrap();

        let record = only_output(&builder.finish().unwrap());
        prop_assert_eq!(record, OutputRecord::Int { value: i64::from(a), label: None });
    }
}
