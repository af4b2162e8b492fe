//! Fixed-width two's-complement integer arithmetic.
//!
//! Values are carried as `u64` bit patterns masked to their width.

use qirk_ir::{BinaryOp, CastOp, IntPredicate};

use crate::error::{EvalError, EvalResult};

/// Check that a width is executable.
pub fn check_width(width: u32) -> EvalResult<()> {
    if (1..=64).contains(&width) {
        Ok(())
    } else {
        Err(EvalError::TypeMismatch(format!(
            "integer width i{width} is not supported"
        )))
    }
}

/// All-ones mask for `width` bits.
pub fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Bit pattern of `value` truncated to `width` bits.
pub fn truncate(value: i64, width: u32) -> u64 {
    value as u64 & mask(width)
}

/// Signed interpretation of a `width`-bit pattern.
pub fn sign_extend(bits: u64, width: u32) -> i64 {
    if width >= 64 {
        bits as i64
    } else {
        let shift = 64 - width;
        ((bits << shift) as i64) >> shift
    }
}

/// Apply a binary operator at `width` bits.
pub fn binary(op: BinaryOp, width: u32, lhs: u64, rhs: u64) -> EvalResult<u64> {
    check_width(width)?;
    let m = mask(width);
    let (a, b) = (lhs & m, rhs & m);
    let (sa, sb) = (sign_extend(a, width), sign_extend(b, width));

    let value = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Shl => a << shift_amount(op, width, b)?,
        BinaryOp::LShr => a >> shift_amount(op, width, b)?,
        BinaryOp::AShr => (sa >> shift_amount(op, width, b)?) as u64,
        BinaryOp::UDiv => {
            nonzero(op, b)?;
            a / b
        }
        BinaryOp::URem => {
            nonzero(op, b)?;
            a % b
        }
        BinaryOp::SDiv => {
            nonzero(op, b)?;
            if sa == sign_extend(1u64 << (width - 1), width) && sb == -1 {
                return Err(EvalError::Arithmetic(format!(
                    "sdiv overflow: {sa} / -1 at i{width}"
                )));
            }
            sa.wrapping_div(sb) as u64
        }
        BinaryOp::SRem => {
            nonzero(op, b)?;
            sa.wrapping_rem(sb) as u64
        }
    };
    Ok(value & m)
}

fn shift_amount(op: BinaryOp, width: u32, amount: u64) -> EvalResult<u32> {
    if amount >= u64::from(width) {
        return Err(EvalError::Arithmetic(format!(
            "{} by {amount} at i{width}",
            op.mnemonic()
        )));
    }
    Ok(amount as u32)
}

fn nonzero(op: BinaryOp, divisor: u64) -> EvalResult<()> {
    if divisor == 0 {
        Err(EvalError::Arithmetic(format!(
            "{} division by zero",
            op.mnemonic()
        )))
    } else {
        Ok(())
    }
}

/// Evaluate an integer comparison at `width` bits.
pub fn compare(predicate: IntPredicate, width: u32, lhs: u64, rhs: u64) -> bool {
    let m = mask(width);
    let (a, b) = (lhs & m, rhs & m);
    let (sa, sb) = (sign_extend(a, width), sign_extend(b, width));
    match predicate {
        IntPredicate::Eq => a == b,
        IntPredicate::Ne => a != b,
        IntPredicate::Ugt => a > b,
        IntPredicate::Uge => a >= b,
        IntPredicate::Ult => a < b,
        IntPredicate::Ule => a <= b,
        IntPredicate::Sgt => sa > sb,
        IntPredicate::Sge => sa >= sb,
        IntPredicate::Slt => sa < sb,
        IntPredicate::Sle => sa <= sb,
    }
}

/// Convert between widths.
pub fn cast(op: CastOp, from: u32, value: u64, to: u32) -> EvalResult<u64> {
    check_width(from)?;
    check_width(to)?;
    let bits = value & mask(from);
    Ok(match op {
        CastOp::ZExt => bits,
        CastOp::SExt => truncate(sign_extend(bits, from), to),
        CastOp::Trunc => bits & mask(to),
    })
}
