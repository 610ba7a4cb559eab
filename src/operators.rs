// Operator semantics for the dynamically-typed values.

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::RuntimeError;
use crate::value::Value;

pub fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    use Value::{Boolean, Null, Number};

    match (op, left, right) {
        (BinaryOp::Add, Number(l), Number(r)) => Ok(Number(l + r)),
        // Concatenation needs exactly one string operand.
        (BinaryOp::Add, Value::String(l), r) if !matches!(r, Value::String(_)) => {
            Ok(Value::String(format!("{l}{r}")))
        }
        (BinaryOp::Add, l, Value::String(r)) if !matches!(l, Value::String(_)) => {
            Ok(Value::String(format!("{l}{r}")))
        }
        (BinaryOp::Sub, Number(l), Number(r)) => Ok(Number(l - r)),
        (BinaryOp::Mul, Number(l), Number(r)) => Ok(Number(l * r)),
        (BinaryOp::Mul, Number(count), Value::String(s))
        | (BinaryOp::Mul, Value::String(s), Number(count)) => repeat(&s, count),
        (BinaryOp::Div, Number(l), Number(r)) => Ok(Number(l / r)),
        (BinaryOp::Gt, Number(l), Number(r)) => Ok(Boolean(l > r)),
        (BinaryOp::Gte, Number(l), Number(r)) => Ok(Boolean(l >= r)),
        (BinaryOp::Lt, Number(l), Number(r)) => Ok(Boolean(l < r)),
        (BinaryOp::Lte, Number(l), Number(r)) => Ok(Boolean(l <= r)),
        (BinaryOp::EqEq, Null, Null) => Ok(Boolean(true)),
        // NaN == NaN holds here, unlike IEEE-754.
        (BinaryOp::EqEq, Number(l), Number(r)) => Ok(Boolean(l == r || (l.is_nan() && r.is_nan()))),
        (BinaryOp::NotEq, Number(l), Number(r)) => Ok(Boolean(l != r)),
        (operation, l, r) => Err(RuntimeError::TypeMismatch {
            operation,
            left: l.type_name(),
            right: r.type_name(),
        }),
    }
}

// Upper bound on the byte length of a repeated string.
const MAX_REPEAT_BYTES: usize = 1 << 30;

fn repeat(s: &str, count: f64) -> Result<Value, RuntimeError> {
    if count.is_nan() {
        return Ok(Value::String(String::new()));
    }
    let times = count.trunc();
    if times < 0.0 || times.is_infinite() {
        return Err(RuntimeError::InvalidRepeatCount { count });
    }
    // `as` saturates, so counts past usize::MAX still fail the length check.
    let times = times as usize;
    match s.len().checked_mul(times) {
        Some(bytes) if bytes <= MAX_REPEAT_BYTES => Ok(Value::String(s.repeat(times))),
        _ => Err(RuntimeError::InvalidRepeatCount { count }),
    }
}

pub fn unary(op: UnaryOp, operand: Value) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Boolean(!value.is_truthy())),
        (UnaryOp::Plus | UnaryOp::Minus, Value::Null) => Ok(Value::Null),
        (UnaryOp::Plus, Value::Number(n)) => Ok(Value::Number(n)),
        (UnaryOp::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Plus, Value::Boolean(b)) => Ok(Value::Number(f64::from(u8::from(b)))),
        (UnaryOp::Minus, Value::Boolean(b)) => Ok(Value::Number(-f64::from(u8::from(b)))),
        (operation, operand @ Value::String(_)) => Err(RuntimeError::InvalidOperand {
            operation,
            operand: operand.type_name(),
        }),
    }
}
