// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Operator semantics.
//!
//! Integers stay integers under arithmetic (wrapping on overflow) until a
//! float joins in; booleans count as 0 and 1. `+` concatenates as soon as
//! one side is a string.

use std::cmp::Ordering;

use crate::bytecode::Opcode;
use crate::error::ExecutionFault;
use crate::runtime::Value;

/// An operator failure, located by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpFault {
    Type {
        expected: &'static str,
        found: &'static str,
    },
    DivisionByZero,
}

impl OpFault {
    pub(crate) fn at(self, offset: u32) -> ExecutionFault {
        match self {
            OpFault::Type { expected, found } => ExecutionFault::TypeMismatch {
                offset,
                expected,
                found,
            },
            OpFault::DivisionByZero => ExecutionFault::DivisionByZero { offset },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i32),
    Float(f64),
}

fn number(v: &Value) -> Result<Number, OpFault> {
    match v {
        Value::Int(n) => Ok(Number::Int(*n)),
        Value::Boolean(b) => Ok(Number::Int(i32::from(*b))),
        Value::Float(f) => Ok(Number::Float(*f)),
        other => Err(OpFault::Type {
            expected: "number",
            found: other.type_name(),
        }),
    }
}

fn integer(v: &Value) -> Result<i32, OpFault> {
    v.as_i32().ok_or(OpFault::Type {
        expected: "int",
        found: v.type_name(),
    })
}

/// Condition value of `v`.
pub(crate) fn truthy(v: &Value, loose: bool) -> Result<bool, OpFault> {
    match v {
        Value::Boolean(b) => Ok(*b),
        other if loose => Ok(other.to_boolean()),
        other => Err(OpFault::Type {
            expected: "boolean",
            found: other.type_name(),
        }),
    }
}

/// `add` through `mod`.
pub(crate) fn arithmetic(op: Opcode, a: &Value, b: &Value) -> Result<Value, OpFault> {
    if op == Opcode::Add {
        if let Some(joined) = concat(a, b) {
            return Ok(Value::String(joined));
        }
    }

    match (number(a)?, number(b)?) {
        (Number::Int(x), Number::Int(y)) => {
            let n = match op {
                Opcode::Add => x.wrapping_add(y),
                Opcode::Sub => x.wrapping_sub(y),
                Opcode::Mul => x.wrapping_mul(y),
                Opcode::Div if y == 0 => return Err(OpFault::DivisionByZero),
                Opcode::Div => x.wrapping_div(y),
                Opcode::Mod if y == 0 => return Err(OpFault::DivisionByZero),
                _ => x.wrapping_rem(y),
            };
            Ok(Value::Int(n))
        }
        (x, y) => {
            let (x, y) = (as_float(x), as_float(y));
            let n = match op {
                Opcode::Add => x + y,
                Opcode::Sub => x - y,
                Opcode::Mul => x * y,
                Opcode::Div => x / y,
                _ => x % y,
            };
            Ok(Value::Float(n))
        }
    }
}

fn as_float(n: Number) -> f64 {
    match n {
        Number::Int(i) => f64::from(i),
        Number::Float(f) => f,
    }
}

fn concat(a: &Value, b: &Value) -> Option<String> {
    let printable = |v: &Value| matches!(v, Value::String(_)) || v.is_numeric();
    let any_string = matches!(a, Value::String(_)) || matches!(b, Value::String(_));
    (any_string && printable(a) && printable(b)).then(|| format!("{a}{b}"))
}

/// `and`, `or`, `shl` and `shr`.
pub(crate) fn bitwise(op: Opcode, a: &Value, b: &Value) -> Result<Value, OpFault> {
    let (x, y) = (integer(a)?, integer(b)?);
    let n = match op {
        Opcode::BitAnd => x & y,
        Opcode::BitOr => x | y,
        Opcode::Shl => x.wrapping_shl(y as u32),
        _ => x.wrapping_shr(y as u32),
    };
    Ok(Value::Int(n))
}

/// `eq` through `le`.
pub(crate) fn compare(op: Opcode, a: &Value, b: &Value) -> Result<bool, OpFault> {
    let ordering = match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (x, y) if x.is_numeric() && y.is_numeric() => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y)
        }
        _ => {
            return match op {
                Opcode::Eq => Ok(identical(a, b)),
                Opcode::Ne => Ok(!identical(a, b)),
                _ => Err(OpFault::Type {
                    expected: "number",
                    found: if a.is_numeric() || matches!(a, Value::String(_)) {
                        b.type_name()
                    } else {
                        a.type_name()
                    },
                }),
            };
        }
    };

    // Unordered (NaN) compares false except for `ne`.
    let Some(ordering) = ordering else {
        return Ok(op == Opcode::Ne);
    };
    Ok(match op {
        Opcode::Eq => ordering == Ordering::Equal,
        Opcode::Ne => ordering != Ordering::Equal,
        Opcode::Gt => ordering == Ordering::Greater,
        Opcode::Ge => ordering != Ordering::Less,
        Opcode::Lt => ordering == Ordering::Less,
        _ => ordering != Ordering::Greater,
    })
}

/// Equality across kinds: handles by identity, null against null or zero.
fn identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => x == y,
        (x, y) if x.is_nullish() && y.is_nullish() => true,
        (x, n) | (n, x) if x.is_nullish() && n.is_numeric() => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Increment or decrement.
pub(crate) fn step(v: &Value, delta: i32) -> Result<Value, OpFault> {
    match number(v)? {
        Number::Int(n) => Ok(Value::Int(n.wrapping_add(delta))),
        Number::Float(f) => Ok(Value::Float(f + f64::from(delta))),
    }
}

/// Arithmetic negation.
pub(crate) fn negate(v: &Value) -> Result<Value, OpFault> {
    match number(v)? {
        Number::Int(n) => Ok(Value::Int(n.wrapping_neg())),
        Number::Float(f) => Ok(Value::Float(-f)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ObjectRef;

    #[test]
    fn test_integer_arithmetic_stays_integral() {
        assert_eq!(
            arithmetic(Opcode::Div, &Value::Int(7), &Value::Int(2)),
            Ok(Value::Int(3))
        );
        assert_eq!(
            arithmetic(Opcode::Add, &Value::Int(i32::MAX), &Value::Int(1)),
            Ok(Value::Int(i32::MIN))
        );
        assert_eq!(
            arithmetic(Opcode::Mod, &Value::Int(-7), &Value::Int(3)),
            Ok(Value::Int(-1))
        );
    }

    #[test]
    fn test_float_promotion() {
        assert_eq!(
            arithmetic(Opcode::Mul, &Value::Int(3), &Value::Float(0.5)),
            Ok(Value::Float(1.5))
        );
        assert_eq!(
            arithmetic(Opcode::Div, &Value::Float(1.0), &Value::Int(0)),
            Ok(Value::Float(f64::INFINITY))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            arithmetic(Opcode::Div, &Value::Int(1), &Value::Int(0)),
            Err(OpFault::DivisionByZero)
        );
        assert_eq!(
            arithmetic(Opcode::Mod, &Value::Boolean(true), &Value::Boolean(false)),
            Err(OpFault::DivisionByZero)
        );
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            arithmetic(Opcode::Add, &Value::from("track "), &Value::Int(4)),
            Ok(Value::from("track 4"))
        );
        assert!(matches!(
            arithmetic(Opcode::Sub, &Value::from("a"), &Value::from("b")),
            Err(OpFault::Type { expected: "number", found: "string" })
        ));
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(Opcode::Lt, &Value::Int(1), &Value::Float(1.5)), Ok(true));
        assert_eq!(compare(Opcode::Ge, &Value::from("b"), &Value::from("a")), Ok(true));
        assert_eq!(compare(Opcode::Eq, &Value::Boolean(true), &Value::Int(1)), Ok(true));
        assert_eq!(
            compare(Opcode::Eq, &Value::Float(f64::NAN), &Value::Float(f64::NAN)),
            Ok(false)
        );
        assert_eq!(
            compare(Opcode::Ne, &Value::Float(f64::NAN), &Value::Float(f64::NAN)),
            Ok(true)
        );
    }

    #[test]
    fn test_handle_equality() {
        let a = Value::Object(ObjectRef::new(1, 0));
        let b = Value::Object(ObjectRef::new(1, 1));
        assert_eq!(compare(Opcode::Eq, &a, &a.clone()), Ok(true));
        assert_eq!(compare(Opcode::Eq, &a, &b), Ok(false));
        assert_eq!(compare(Opcode::Ne, &a, &Value::Null), Ok(true));
        assert_eq!(compare(Opcode::Eq, &Value::Null, &Value::Int(0)), Ok(true));
        assert_eq!(compare(Opcode::Eq, &Value::from("0"), &Value::Int(0)), Ok(false));
        assert!(compare(Opcode::Gt, &a, &Value::Int(0)).is_err());
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(truthy(&Value::Int(2), true), Ok(true));
        assert_eq!(truthy(&Value::from(""), true), Ok(false));
        assert_eq!(truthy(&Value::Boolean(true), false), Ok(true));
        assert_eq!(
            truthy(&Value::Int(1), false),
            Err(OpFault::Type { expected: "boolean", found: "int" })
        );
    }

    #[test]
    fn test_bitwise_and_unary() {
        assert_eq!(
            bitwise(Opcode::Shl, &Value::Int(1), &Value::Int(4)),
            Ok(Value::Int(16))
        );
        assert_eq!(
            bitwise(Opcode::Shr, &Value::Int(-16), &Value::Int(2)),
            Ok(Value::Int(-4))
        );
        assert_eq!(
            bitwise(Opcode::BitOr, &Value::Int(5), &Value::Float(2.9)),
            Ok(Value::Int(7))
        );
        assert_eq!(negate(&Value::Float(2.5)), Ok(Value::Float(-2.5)));
        assert_eq!(step(&Value::Boolean(true), 1), Ok(Value::Int(2)));
        assert!(negate(&Value::Null).is_err());
    }
}
