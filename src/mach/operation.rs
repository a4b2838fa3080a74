use super::Val;
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## Operators
///
/// The evaluator and the virtual machine both call these so the two
/// execution modes share numeric semantics exactly.

pub struct Operation {}

impl Operation {
    fn finite(n: f64) -> Result<Val> {
        if n.is_finite() {
            Ok(Val::Number(n))
        } else {
            Err(error!(Overflow))
        }
    }

    fn integer(val: &Val) -> Result<i32> {
        let n = val.number()?.trunc();
        match i32::try_from(n as i64) {
            Ok(i) if (i as f64 - n).abs() < 1.0 => Ok(i),
            _ => Err(error!(Overflow)),
        }
    }

    pub fn negate(val: Val) -> Result<Val> {
        match val {
            Val::Number(n) => Ok(Val::Number(-n)),
            Val::String(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn power(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = (lhs.number()?, rhs.number()?);
        if l == 0.0 && r < 0.0 {
            return Err(error!(DivisionByZero));
        }
        Operation::finite(l.powf(r))
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::finite(lhs.number()? * rhs.number()?)
    }

    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = (lhs.number()?, rhs.number()?);
        if r == 0.0 {
            return Err(error!(DivisionByZero));
        }
        Operation::finite(l / r)
    }

    pub fn divide_int(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = (lhs.number()?.trunc(), rhs.number()?.trunc());
        if r == 0.0 {
            return Err(error!(DivisionByZero));
        }
        Operation::finite((l / r).trunc())
    }

    pub fn modulo(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = (lhs.number()?.trunc(), rhs.number()?.trunc());
        if r == 0.0 {
            return Err(error!(DivisionByZero));
        }
        Operation::finite(l % r)
    }

    pub fn sum(lhs: Val, rhs: Val) -> Result<Val> {
        match (lhs, rhs) {
            (Val::Number(l), Val::Number(r)) => Operation::finite(l + r),
            (Val::String(l), Val::String(r)) => {
                let mut s = String::with_capacity(l.len() + r.len());
                s.push_str(&l);
                s.push_str(&r);
                Ok(Val::String(s.into()))
            }
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::finite(lhs.number()? - rhs.number()?)
    }

    pub fn equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::equal_bool(&lhs, &rhs)?))
    }

    pub fn not_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(!Operation::equal_bool(&lhs, &rhs)?))
    }

    fn equal_bool(lhs: &Val, rhs: &Val) -> Result<bool> {
        match (lhs, rhs) {
            (Val::Number(l), Val::Number(r)) => Ok((l - r).abs() < std::f64::EPSILON),
            (Val::String(l), Val::String(r)) => Ok(l == r),
            _ => Err(error!(TypeMismatch)),
        }
    }

    fn less_bool(lhs: &Val, rhs: &Val) -> Result<bool> {
        match (lhs, rhs) {
            (Val::Number(l), Val::Number(r)) => Ok(l < r),
            (Val::String(l), Val::String(r)) => Ok(l < r),
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn less(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::less_bool(&lhs, &rhs)?))
    }

    pub fn greater(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::less_bool(&rhs, &lhs)?))
    }

    pub fn less_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(!Operation::less_bool(&rhs, &lhs)?))
    }

    pub fn greater_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(!Operation::less_bool(&lhs, &rhs)?))
    }

    pub fn not(val: Val) -> Result<Val> {
        Ok(Val::Number(!Operation::integer(&val)? as f64))
    }

    pub fn and(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Number(
            (Operation::integer(&lhs)? & Operation::integer(&rhs)?) as f64,
        ))
    }

    pub fn or(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Number(
            (Operation::integer(&lhs)? | Operation::integer(&rhs)?) as f64,
        ))
    }

    pub fn xor(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::Number(
            (Operation::integer(&lhs)? ^ Operation::integer(&rhs)?) as f64,
        ))
    }
}
