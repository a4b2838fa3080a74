//! Tree-walking expression evaluation for the line interpreter.
//!
//! The virtual machine reaches the same results through [`Operation`],
//! so both execution modes agree on every operator.

use super::{Function, Operation, Val, Var};
use crate::lang::ast::Expression;
use crate::lang::{parse_expression, Error};

type Result<T> = std::result::Result<T, Error>;

pub fn evaluate(expr: &Expression, vars: &Var) -> Result<Val> {
    let binary = |op: fn(Val, Val) -> Result<Val>, lhs: &Expression, rhs: &Expression| {
        let lhs = evaluate(lhs, vars)?;
        let rhs = evaluate(rhs, vars)?;
        op(lhs, rhs)
    };
    match expr {
        Expression::Number(n) => Ok(Val::Number(*n)),
        Expression::String(s) => Ok(Val::String(s.clone())),
        Expression::Var(name) => vars.fetch(name),
        Expression::Function(name, args) => {
            let function = Function::resolve(name, args.len())?;
            let args = args
                .iter()
                .map(|arg| evaluate(arg, vars))
                .collect::<Result<Vec<Val>>>()?;
            function.call(args)
        }
        Expression::Negation(expr) => Operation::negate(evaluate(expr, vars)?),
        Expression::Not(expr) => Operation::not(evaluate(expr, vars)?),
        Expression::Power(l, r) => binary(Operation::power, l, r),
        Expression::Multiply(l, r) => binary(Operation::multiply, l, r),
        Expression::Divide(l, r) => binary(Operation::divide, l, r),
        Expression::DivideInt(l, r) => binary(Operation::divide_int, l, r),
        Expression::Modulo(l, r) => binary(Operation::modulo, l, r),
        Expression::Add(l, r) => binary(Operation::sum, l, r),
        Expression::Subtract(l, r) => binary(Operation::subtract, l, r),
        Expression::Equal(l, r) => binary(Operation::equal, l, r),
        Expression::NotEqual(l, r) => binary(Operation::not_equal, l, r),
        Expression::Less(l, r) => binary(Operation::less, l, r),
        Expression::LessEqual(l, r) => binary(Operation::less_equal, l, r),
        Expression::Greater(l, r) => binary(Operation::greater, l, r),
        Expression::GreaterEqual(l, r) => binary(Operation::greater_equal, l, r),
        Expression::And(l, r) => binary(Operation::and, l, r),
        Expression::Or(l, r) => binary(Operation::or, l, r),
        Expression::Xor(l, r) => binary(Operation::xor, l, r),
    }
}

/// Truth of an IF condition. A top-level AND/OR chain short-circuits on
/// the truthiness of each side; anything else is evaluated whole.
pub fn truth(expr: &Expression, vars: &Var) -> Result<bool> {
    match expr {
        Expression::And(lhs, rhs) => Ok(truth(lhs, vars)? && truth(rhs, vars)?),
        Expression::Or(lhs, rhs) => Ok(truth(lhs, vars)? || truth(rhs, vars)?),
        _ => Ok(evaluate(expr, vars)?.truth()),
    }
}

pub fn evaluate_str(source: &str, vars: &Var) -> Result<Val> {
    evaluate(&parse_expression(source)?, vars)
}
