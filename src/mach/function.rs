use super::val::format_number;
use super::Val;
use crate::error;
use crate::lang::Error;
use std::ops::RangeInclusive;

type Result<T> = std::result::Result<T, Error>;

/// ## Built-in functions

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Abs,
    Asc,
    Chr,
    Cos,
    Int,
    Left,
    Len,
    Mid,
    Right,
    Sgn,
    Sin,
    Sqr,
    Str,
    Value,
}

impl Function {
    pub fn lookup(name: &str) -> Option<(Function, RangeInclusive<usize>)> {
        use Function::*;
        match name {
            "ABS" => Some((Abs, 1..=1)),
            "ASC" => Some((Asc, 1..=1)),
            "CHR$" => Some((Chr, 1..=1)),
            "COS" => Some((Cos, 1..=1)),
            "INT" => Some((Int, 1..=1)),
            "LEFT$" => Some((Left, 2..=2)),
            "LEN" => Some((Len, 1..=1)),
            "MID$" => Some((Mid, 2..=3)),
            "RIGHT$" => Some((Right, 2..=2)),
            "SGN" => Some((Sgn, 1..=1)),
            "SIN" => Some((Sin, 1..=1)),
            "SQR" => Some((Sqr, 1..=1)),
            "STR$" => Some((Str, 1..=1)),
            "VAL" => Some((Value, 1..=1)),
            _ => None,
        }
    }

    /// Resolves a call site: unknown names and bad arity are errors.
    pub fn resolve(name: &str, argc: usize) -> Result<Function> {
        match Function::lookup(name) {
            Some((function, arity)) if arity.contains(&argc) => Ok(function),
            Some(_) => Err(error!(IllegalFunctionCall; "WRONG NUMBER OF ARGUMENTS")),
            None => Err(error!(UndefinedUserFunction)),
        }
    }

    pub fn call(self, args: Vec<Val>) -> Result<Val> {
        use Function::*;
        let number = |i: usize| -> Result<f64> {
            match args.get(i) {
                Some(v) => v.number(),
                None => Err(error!(IllegalFunctionCall)),
            }
        };
        let string = |i: usize| -> Result<std::sync::Arc<str>> {
            match args.get(i) {
                Some(v) => v.string(),
                None => Err(error!(IllegalFunctionCall)),
            }
        };
        let count = |n: f64| -> Result<usize> {
            if n < 0.0 || n > 32767.0 {
                Err(error!(IllegalFunctionCall))
            } else {
                Ok(n as usize)
            }
        };
        Ok(match self {
            Abs => Val::Number(number(0)?.abs()),
            Asc => match string(0)?.chars().next() {
                Some(c) => Val::Number(c as u32 as f64),
                None => return Err(error!(IllegalFunctionCall)),
            },
            Chr => match std::char::from_u32(count(number(0)?)? as u32) {
                Some(c) => Val::String(c.to_string().into()),
                None => return Err(error!(IllegalFunctionCall)),
            },
            Cos => Val::Number(number(0)?.cos()),
            Int => Val::Number(number(0)?.floor()),
            Left => {
                let s = string(0)?;
                let n = count(number(1)?)?;
                Val::String(s.chars().take(n).collect::<String>().into())
            }
            Len => Val::Number(string(0)?.chars().count() as f64),
            Mid => {
                let s = string(0)?;
                let start = count(number(1)?)?;
                if start == 0 {
                    return Err(error!(IllegalFunctionCall));
                }
                let len = match args.get(2) {
                    Some(v) => count(v.number()?)?,
                    None => usize::max_value(),
                };
                Val::String(s.chars().skip(start - 1).take(len).collect::<String>().into())
            }
            Right => {
                let s = string(0)?;
                let n = count(number(1)?)?;
                let total = s.chars().count();
                Val::String(s.chars().skip(total.saturating_sub(n)).collect::<String>().into())
            }
            Sgn => {
                let n = number(0)?;
                Val::Number(if n > 0.0 {
                    1.0
                } else if n < 0.0 {
                    -1.0
                } else {
                    0.0
                })
            }
            Sin => Val::Number(number(0)?.sin()),
            Sqr => {
                let n = number(0)?;
                if n < 0.0 {
                    return Err(error!(IllegalFunctionCall));
                }
                Val::Number(n.sqrt())
            }
            Str => {
                let n = number(0)?;
                let sign = if n < 0.0 { "" } else { " " };
                Val::String(format!("{}{}", sign, format_number(n)).into())
            }
            Value => Val::Number(string(0)?.trim().parse::<f64>().unwrap_or(0.0)),
        })
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Function::*;
        let s = match self {
            Abs => "ABS",
            Asc => "ASC",
            Chr => "CHR$",
            Cos => "COS",
            Int => "INT",
            Left => "LEFT$",
            Len => "LEN",
            Mid => "MID$",
            Right => "RIGHT$",
            Sgn => "SGN",
            Sin => "SIN",
            Sqr => "SQR",
            Str => "STR$",
            Value => "VAL",
        };
        write!(f, "{}", s)
    }
}
