use crate::error;
use crate::lang::Error;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// ## Runtime value
///
/// Shared by the interpreter, the evaluator and the virtual machine.
/// Booleans follow BASIC convention: false is 0 and true is -1.
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Number(f64),
    String(Arc<str>),
}

impl Val {
    pub const TRUE: Val = Val::Number(-1.0);
    pub const FALSE: Val = Val::Number(0.0);

    pub fn from_bool(b: bool) -> Val {
        if b {
            Val::TRUE
        } else {
            Val::FALSE
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Val::Number(_))
    }

    /// Numbers are true when non-zero, strings when non-empty.
    pub fn truth(&self) -> bool {
        match self {
            Val::Number(n) => *n != 0.0,
            Val::String(s) => !s.is_empty(),
        }
    }

    pub fn number(&self) -> Result<f64> {
        match self {
            Val::Number(n) => Ok(*n),
            Val::String(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn string(&self) -> Result<Arc<str>> {
        match self {
            Val::String(s) => Ok(s.clone()),
            Val::Number(_) => Err(error!(TypeMismatch)),
        }
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Val {
        Val::Number(n)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Val {
        Val::String(s.into())
    }
}

/// Numbers print the classic way: a sign column and a trailing space.
impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::String(s) => write!(f, "{}", s),
            Val::Number(n) => {
                let sign = if n.is_sign_negative() && *n != 0.0 {
                    ""
                } else {
                    " "
                };
                write!(f, "{}{} ", sign, format_number(*n))
            }
        }
    }
}

/// Shortest text for a number, without the sign column.
pub fn format_number(n: f64) -> String {
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Val::Number(0.0).truth());
        assert!(Val::Number(-1.0).truth());
        assert!(!Val::from("").truth());
        assert!(Val::from("x").truth());
    }

    #[test]
    fn test_display() {
        assert_eq!(Val::Number(1.0).to_string(), " 1 ");
        assert_eq!(Val::Number(-2.5).to_string(), "-2.5 ");
        assert_eq!(Val::from("HI").to_string(), "HI");
    }
}
