use super::LineNumber;
use std::sync::Arc;

/// One sub-statement of a line.
///
/// Lines are flattened when parsed: THEN and ELSE clauses always run to
/// the end of the line, so an `If` only needs to know where its ELSE
/// clause starts and an `Else` marker only needs to leave the line.
/// Every statement therefore has a stable index inside its line.
#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Let(Arc<str>, Expression),
    For {
        var: Arc<str>,
        from: Expression,
        to: Expression,
        step: Option<Expression>,
    },
    Next(Vec<Arc<str>>),
    Goto(LineNumber),
    Gosub(LineNumber),
    Return,
    If {
        cond: Expression,
        else_index: usize,
    },
    Else,
    End,
    Other(Arc<str>),
}

impl Statement {
    /// Command name used in error context.
    pub fn command(&self) -> &'static str {
        use Statement::*;
        match self {
            Let(..) => "LET",
            For { .. } => "FOR",
            Next(_) => "NEXT",
            Goto(_) => "GOTO",
            Gosub(_) => "GOSUB",
            Return => "RETURN",
            If { .. } => "IF",
            Else => "ELSE",
            End => "END",
            Other(text) => other_command(text),
        }
    }
}

/// Statements commonly handed to the executor. Anything else reports no
/// command name.
const OTHER_COMMANDS: &[&str] = &[
    "CLS", "DATA", "DEF", "DIM", "ERASE", "INPUT", "LINE", "LPRINT", "ON", "POKE", "PRINT",
    "RANDOMIZE", "READ", "RESTORE", "STOP", "SWAP", "WEND", "WHILE", "WRITE",
];

fn other_command(text: &str) -> &'static str {
    if text.starts_with('?') {
        return "PRINT";
    }
    let word: String = text
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    OTHER_COMMANDS
        .iter()
        .find(|name| **name == word)
        .copied()
        .unwrap_or("")
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Number(f64),
    String(Arc<str>),
    Var(Arc<str>),
    Function(Arc<str>, Vec<Expression>),
    Negation(Box<Expression>),
    Not(Box<Expression>),
    Power(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    DivideInt(Box<Expression>, Box<Expression>),
    Modulo(Box<Expression>, Box<Expression>),
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    Less(Box<Expression>, Box<Expression>),
    LessEqual(Box<Expression>, Box<Expression>),
    Greater(Box<Expression>, Box<Expression>),
    GreaterEqual(Box<Expression>, Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Xor(Box<Expression>, Box<Expression>),
}
