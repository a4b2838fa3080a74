use super::{Address, Function};
use crate::lang::LineNumber;
use std::sync::Arc;

/// ## Virtual machine instruction set
///
/// The BASIC virtual machine has no registers.
/// Every operation is performed on the stack.
///
/// For example: `LET A=3*B` compiles to `[Literal(0), Push(B), Mul, Pop(A)]`
/// with the number 3 stored at index 0 of the constant pool.
///
/// See <https://en.wikipedia.org/wiki/Reverse_Polish_notation>

#[derive(Clone, PartialEq)]
pub enum Opcode {
    // *** Stack manipulation
    /// Push a value from the constant pool.
    Literal(usize),
    /// Push the value of a named variable.
    Push(Arc<str>),
    /// Pop the stack into a named variable. This is the `LET` statement
    /// and may generate errors.
    Pop(Arc<str>),

    // *** Branch control
    /// Unconditional branch to Address.
    Jump(Address),
    /// Pop stack and branch to Address if true.
    If(Address),
    /// Pop stack and branch to Address if false.
    IfNot(Address),
    /// Branch to the first instruction of a line. Backward jumps abandon
    /// the loops they skip.
    Goto(LineNumber, Address),
    /// Push the start of the next line as a return point and branch.
    Gosub(Address),
    /// Branch to the most recent return point or else error: RETURN WITHOUT GOSUB.
    Return,
    /// Pop step, end, start; bind the variable and open a loop that
    /// resumes after this instruction. When the loop is skipped, branch
    /// to the Address following its NEXT.
    For {
        var: Arc<str>,
        skip: Option<Address>,
    },
    /// Step a loop. Branches back into the body while the loop continues.
    Next(Option<Arc<str>>),

    // *** Statements
    /// Hand the statement text in the constant pool to the executor.
    Exec(usize),
    End,

    // *** Expression operations
    Neg,
    Not,
    Pow,
    Mul,
    Div,
    DivInt,
    Mod,
    Add,
    Sub,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Xor,

    // *** Built-in functions
    /// Pop the arguments and push the result.
    Fn(Function, usize),
}

impl std::fmt::Debug for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        match self {
            Literal(c) => write!(f, "LITERAL({})", c),
            Push(s) => write!(f, "PUSH({})", s),
            Pop(s) => write!(f, "POP({})", s),

            Jump(a) => write!(f, "JUMP({})", a),
            If(a) => write!(f, "IF({})", a),
            IfNot(a) => write!(f, "IFNOT({})", a),
            Goto(ln, a) => write!(f, "GOTO({} @{})", ln, a),
            Gosub(a) => write!(f, "GOSUB({})", a),
            Return => write!(f, "RETURN"),
            For { var, skip } => match skip {
                Some(a) => write!(f, "FOR({}, {})", var, a),
                None => write!(f, "FOR({})", var),
            },
            Next(var) => match var {
                Some(var) => write!(f, "NEXT({})", var),
                None => write!(f, "NEXT"),
            },

            Exec(c) => write!(f, "EXEC({})", c),
            End => write!(f, "END"),

            Neg => write!(f, "NEG"),
            Not => write!(f, "NOT"),
            Pow => write!(f, "POW"),
            Mul => write!(f, "MUL"),
            Div => write!(f, "DIV"),
            DivInt => write!(f, "DIVINT"),
            Mod => write!(f, "MOD"),
            Add => write!(f, "ADD"),
            Sub => write!(f, "SUB"),
            Eq => write!(f, "EQ"),
            NotEq => write!(f, "NOTEQ"),
            Lt => write!(f, "LT"),
            LtEq => write!(f, "LTEQ"),
            Gt => write!(f, "GT"),
            GtEq => write!(f, "GTEQ"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
            Xor => write!(f, "XOR"),

            Fn(func, argc) => write!(f, "{}({})", func, argc),
        }
    }
}
