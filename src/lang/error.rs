use super::LineNumber;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    kind: ErrorKind,
    line_number: Option<LineNumber>,
    command: &'static str,
    message: &'static str,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

/// Broad classification used by callers to decide how to report an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed statement. Never retried.
    Syntax,
    /// Terminates the current run.
    Runtime,
    /// A depth limit or the FOR/NEXT deadlock guard tripped.
    ResourceLimit,
    /// The bytecode compiler refused the program. Cached state is untouched.
    Compile,
    /// The run was cancelled through its token.
    Cancelled,
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            kind: code.kind(),
            line_number: None,
            command: "",
            message: "",
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn line_number(&self) -> Option<LineNumber> {
        self.line_number
    }

    pub fn command(&self) -> &'static str {
        self.command
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }

    pub fn in_line_number(&self, line: LineNumber) -> Error {
        debug_assert!(self.line_number.is_none());
        Error {
            line_number: Some(line),
            ..self.clone()
        }
    }

    /// Attaches a line number unless one is already present.
    pub fn or_line_number(self, line: LineNumber) -> Error {
        if self.line_number.is_some() || line == 0 {
            self
        } else {
            Error {
                line_number: Some(line),
                ..self
            }
        }
    }

    pub fn in_command(self, command: &'static str) -> Error {
        if !self.command.is_empty() {
            return self;
        }
        Error { command, ..self }
    }

    pub fn message(&self, message: &'static str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            message,
            ..self.clone()
        }
    }

    /// Re-tags an error raised while generating bytecode.
    pub fn compiling(self) -> Error {
        Error {
            kind: ErrorKind::Compile,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NextWithoutFor = 1,
    SyntaxError = 2,
    ReturnWithoutGosub = 3,
    IllegalFunctionCall = 5,
    Overflow = 6,
    OutOfMemory = 7,
    UndefinedLine = 8,
    DivisionByZero = 11,
    TypeMismatch = 13,
    StringTooLong = 15,
    UndefinedUserFunction = 18,
    LineBufferOverflow = 23,
    ForWithoutNext = 26,
    InternalError = 51,
    DirectStatementInFile = 66,
    UndefinedVariable = 69,
    ForNextDeadlock = 70,
    Break = 71,
}

impl ErrorCode {
    pub fn kind(self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            SyntaxError | DirectStatementInFile | LineBufferOverflow => ErrorKind::Syntax,
            OutOfMemory | ForNextDeadlock => ErrorKind::ResourceLimit,
            Break => ErrorKind::Cancelled,
            _ => ErrorKind::Runtime,
        }
    }

    fn as_str(self) -> &'static str {
        use ErrorCode::*;
        match self {
            NextWithoutFor => "NEXT WITHOUT FOR",
            SyntaxError => "SYNTAX ERROR",
            ReturnWithoutGosub => "RETURN WITHOUT GOSUB",
            IllegalFunctionCall => "ILLEGAL FUNCTION CALL",
            Overflow => "OVERFLOW",
            OutOfMemory => "OUT OF MEMORY",
            UndefinedLine => "UNDEFINED LINE",
            DivisionByZero => "DIVISION BY ZERO",
            TypeMismatch => "TYPE MISMATCH",
            StringTooLong => "STRING TOO LONG",
            UndefinedUserFunction => "UNDEFINED USER FUNCTION",
            LineBufferOverflow => "LINE BUFFER OVERFLOW",
            ForWithoutNext => "FOR WITHOUT NEXT",
            InternalError => "INTERNAL ERROR",
            DirectStatementInFile => "DIRECT STATEMENT IN FILE",
            UndefinedVariable => "UNDEFINED VARIABLE",
            ForNextDeadlock => "FOR/NEXT DEADLOCK",
            Break => "BREAK",
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut suffix = String::new();
        if let Some(line_number) = self.line_number {
            suffix.push_str(&format!(" {}", line_number));
        }
        if !self.command.is_empty() {
            suffix.push_str(&format!(" ({})", self.command));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        if self.kind == ErrorKind::Compile {
            write!(f, "CAN'T COMPILE; ")?;
        }
        if suffix.is_empty() {
            write!(f, "{}", self.code.as_str())
        } else {
            write!(f, "{} IN{}", self.code.as_str(), suffix)
        }
    }
}

impl std::error::Error for Error {}
