#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Unknown(char),
    Literal(Literal),
    Word(Word),
    Operator(Operator),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Colon,
    Semicolon,
}

impl Token {
    pub fn from_word(s: &str) -> Option<Token> {
        use Operator::*;
        use Word::*;
        let token = match s {
            "AND" => Token::Operator(And),
            "ELSE" => Token::Word(Else),
            "END" => Token::Word(End),
            "FOR" => Token::Word(For),
            "GOSUB" => Token::Word(Gosub),
            "GOTO" => Token::Word(Goto),
            "IF" => Token::Word(If),
            "LET" => Token::Word(Let),
            "MOD" => Token::Operator(Modulo),
            "NEXT" => Token::Word(Next),
            "NOT" => Token::Operator(Not),
            "OR" => Token::Operator(Or),
            "REM" => Token::Word(Rem),
            "RETURN" => Token::Word(Return),
            "STEP" => Token::Word(Step),
            "THEN" => Token::Word(Then),
            "TO" => Token::Word(To),
            "XOR" => Token::Operator(Xor),
            _ => return None,
        };
        Some(token)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Unknown(c) => write!(f, "{}", c),
            Literal(s) => write!(f, "{}", s),
            Word(s) => write!(f, "{}", s),
            Operator(s) => write!(f, "{}", s),
            Ident(s) => write!(f, "{}", s),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
            Semicolon => write!(f, ";"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(String),
    String(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Literal::*;
        match self {
            Number(s) => write!(f, "{}", s),
            String(s) => write!(f, "\"{}\"", s),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Word {
    Else,
    End,
    For,
    Gosub,
    Goto,
    If,
    Let,
    Next,
    Rem,
    Return,
    Step,
    Then,
    To,
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Word::*;
        match self {
            Else => write!(f, "ELSE"),
            End => write!(f, "END"),
            For => write!(f, "FOR"),
            Gosub => write!(f, "GOSUB"),
            Goto => write!(f, "GOTO"),
            If => write!(f, "IF"),
            Let => write!(f, "LET"),
            Next => write!(f, "NEXT"),
            Rem => write!(f, "REM"),
            Return => write!(f, "RETURN"),
            Step => write!(f, "STEP"),
            Then => write!(f, "THEN"),
            To => write!(f, "TO"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    Caret,
    Multiply,
    Divide,
    DivideInt,
    Modulo,
    Plus,
    Minus,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Not,
    And,
    Or,
    Xor,
}

impl Operator {
    pub fn is_reserved_word(&self) -> bool {
        use Operator::*;
        matches!(self, Modulo | Not | And | Or | Xor)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Caret => write!(f, "^"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
            DivideInt => write!(f, "\\"),
            Modulo => write!(f, "MOD"),
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Equal => write!(f, "="),
            NotEqual => write!(f, "<>"),
            Less => write!(f, "<"),
            LessEqual => write!(f, "<="),
            Greater => write!(f, ">"),
            GreaterEqual => write!(f, ">="),
            Not => write!(f, "NOT"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
            Xor => write!(f, "XOR"),
        }
    }
}
