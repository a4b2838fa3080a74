use super::{ast::*, lex, token::*, Column, Error, LineNumber, MAX_LINE_NUMBER};
use crate::error;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// Parses the text of one program line (without its line number) into
/// flattened sub-statements.
pub fn parse(source: &str) -> Result<Vec<Statement>> {
    let mut parser = Parser::new(source);
    let mut statements = vec![];
    parser.clause(&mut statements)?;
    match parser.peek() {
        None => Ok(statements),
        Some(Token::Word(Word::Else)) => Err(error!(SyntaxError; "ELSE WITHOUT IF")),
        Some(_) => Err(error!(SyntaxError; "EXPECTED END OF STATEMENT")),
    }
}

pub fn parse_expression(source: &str) -> Result<Expression> {
    let mut parser = Parser::new(source);
    let expr = parser.expression()?;
    parser.expect_end()?;
    Ok(expr)
}

#[derive(Debug, PartialEq, Clone)]
pub enum PrintItem {
    Expression(Expression),
    Comma,
    Semicolon,
}

/// Parses the argument list of a `PRINT` statement.
pub fn parse_print(source: &str) -> Result<Vec<PrintItem>> {
    let mut parser = Parser::new(source);
    let mut items = vec![];
    loop {
        match parser.peek() {
            None => return Ok(items),
            Some(Token::Comma) => {
                parser.pos += 1;
                items.push(PrintItem::Comma);
            }
            Some(Token::Semicolon) => {
                parser.pos += 1;
                items.push(PrintItem::Semicolon);
            }
            Some(_) => items.push(PrintItem::Expression(parser.expression()?)),
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Column, Token)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Parser<'a> {
        Parser {
            source,
            tokens: lex(source),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(_, t)| t)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token, message: &'static str) -> Result<()> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            _ => Err(error!(SyntaxError; message)),
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(error!(SyntaxError; "EXPECTED END OF STATEMENT")),
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(Token::Colon) | Some(Token::Word(Word::Else)) | Some(Token::Word(Word::Rem))
        )
    }

    /// Statements up to the end of the line or an ELSE that belongs to an
    /// enclosing IF.
    fn clause(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        loop {
            match self.peek() {
                None | Some(Token::Word(Word::Else)) => return Ok(()),
                Some(Token::Colon) => {
                    self.pos += 1;
                    continue;
                }
                Some(Token::Word(Word::Rem)) => {
                    self.pos = self.tokens.len();
                    return Ok(());
                }
                Some(_) => {}
            }
            self.statement(out)?;
            if !self.at_statement_end() {
                return Err(error!(SyntaxError; "EXPECTED END OF STATEMENT"));
            }
        }
    }

    fn statement(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        match self.peek() {
            Some(Token::Word(word)) => {
                let word = *word;
                self.pos += 1;
                match word {
                    Word::Let => self.r#let(out),
                    Word::For => self.r#for(out),
                    Word::Next => self.next_statement(out),
                    Word::Goto => {
                        let line = self.line_number()?;
                        out.push(Statement::Goto(line));
                        Ok(())
                    }
                    Word::Gosub => {
                        let line = self.line_number()?;
                        out.push(Statement::Gosub(line));
                        Ok(())
                    }
                    Word::Return => {
                        out.push(Statement::Return);
                        Ok(())
                    }
                    Word::End => {
                        out.push(Statement::End);
                        Ok(())
                    }
                    Word::If => self.r#if(out),
                    Word::Then => Err(error!(SyntaxError; "THEN WITHOUT IF")),
                    Word::Else => Err(error!(SyntaxError; "ELSE WITHOUT IF")),
                    Word::To | Word::Step => Err(error!(SyntaxError; "UNEXPECTED WORD")),
                    Word::Rem => Ok(()),
                }
            }
            Some(Token::Ident(_)) if self.peek_at(1) == Some(&Token::Operator(Operator::Equal)) => {
                self.r#let(out)
            }
            Some(_) => self.other(out),
            None => Ok(()),
        }
    }

    fn other(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        let start = self.tokens[self.pos].0.start;
        let mut end = start;
        while !self.at_statement_end() {
            end = self.tokens[self.pos].0.end;
            self.pos += 1;
        }
        let text = self.source[start..end].trim();
        out.push(Statement::Other(text.into()));
        Ok(())
    }

    fn ident(&mut self, message: &'static str) -> Result<Arc<str>> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name.into()),
            _ => Err(error!(SyntaxError; message)),
        }
    }

    fn line_number(&mut self) -> Result<LineNumber> {
        if let Some(Token::Literal(Literal::Number(s))) = self.next() {
            if s.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(line) = s.parse::<LineNumber>() {
                    if line > 0 && line <= MAX_LINE_NUMBER {
                        return Ok(line);
                    }
                }
            }
        }
        Err(error!(SyntaxError; "INVALID LINE NUMBER"))
    }

    fn r#let(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        let var = self.ident("EXPECTED VARIABLE")?;
        self.expect(Token::Operator(Operator::Equal), "EXPECTED =")?;
        let expr = self.expression()?;
        out.push(Statement::Let(var, expr));
        Ok(())
    }

    fn r#for(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        let var = self.ident("EXPECTED VARIABLE")?;
        self.expect(Token::Operator(Operator::Equal), "EXPECTED =")?;
        let from = self.expression()?;
        self.expect(Token::Word(Word::To), "EXPECTED TO")?;
        let to = self.expression()?;
        let step = if self.peek() == Some(&Token::Word(Word::Step)) {
            self.pos += 1;
            Some(self.expression()?)
        } else {
            None
        };
        out.push(Statement::For {
            var,
            from,
            to,
            step,
        });
        Ok(())
    }

    fn next_statement(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        let mut vars = vec![];
        if let Some(Token::Ident(_)) = self.peek() {
            loop {
                vars.push(self.ident("EXPECTED VARIABLE")?);
                if self.peek() != Some(&Token::Comma) {
                    break;
                }
                self.pos += 1;
            }
        }
        out.push(Statement::Next(vars));
        Ok(())
    }

    /// A clause that begins with a bare line number is an implied GOTO.
    fn branch(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        if let Some(Token::Literal(Literal::Number(_))) = self.peek() {
            let line = self.line_number()?;
            out.push(Statement::Goto(line));
        }
        self.clause(out)
    }

    fn r#if(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        let cond = self.expression()?;
        let if_index = out.len();
        out.push(Statement::If {
            cond,
            else_index: 0,
        });
        match self.next() {
            Some(Token::Word(Word::Then)) => self.branch(out)?,
            Some(Token::Word(Word::Goto)) => {
                let line = self.line_number()?;
                out.push(Statement::Goto(line));
                self.clause(out)?;
            }
            _ => return Err(error!(SyntaxError; "EXPECTED THEN")),
        }
        let else_index = if self.peek() == Some(&Token::Word(Word::Else)) {
            self.pos += 1;
            out.push(Statement::Else);
            let else_index = out.len();
            self.branch(out)?;
            else_index
        } else {
            out.len()
        };
        if let Some(Statement::If { else_index: e, .. }) = out.get_mut(if_index) {
            *e = else_index;
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Expression> {
        self.binary(0)
    }

    fn binary(&mut self, min_precedence: usize) -> Result<Expression> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Operator(op)) => *op,
                _ => break,
            };
            let precedence = match op_precedence(op) {
                Some(p) if p >= min_precedence => p,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.binary(precedence + 1)?;
            lhs = for_binary_op(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expression> {
        match self.peek() {
            Some(Token::Operator(Operator::Minus)) => {
                self.pos += 1;
                Ok(Expression::Negation(Box::new(self.binary(10)?)))
            }
            Some(Token::Operator(Operator::Plus)) => {
                self.pos += 1;
                self.binary(10)
            }
            Some(Token::Operator(Operator::Not)) => {
                self.pos += 1;
                Ok(Expression::Not(Box::new(self.binary(4)?)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expression> {
        match self.next() {
            Some(Token::Literal(Literal::Number(s))) => match s.parse::<f64>() {
                Ok(n) => Ok(Expression::Number(n)),
                Err(_) => Err(error!(SyntaxError; "INVALID NUMBER")),
            },
            Some(Token::Literal(Literal::String(s))) => Ok(Expression::String(s.into())),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let args = self.expression_list()?;
                    Ok(Expression::Function(name.into(), args))
                } else {
                    Ok(Expression::Var(name.into()))
                }
            }
            Some(Token::LParen) => {
                let expr = self.expression()?;
                self.expect(Token::RParen, "EXPECTED )")?;
                Ok(expr)
            }
            _ => Err(error!(SyntaxError; "EXPECTED EXPRESSION")),
        }
    }

    fn expression_list(&mut self) -> Result<Vec<Expression>> {
        self.expect(Token::LParen, "EXPECTED (")?;
        let mut v: Vec<Expression> = vec![];
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(v);
        }
        loop {
            v.push(self.expression()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(v),
                _ => return Err(error!(SyntaxError; "EXPECTED )")),
            }
        }
    }
}

fn op_precedence(op: Operator) -> Option<usize> {
    use Operator::*;
    match op {
        Xor => Some(1),
        Or => Some(2),
        And => Some(3),
        Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => Some(5),
        Plus | Minus => Some(6),
        Modulo => Some(7),
        DivideInt => Some(8),
        Multiply | Divide => Some(9),
        Caret => Some(11),
        Not => None,
    }
}

fn for_binary_op(op: Operator, lhs: Expression, rhs: Expression) -> Expression {
    use Operator::*;
    let (l, r) = (Box::new(lhs), Box::new(rhs));
    match op {
        Caret => Expression::Power(l, r),
        Multiply => Expression::Multiply(l, r),
        Divide => Expression::Divide(l, r),
        DivideInt => Expression::DivideInt(l, r),
        Modulo => Expression::Modulo(l, r),
        Plus => Expression::Add(l, r),
        Minus => Expression::Subtract(l, r),
        Equal => Expression::Equal(l, r),
        NotEqual => Expression::NotEqual(l, r),
        Less => Expression::Less(l, r),
        LessEqual => Expression::LessEqual(l, r),
        Greater => Expression::Greater(l, r),
        GreaterEqual => Expression::GreaterEqual(l, r),
        And => Expression::And(l, r),
        Or => Expression::Or(l, r),
        Xor => Expression::Xor(l, r),
        Not => Expression::Not(r),
    }
}
