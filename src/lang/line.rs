use super::ast::Statement;
use super::{parse, Error, LineNumber, MAX_LINE_LEN, MAX_LINE_NUMBER};
use crate::error;
use std::sync::Arc;

/// A stored program line. The text is parsed once, when the line is
/// created; a parse failure is kept and reported when the line runs.
#[derive(Debug, Clone)]
pub struct Line {
    number: LineNumber,
    source: Arc<str>,
    ast: Result<Arc<[Statement]>, Error>,
}

impl Line {
    pub fn new(number: LineNumber, source: &str) -> Line {
        let source = source.trim();
        let ast = parse(source)
            .map(Arc::from)
            .map_err(|e| e.in_line_number(number));
        Line {
            number,
            source: source.into(),
            ast,
        }
    }

    /// Splits `"10 PRINT X"` into its line number and statement text.
    pub fn split_number(s: &str) -> Result<(LineNumber, &str), Error> {
        if s.len() > MAX_LINE_LEN {
            return Err(error!(LineBufferOverflow));
        }
        let s = s.trim_start();
        let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return Err(error!(DirectStatementInFile));
        }
        match s[..digits].parse::<LineNumber>() {
            Ok(number) if number > 0 && number <= MAX_LINE_NUMBER => Ok((number, &s[digits..])),
            _ => Err(error!(SyntaxError; "INVALID LINE NUMBER")),
        }
    }

    pub fn number(&self) -> LineNumber {
        self.number
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn ast(&self) -> Result<Arc<[Statement]>, Error> {
        self.ast.clone()
    }

    /// Parsed statements, or none when the line failed to parse.
    pub fn statements(&self) -> &[Statement] {
        match &self.ast {
            Ok(ast) => &ast[..],
            Err(_) => &[],
        }
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.number, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ast::Expression;

    #[test]
    fn test_split_number() {
        assert_eq!(Line::split_number("  10 PRINT").unwrap(), (10, " PRINT"));
        assert!(Line::split_number("PRINT").is_err());
        assert!(Line::split_number("0 PRINT").is_err());
        assert!(Line::split_number("70000 PRINT").is_err());
    }

    #[test]
    fn test_parse_error_is_kept_with_line() {
        let line = Line::new(20, "FOR I=1 5");
        let err = line.ast().unwrap_err();
        assert_eq!(err.line_number(), Some(20));
        assert_eq!(err.to_string(), "SYNTAX ERROR IN 20; EXPECTED TO");
    }

    #[test]
    fn test_if_then_else_flattened() {
        let line = Line::new(10, r#"IF A THEN B=1:PRINT "X" ELSE 200"#);
        let ast = line.ast().unwrap();
        assert_eq!(
            ast.as_ref(),
            &[
                Statement::If {
                    cond: Expression::Var("A".into()),
                    else_index: 4
                },
                Statement::Let("B".into(), Expression::Number(1.0)),
                Statement::Other(r#"PRINT "X""#.into()),
                Statement::Else,
                Statement::Goto(200),
            ]
        );
    }

    #[test]
    fn test_if_without_else_runs_to_end_of_line() {
        let line = Line::new(10, "IF A THEN 100: X=2");
        let ast = line.ast().unwrap();
        assert_eq!(ast.len(), 3);
        assert_eq!(ast[1], Statement::Goto(100));
        match &ast[0] {
            Statement::If { else_index, .. } => assert_eq!(*else_index, 3),
            _ => panic!(),
        }
    }

    #[test]
    fn test_next_with_list() {
        let line = Line::new(10, "NEXT J, I");
        assert_eq!(
            line.ast().unwrap().as_ref(),
            &[Statement::Next(vec!["J".into(), "I".into()])]
        );
    }

    #[test]
    fn test_missing_then() {
        let line = Line::new(10, "IF A PRINT 1");
        assert_eq!(
            line.ast().unwrap_err().to_string(),
            "SYNTAX ERROR IN 10; EXPECTED THEN"
        );
    }
}
