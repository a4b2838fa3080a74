use super::token::*;
use super::Column;

/// Splits statement text into tokens. Columns are byte ranges into `s`
/// so the parser can hand untouched source slices to collaborators.
pub fn lex(s: &str) -> Vec<(Column, Token)> {
    BasicLexer::lex(s)
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r' || c == '\n'
}

fn is_basic_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_basic_alphabetic(c: char) -> bool {
    c.is_ascii_alphabetic()
}

trait Tokenizers<'a> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::CharIndices<'a>>;

    fn peek_char(&mut self) -> Option<char> {
        self.chars().peek().map(|(_, c)| *c)
    }

    fn number(&mut self) -> Token {
        let mut s = String::new();
        let mut decimal = false;
        let mut exp = false;
        while let Some(ch) = self.peek_char() {
            if is_basic_digit(ch) {
                s.push(ch);
            } else if ch == '.' && !decimal && !exp {
                decimal = true;
                s.push(ch);
            } else if (ch == 'E' || ch == 'e') && !exp && !s.is_empty() {
                exp = true;
                s.push('E');
                self.chars().next();
                if let Some(sign) = self.peek_char() {
                    if sign == '+' || sign == '-' {
                        s.push(sign);
                    } else {
                        continue;
                    }
                } else {
                    continue;
                }
            } else {
                break;
            }
            self.chars().next();
        }
        Token::Literal(Literal::Number(s))
    }

    fn string(&mut self) -> Token {
        let mut s = String::new();
        self.chars().next();
        while let Some((_, ch)) = self.chars().next() {
            if ch == '"' {
                break;
            }
            s.push(ch);
        }
        Token::Literal(Literal::String(s))
    }

    fn alphabetic(&mut self) -> Token {
        let mut s = String::new();
        while let Some(ch) = self.peek_char() {
            if is_basic_alphabetic(ch) || is_basic_digit(ch) {
                s.push(ch.to_ascii_uppercase());
                self.chars().next();
            } else {
                break;
            }
        }
        if let Some(token) = Token::from_word(&s) {
            return token;
        }
        if self.peek_char() == Some('$') {
            self.chars().next();
            s.push('$');
        }
        Token::Ident(s)
    }

    fn operator(&mut self, ch: char) -> Token {
        use Operator::*;
        self.chars().next();
        let follow = self.peek_char();
        let (op, two) = match (ch, follow) {
            ('<', Some('>')) => (NotEqual, true),
            ('<', Some('=')) => (LessEqual, true),
            ('>', Some('=')) => (GreaterEqual, true),
            ('=', Some('<')) => (LessEqual, true),
            ('=', Some('>')) => (GreaterEqual, true),
            ('<', _) => (Less, false),
            ('>', _) => (Greater, false),
            ('=', _) => (Equal, false),
            ('+', _) => (Plus, false),
            ('-', _) => (Minus, false),
            ('*', _) => (Multiply, false),
            ('/', _) => (Divide, false),
            ('\\', _) => (DivideInt, false),
            _ => (Caret, false),
        };
        if two {
            self.chars().next();
        }
        Token::Operator(op)
    }
}

struct BasicLexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Tokenizers<'a> for BasicLexer<'a> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::CharIndices<'a>> {
        &mut self.chars
    }
}

impl<'a> BasicLexer<'a> {
    fn lex(s: &'a str) -> Vec<(Column, Token)> {
        let mut lexer = BasicLexer {
            chars: s.char_indices().peekable(),
        };
        let mut tokens = vec![];
        while let Some(&(start, ch)) = lexer.chars.peek() {
            if is_basic_whitespace(ch) {
                lexer.chars.next();
                continue;
            }
            let token = if is_basic_digit(ch) || ch == '.' {
                lexer.number()
            } else if is_basic_alphabetic(ch) {
                lexer.alphabetic()
            } else if ch == '"' {
                lexer.string()
            } else if ch == '\'' {
                lexer.chars.next();
                Token::Word(Word::Rem)
            } else if "<>=+-*/\\^".contains(ch) {
                lexer.operator(ch)
            } else {
                lexer.chars.next();
                match ch {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    ':' => Token::Colon,
                    ';' => Token::Semicolon,
                    _ => Token::Unknown(ch),
                }
            };
            let end = match lexer.chars.peek() {
                Some(&(pos, _)) => pos,
                None => s.len(),
            };
            let is_rem = token == Token::Word(Word::Rem);
            tokens.push((start..end, token));
            if is_rem {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<Token> {
        lex(s).into_iter().map(|(_, t)| t).collect()
    }

    #[test]
    fn test_relational_pairs() {
        assert_eq!(
            tokens("1=<>=<>2"),
            vec![
                Token::Literal(Literal::Number("1".into())),
                Token::Operator(Operator::LessEqual),
                Token::Operator(Operator::GreaterEqual),
                Token::Operator(Operator::NotEqual),
                Token::Literal(Literal::Number("2".into())),
            ]
        );
    }

    #[test]
    fn test_words_and_idents() {
        assert_eq!(
            tokens("for i=1 to n$ step .5e1"),
            vec![
                Token::Word(Word::For),
                Token::Ident("I".into()),
                Token::Operator(Operator::Equal),
                Token::Literal(Literal::Number("1".into())),
                Token::Word(Word::To),
                Token::Ident("N$".into()),
                Token::Word(Word::Step),
                Token::Literal(Literal::Number(".5E1".into())),
            ]
        );
    }

    #[test]
    fn test_colon_in_string_is_not_separator() {
        let t = tokens(r#"PRINT "A:B":X"#);
        assert_eq!(t.len(), 4);
        assert_eq!(t[1], Token::Literal(Literal::String("A:B".into())));
        assert_eq!(t[2], Token::Colon);
    }

    #[test]
    fn test_rem_ends_line() {
        assert_eq!(
            tokens("A=1 ' note: x=2"),
            vec![
                Token::Ident("A".into()),
                Token::Operator(Operator::Equal),
                Token::Literal(Literal::Number("1".into())),
                Token::Word(Word::Rem),
            ]
        );
    }

    #[test]
    fn test_columns_are_byte_ranges() {
        let s = "PRINT  X";
        let v = lex(s);
        assert_eq!(&s[v[0].0.clone()], "PRINT");
        assert_eq!(&s[v[1].0.clone()], "X");
    }
}
