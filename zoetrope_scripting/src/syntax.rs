use crate::error::{ErrorKind, ScriptError};

/// Parser recursion bound; malformed input errors out instead of
/// exhausting the call stack.
pub const MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Quote, // '
    Number(f64),
    Symbol(String),
    Str(String),
    Comment(String),
    Eof,
}

pub struct Lexer<'a> {
    chars: std::str::Chars<'a>,
    peek: Option<char>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut chars = src.chars();
        let peek = chars.next();
        Self {
            chars,
            peek,
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let cur = self.peek;
        if cur == Some('\n') {
            self.line += 1;
        }
        self.peek = self.chars.next();
        cur
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek, Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Next token together with the 1-based line it starts on.
    pub fn next_token(&mut self) -> Result<(usize, Token), ScriptError> {
        self.skip_ws();
        let line = self.line;

        let c = match self.bump() {
            Some(c) => c,
            None => return Ok((line, Token::Eof)),
        };

        let tok = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '\'' => Token::Quote,

            ';' => {
                let mut s = String::new();
                while matches!(self.peek, Some(p) if p != '\n') {
                    s.push(self.bump().unwrap_or_default());
                }
                Token::Comment(s.trim().to_string())
            }

            '"' => {
                let mut s = String::new();
                loop {
                    match self.bump() {
                        Some('"') => break,
                        Some(c) => s.push(c),
                        None => {
                            return Err(ScriptError::new(
                                ErrorKind::Parse,
                                "unterminated string",
                            ));
                        }
                    }
                }
                Token::Str(s)
            }

            _ => {
                let mut s = String::new();
                s.push(c);
                while matches!(self.peek, Some(p)
                    if !p.is_whitespace() && !matches!(p, '(' | ')' | ';' | '"' | '\''))
                {
                    s.push(self.bump().unwrap_or_default());
                }
                match atom_number(&s) {
                    Some(n) => Token::Number(n),
                    None => Token::Symbol(s),
                }
            }
        };
        Ok((line, tok))
    }
}

fn atom_number(s: &str) -> Option<f64> {
    let mut it = s.chars();
    let first = it.next()?;
    let second = it.next();
    let looks_numeric = first.is_ascii_digit()
        || (first == '-' || first == '.')
            && matches!(second, Some(d) if d.is_ascii_digit() || d == '.');
    if !looks_numeric {
        return None;
    }
    s.parse::<f64>().ok()
}

/// One parsed s-expression. Comments survive parsing so the formatter can
/// reprint them; evaluation skips them.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Number(f64),
    Symbol(String),
    Str(String),
    List(Vec<Form>),
    Comment(String),
}

impl Form {
    pub fn head_symbol(&self) -> Option<&str> {
        match self {
            Form::List(items) => match items.first() {
                Some(Form::Symbol(s)) => Some(s.as_str()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Parse all top-level forms, discarding source positions.
pub fn parse_forms(src: &str) -> Result<Vec<Form>, ScriptError> {
    Ok(parse_top_forms(src)?.into_iter().map(|(_, f)| f).collect())
}

/// Parse all top-level forms together with the 1-based line each starts on.
pub fn parse_top_forms(src: &str) -> Result<Vec<(usize, Form)>, ScriptError> {
    let mut lexer = Lexer::new(src);
    let mut forms = Vec::new();
    loop {
        let (line, tok) = lexer.next_token()?;
        match tok {
            Token::Eof => break,
            Token::RParen => {
                return Err(ScriptError::new(ErrorKind::Parse, "unexpected `)`"));
            }
            other => forms.push((line, parse_form(&mut lexer, other, 0)?)),
        }
    }
    Ok(forms)
}

fn parse_form(lexer: &mut Lexer<'_>, tok: Token, depth: usize) -> Result<Form, ScriptError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(ScriptError::new(
            ErrorKind::Depth,
            format!("nesting deeper than {MAX_NESTING_DEPTH}"),
        ));
    }
    match tok {
        Token::Number(n) => Ok(Form::Number(n)),
        Token::Symbol(s) => Ok(Form::Symbol(s)),
        Token::Str(s) => Ok(Form::Str(s)),
        Token::Comment(s) => Ok(Form::Comment(s)),
        Token::Quote => {
            let (_, next) = lexer.next_token()?;
            let quoted = parse_form(lexer, next, depth + 1)?;
            Ok(Form::List(vec![Form::Symbol("quote".into()), quoted]))
        }
        Token::LParen => {
            let mut items = Vec::new();
            loop {
                let (_, tok) = lexer.next_token()?;
                match tok {
                    Token::RParen => return Ok(Form::List(items)),
                    Token::Eof => {
                        return Err(ScriptError::new(ErrorKind::Parse, "unclosed list"));
                    }
                    other => items.push(parse_form(lexer, other, depth + 1)?),
                }
            }
        }
        Token::RParen | Token::Eof => {
            Err(ScriptError::new(ErrorKind::Parse, "unexpected token"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_atoms_and_lists() {
        let forms = parse_forms("(+ 1 2.5) sym \"text\"").unwrap();
        assert_eq!(
            forms,
            vec![
                Form::List(vec![
                    Form::Symbol("+".into()),
                    Form::Number(1.0),
                    Form::Number(2.5),
                ]),
                Form::Symbol("sym".into()),
                Form::Str("text".into()),
            ]
        );
    }

    #[test]
    fn negative_numbers_and_operator_symbols() {
        let forms = parse_forms("(- -4 2)").unwrap();
        match &forms[0] {
            Form::List(items) => {
                assert_eq!(items[0], Form::Symbol("-".into()));
                assert_eq!(items[1], Form::Number(-4.0));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn comments_kept_in_tree() {
        let forms = parse_forms("; header\n(do ; inner\n  1)").unwrap();
        assert_eq!(forms[0], Form::Comment("header".into()));
        match &forms[1] {
            Form::List(items) => assert_eq!(items[1], Form::Comment("inner".into())),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn quote_sugar_expands() {
        let forms = parse_forms("'(1 2)").unwrap();
        assert_eq!(
            forms[0],
            Form::List(vec![
                Form::Symbol("quote".into()),
                Form::List(vec![Form::Number(1.0), Form::Number(2.0)]),
            ])
        );
    }

    #[test]
    fn top_level_lines_tracked() {
        let forms = parse_top_forms("(= a 1)\n\n(= b 2)").unwrap();
        assert_eq!(forms[0].0, 1);
        assert_eq!(forms[1].0, 3);
    }

    #[test]
    fn unclosed_list_is_parse_error() {
        let err = parse_forms("(group (cube)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn nesting_depth_bounded() {
        let mut src = String::new();
        for _ in 0..200 {
            src.push('(');
        }
        let err = parse_forms(&src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Depth);
    }
}
