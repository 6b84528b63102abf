//! Formula tokenizer

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use cfmatch_core::{CellAddress, CellError};

use crate::error::{FormulaError, FormulaResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(CellError),
    Cell(CellAddress),
    /// `Data!` or `'My Sheet'!`, unquoted
    Sheet(String),
    /// Identifier directly followed by `(`, upper-cased
    Function(String),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    Amp,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Colon,
    Comma,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Token::Number(n) => return write!(f, "number {}", n),
            Token::Text(s) => return write!(f, "text \"{}\"", s),
            Token::Boolean(b) => return write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Token::Error(e) => return write!(f, "{}", e),
            Token::Cell(addr) => return write!(f, "reference {}", addr),
            Token::Sheet(name) => return write!(f, "sheet '{}'!", name),
            Token::Function(name) => return write!(f, "function {}", name),
            Token::Name(name) => return write!(f, "name {}", name),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Caret => "^",
            Token::Percent => "%",
            Token::Amp => "&",
            Token::Eq => "=",
            Token::Ne => "<>",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Open => "(",
            Token::Close => ")",
        };
        write!(f, "'{}'", symbol)
    }
}

/// A token and the byte offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Split formula text (without the leading `=`) into tokens
pub(crate) fn tokenize(src: &str) -> FormulaResult<Vec<Spanned>> {
    let mut lexer = Lexer {
        src,
        chars: src.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(spanned) = lexer.next_token()? {
        tokens.push(spanned);
    }
    Ok(tokens)
}

fn error_at(offset: usize, message: impl fmt::Display) -> FormulaError {
    FormulaError::Parse(format!("{} at {}", message, offset))
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl Lexer<'_> {
    fn next_token(&mut self) -> FormulaResult<Option<Spanned>> {
        self.eat_while(char::is_whitespace);
        let Some((offset, c)) = self.chars.next() else {
            return Ok(None);
        };

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '%' => Token::Percent,
            '&' => Token::Amp,
            '=' => Token::Eq,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '(' => Token::Open,
            ')' => Token::Close,
            '<' if self.eat('=') => Token::Le,
            '<' if self.eat('>') => Token::Ne,
            '<' => Token::Lt,
            '>' if self.eat('=') => Token::Ge,
            '>' => Token::Gt,
            '"' => Token::Text(self.quoted('"', offset)?),
            '\'' => {
                let name = self.quoted('\'', offset)?;
                if !self.eat('!') {
                    return Err(error_at(offset, format!("quoted name '{}' without '!'", name)));
                }
                Token::Sheet(name)
            }
            '#' => self.error_literal(offset)?,
            c if c.is_ascii_digit() || c == '.' => self.number(offset)?,
            c if c.is_alphabetic() || c == '_' || c == '$' => self.word(offset),
            other => return Err(error_at(offset, format!("unexpected character '{}'", other))),
        };

        Ok(Some(Spanned { token, offset }))
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.chars.next_if(|&(_, c)| pred(c)).is_some() {}
    }

    fn position(&mut self) -> usize {
        self.chars.peek().map_or(self.src.len(), |&(i, _)| i)
    }

    /// Body of a quoted token whose opening quote is consumed; a doubled quote is literal
    fn quoted(&mut self, quote: char, start: usize) -> FormulaResult<String> {
        let mut body = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => {
                    if !self.eat(quote) {
                        return Ok(body);
                    }
                    body.push(quote);
                }
                Some((_, c)) => body.push(c),
                None => return Err(error_at(start, format!("unterminated {}", quote))),
            }
        }
    }

    fn number(&mut self, start: usize) -> FormulaResult<Token> {
        self.eat_while(|c| c.is_ascii_digit() || c == '.');
        if self.eat('e') || self.eat('E') {
            let _ = self.eat('+') || self.eat('-');
            self.eat_while(|c| c.is_ascii_digit());
        }
        let end = self.position();
        let text = &self.src[start..end];
        text.parse()
            .map(Token::Number)
            .map_err(|_| error_at(start, format!("invalid number '{}'", text)))
    }

    fn error_literal(&mut self, start: usize) -> FormulaResult<Token> {
        self.eat_while(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '!' | '?'));
        let end = self.position();
        let text = &self.src[start..end];
        CellError::parse(text)
            .map(Token::Error)
            .ok_or_else(|| error_at(start, format!("unknown error value '{}'", text)))
    }

    /// Sheet prefix, function name, boolean, cell or defined name
    fn word(&mut self, start: usize) -> Token {
        self.eat_while(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$'));
        let end = self.position();
        let text = &self.src[start..end];

        if self.eat('!') {
            return Token::Sheet(text.to_string());
        }
        if self.chars.peek().map(|&(_, c)| c) == Some('(') {
            return Token::Function(text.to_ascii_uppercase());
        }
        if text.eq_ignore_ascii_case("TRUE") {
            return Token::Boolean(true);
        }
        if text.eq_ignore_ascii_case("FALSE") {
            return Token::Boolean(false);
        }
        match cell_address(text) {
            Some(addr) => Token::Cell(addr),
            None => Token::Name(text.to_string()),
        }
    }
}

/// `text` as a cell, or `None` for names like `Rate_2` or `XFE1` (past the last column)
fn cell_address(text: &str) -> Option<CellAddress> {
    if !text.chars().all(|c| c.is_ascii_alphanumeric() || c == '$') {
        return None;
    }
    CellAddress::parse(text).ok()
}
