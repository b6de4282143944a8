//! Tokenizer for build descriptors.
//!
//! Accepts the literal syntax found in `binding.gyp` style files: JSON plus
//! single-quoted strings, `#`, `//` and `/* */` comments and bare
//! identifiers. Characters that could only be part of an expression are
//! returned as [`TokenKind::Operator`] so the parser can reject them.

use super::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Colon,
    Comma,
    /// A quoted string with escapes resolved
    String(String),
    /// Unsigned numeric literal as written, e.g. `42`, `0x1f`, `1.5e3`
    Number(String),
    Ident(String),
    Operator(char),
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LeftBrace => "'{'".to_string(),
            TokenKind::RightBrace => "'}'".to_string(),
            TokenKind::LeftBracket => "'['".to_string(),
            TokenKind::RightBracket => "']'".to_string(),
            TokenKind::LeftParen => "'('".to_string(),
            TokenKind::RightParen => "')'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::String(_) => "string".to_string(),
            TokenKind::Number(text) => format!("number {text}"),
            TokenKind::Ident(name) => format!("name `{name}`"),
            TokenKind::Operator(op) => format!("operator `{op}`"),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based line of the first character
    pub line: usize,
    /// 1-based column of the first character
    pub column: usize,
}

const OPERATOR_CHARS: &str = "+-*/%|&^~<>=!.@";

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn syntax_error(&self, line: usize, column: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(ParseErrorKind::Syntax, message, line, column)
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('#'), _) | (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(self.syntax_error(
                                    line,
                                    column,
                                    "unterminated block comment",
                                ));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia()?;

        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                line,
                column,
            });
        };

        let kind = match c {
            '{' | '}' | '[' | ']' | '(' | ')' | ':' | ',' => {
                self.bump();
                match c {
                    '{' => TokenKind::LeftBrace,
                    '}' => TokenKind::RightBrace,
                    '[' => TokenKind::LeftBracket,
                    ']' => TokenKind::RightBracket,
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    ':' => TokenKind::Colon,
                    _ => TokenKind::Comma,
                }
            }
            '\'' | '"' => TokenKind::String(self.read_string(c, line, column)?),
            '0'..='9' => TokenKind::Number(self.read_number(line, column)?),
            '.' if self.peek_second().is_some_and(|d| d.is_ascii_digit()) => {
                TokenKind::Number(self.read_number(line, column)?)
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                TokenKind::Ident(self.read_ident())
            }
            c if OPERATOR_CHARS.contains(c) => {
                self.bump();
                TokenKind::Operator(c)
            }
            other => {
                return Err(self.syntax_error(
                    line,
                    column,
                    format!("unexpected character {other:?}"),
                ));
            }
        };

        Ok(Token { kind, line, column })
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                self.bump();
            } else {
                break;
            }
        }
        self.source[start..self.pos].to_string()
    }

    fn read_number(&mut self, line: usize, column: usize) -> Result<String, ParseError> {
        let start = self.pos;

        if self.peek() == Some('0') && matches!(self.peek_second(), Some('x' | 'X')) {
            self.bump();
            self.bump();
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            if self.pos == digits_start {
                return Err(self.syntax_error(line, column, "hex literal has no digits"));
            }
        } else {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            if self.peek() == Some('.') {
                self.bump();
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                let exponent_start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                if self.pos == exponent_start {
                    return Err(self.syntax_error(line, column, "exponent has no digits"));
                }
            }
        }

        if self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(self.syntax_error(
                line,
                column,
                format!("malformed number {:?}", &self.source[start..=self.pos]),
            ));
        }

        Ok(self.source[start..self.pos].to_string())
    }

    fn read_hex(&mut self, digits: usize, line: usize, column: usize) -> Result<u32, ParseError> {
        let mut value = 0u32;
        for _ in 0..digits {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.syntax_error(line, column, "truncated escape sequence"))?;
            self.bump();
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn read_unicode_escape(&mut self, line: usize, column: usize) -> Result<char, ParseError> {
        let code = self.read_hex(4, line, column)?;
        if (0xD800..0xDC00).contains(&code) {
            if self.peek() == Some('\\') && self.peek_second() == Some('u') {
                self.bump();
                self.bump();
                let low = self.read_hex(4, line, column)?;
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(c) = char::from_u32(combined) {
                        return Ok(c);
                    }
                }
            }
            return Err(self.syntax_error(line, column, "unpaired surrogate in \\u escape"));
        }
        char::from_u32(code)
            .ok_or_else(|| self.syntax_error(line, column, "invalid \\u escape"))
    }

    fn read_string(&mut self, quote: char, line: usize, column: usize) -> Result<String, ParseError> {
        self.bump();
        let mut value = String::new();

        loop {
            let Some(c) = self.bump() else {
                return Err(self.syntax_error(line, column, "unterminated string"));
            };
            match c {
                c if c == quote => return Ok(value),
                '\n' => return Err(self.syntax_error(line, column, "unterminated string")),
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(self.syntax_error(line, column, "unterminated string"));
                    };
                    match escaped {
                        '\n' => {}
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        'b' => value.push('\u{8}'),
                        'f' => value.push('\u{c}'),
                        'v' => value.push('\u{b}'),
                        '0' => value.push('\0'),
                        'x' => {
                            let code = self.read_hex(2, line, column)?;
                            value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                        }
                        'u' => value.push(self.read_unicode_escape(line, column)?),
                        '\\' | '\'' | '"' | '/' => value.push(escaped),
                        other => {
                            // Unknown escapes stay as written, backslash included
                            value.push('\\');
                            value.push(other);
                        }
                    }
                }
                other => value.push(other),
            }
        }
    }
}
