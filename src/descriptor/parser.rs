use indexmap::IndexMap;

use super::lexer::{Lexer, Token, TokenKind};
use super::{ParseError, ParseErrorKind};
use crate::models::descriptor::DescriptorValue;

/// Deepest container nesting accepted
const MAX_DEPTH: usize = 128;

/// Python keywords that combine or test values
const WORD_OPERATORS: &[&str] = &["and", "or", "not", "if", "else", "in", "is", "for"];

/// Parse descriptor text into a value without evaluating anything
pub fn parse_descriptor(source: &str) -> Result<DescriptorValue, ParseError> {
    Parser::new(source)?.parse_document()
}

fn syntax_error(token: &Token, message: impl Into<String>) -> ParseError {
    ParseError::new(ParseErrorKind::Syntax, message, token.line, token.column)
}

fn security_error(token: &Token, message: impl Into<String>) -> ParseError {
    ParseError::new(ParseErrorKind::Security, message, token.line, token.column)
}

fn number_value(text: &str, negative: bool, token: &Token) -> Result<DescriptorValue, ParseError> {
    let sign = if negative { "-" } else { "" };

    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(&format!("{sign}{hex}"), 16)
            .map(DescriptorValue::Integer)
            .map_err(|_| syntax_error(token, format!("integer {sign}{text} does not fit in 64 bits")));
    }

    if text.contains(['.', 'e', 'E']) {
        let value: f64 = format!("{sign}{text}")
            .parse()
            .map_err(|_| syntax_error(token, format!("malformed number {sign}{text}")))?;
        if !value.is_finite() {
            return Err(syntax_error(token, format!("number {sign}{text} is out of range")));
        }
        return Ok(DescriptorValue::Float(value));
    }

    format!("{sign}{text}")
        .parse()
        .map(DescriptorValue::Integer)
        .map_err(|_| syntax_error(token, format!("integer {sign}{text} does not fit in 64 bits")))
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
        })
    }

    /// Move to the next token, returning the one just consumed
    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// A single value followed by end of input
    pub fn parse_document(&mut self) -> Result<DescriptorValue, ParseError> {
        let value = self.parse_value()?;
        self.reject_expression()?;
        match self.current.kind {
            TokenKind::Eof => Ok(value),
            _ => Err(syntax_error(
                &self.current,
                format!(
                    "unexpected {} after the descriptor value",
                    self.current.kind.describe()
                ),
            )),
        }
    }

    /// Fail if the token after a complete value would turn it into an
    /// expression
    fn reject_expression(&self) -> Result<(), ParseError> {
        let message = match self.current.kind {
            TokenKind::Operator('.') => "attribute access is not allowed in a descriptor".to_string(),
            TokenKind::Operator(op) => format!("operator `{op}` is not allowed in a descriptor"),
            TokenKind::LeftParen => "calls are not allowed in a descriptor".to_string(),
            TokenKind::LeftBracket => "subscripts are not allowed in a descriptor".to_string(),
            TokenKind::Ident(ref word) if WORD_OPERATORS.contains(&word.as_str()) => {
                format!("operator `{word}` is not allowed in a descriptor")
            }
            _ => return Ok(()),
        };
        Err(security_error(&self.current, message))
    }

    fn enter(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(syntax_error(
                token,
                format!("nesting deeper than {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<DescriptorValue, ParseError> {
        let token = self.advance()?;

        match token.kind {
            TokenKind::LeftBrace => {
                self.enter(&token)?;
                let value = self.parse_mapping(&token);
                self.depth -= 1;
                value
            }
            TokenKind::LeftBracket => {
                self.enter(&token)?;
                let value = self
                    .parse_items(TokenKind::RightBracket, &token, Vec::new())
                    .map(DescriptorValue::Sequence);
                self.depth -= 1;
                value
            }
            TokenKind::LeftParen => {
                self.enter(&token)?;
                let value = self.parse_parenthesized(&token);
                self.depth -= 1;
                value
            }
            TokenKind::String(ref first) => {
                let first = first.clone();
                self.parse_string_run(first).map(DescriptorValue::String)
            }
            TokenKind::Number(ref text) => number_value(text, false, &token),
            TokenKind::Operator(sign @ ('+' | '-')) => {
                if let TokenKind::Number(text) = &self.current.kind {
                    let text = text.clone();
                    self.advance()?;
                    number_value(&text, sign == '-', &token)
                } else {
                    Err(security_error(
                        &token,
                        format!("operator `{sign}` is not allowed in a descriptor"),
                    ))
                }
            }
            TokenKind::Operator(op) => Err(security_error(
                &token,
                format!("operator `{op}` is not allowed in a descriptor"),
            )),
            TokenKind::Ident(ref name) => self.parse_name(name, &token),
            TokenKind::Eof => Err(syntax_error(
                &token,
                "unexpected end of input, expected a value",
            )),
            ref other => Err(syntax_error(
                &token,
                format!("expected a value, found {}", other.describe()),
            )),
        }
    }

    fn parse_name(&self, name: &str, token: &Token) -> Result<DescriptorValue, ParseError> {
        match name {
            "true" | "True" => Ok(DescriptorValue::Boolean(true)),
            "false" | "False" => Ok(DescriptorValue::Boolean(false)),
            "null" | "None" => Ok(DescriptorValue::Null),
            _ => {
                let message = if self.current.kind == TokenKind::LeftParen {
                    format!("call to `{name}` is not allowed in a descriptor")
                } else {
                    format!("name `{name}` cannot be resolved; only literal values are allowed")
                };
                Err(security_error(token, message))
            }
        }
    }

    /// Adjacent string literals join into one
    fn parse_string_run(&mut self, first: String) -> Result<String, ParseError> {
        let mut value = first;
        while let TokenKind::String(next) = &self.current.kind {
            value.push_str(next);
            self.advance()?;
        }
        Ok(value)
    }

    fn parse_key(&mut self, open: &Token) -> Result<String, ParseError> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::String(first) => self.parse_string_run(first),
            TokenKind::Ident(name) => Ok(name),
            TokenKind::Number(ref text) => match number_value(text, false, &token)? {
                DescriptorValue::Integer(i) => Ok(i.to_string()),
                // Debug keeps the fractional part: `1.0` stays "1.0"
                DescriptorValue::Float(f) => Ok(format!("{f:?}")),
                _ => Ok(text.clone()),
            },
            TokenKind::Eof => Err(syntax_error(open, "unterminated mapping, expected '}'")),
            ref other => Err(syntax_error(
                &token,
                format!("expected a mapping key, found {}", other.describe()),
            )),
        }
    }

    fn parse_mapping(&mut self, open: &Token) -> Result<DescriptorValue, ParseError> {
        let mut map = IndexMap::new();

        loop {
            if self.current.kind == TokenKind::RightBrace {
                self.advance()?;
                return Ok(DescriptorValue::Mapping(map));
            }

            let key = self.parse_key(open)?;
            match self.current.kind {
                TokenKind::Colon => {
                    self.advance()?;
                }
                TokenKind::Eof => {
                    return Err(syntax_error(open, "unterminated mapping, expected '}'"));
                }
                ref other => {
                    return Err(syntax_error(
                        &self.current,
                        format!("expected ':' after mapping key, found {}", other.describe()),
                    ));
                }
            }

            let value = self.parse_value()?;
            self.reject_expression()?;
            map.insert(key, value);

            match self.current.kind {
                TokenKind::Comma => {
                    self.advance()?;
                }
                TokenKind::RightBrace => {}
                TokenKind::Eof => {
                    return Err(syntax_error(open, "unterminated mapping, expected '}'"));
                }
                ref other => {
                    return Err(syntax_error(
                        &self.current,
                        format!("expected ',' or '}}' in mapping, found {}", other.describe()),
                    ));
                }
            }
        }
    }

    /// Parse comma-separated values up to `closer`, appending to `items`
    fn parse_items(
        &mut self,
        closer: TokenKind,
        open: &Token,
        mut items: Vec<DescriptorValue>,
    ) -> Result<Vec<DescriptorValue>, ParseError> {
        let closer_text = closer.describe();

        loop {
            if self.current.kind == closer {
                self.advance()?;
                return Ok(items);
            }
            if self.current.kind == TokenKind::Eof {
                return Err(syntax_error(
                    open,
                    format!("unterminated sequence, expected {closer_text}"),
                ));
            }

            items.push(self.parse_value()?);
            self.reject_expression()?;

            match self.current.kind {
                TokenKind::Comma => {
                    self.advance()?;
                }
                ref kind if *kind == closer => {}
                TokenKind::Eof => {
                    return Err(syntax_error(
                        open,
                        format!("unterminated sequence, expected {closer_text}"),
                    ));
                }
                ref other => {
                    return Err(syntax_error(
                        &self.current,
                        format!(
                            "expected ',' or {closer_text} in sequence, found {}",
                            other.describe()
                        ),
                    ));
                }
            }
        }
    }

    /// `()` and `(a, ...)` are sequences, `(a)` is just `a`
    fn parse_parenthesized(&mut self, open: &Token) -> Result<DescriptorValue, ParseError> {
        if self.current.kind == TokenKind::RightParen {
            self.advance()?;
            return Ok(DescriptorValue::Sequence(Vec::new()));
        }

        let first = self.parse_value()?;
        self.reject_expression()?;

        match self.current.kind {
            TokenKind::RightParen => {
                self.advance()?;
                Ok(first)
            }
            TokenKind::Comma => {
                self.advance()?;
                self.parse_items(TokenKind::RightParen, open, vec![first])
                    .map(DescriptorValue::Sequence)
            }
            TokenKind::Eof => Err(syntax_error(open, "unterminated tuple, expected ')'")),
            ref other => Err(syntax_error(
                &self.current,
                format!("expected ',' or ')' in tuple, found {}", other.describe()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> DescriptorValue {
        parse_descriptor(source).unwrap_or_else(|e| panic!("{source:?} failed: {e}"))
    }

    fn json(source: &str) -> serde_json::Value {
        serde_json::to_value(parse(source)).unwrap()
    }

    fn error(source: &str) -> ParseError {
        parse_descriptor(source).expect_err(source)
    }

    #[test]
    fn test_binding_gyp_shape() {
        let source = r#"
# Build file for the native addon
{
  'variables': { 'use_sse%': 0 },
  'targets': [
    {
      'target_name': 'dawg',
      'sources': [ 'src/dawg.cpp', 'src/builder.cpp', ],  # trailing comma
      'include_dirs': [ "<!(node -e \"require('nan')\")" ],
      'cflags!': [ '-fno-exceptions' ],
      'conditions': [
        ['OS=="mac"', { 'xcode_settings': { 'GCC_ENABLE_CPP_EXCEPTIONS': 'YES' } }],
      ],
    },
  ],
}
"#;
        assert_eq!(
            json(source),
            serde_json::json!({
                "variables": {"use_sse%": 0},
                "targets": [{
                    "target_name": "dawg",
                    "sources": ["src/dawg.cpp", "src/builder.cpp"],
                    "include_dirs": ["<!(node -e \"require('nan')\")"],
                    "cflags!": ["-fno-exceptions"],
                    "conditions": [
                        ["OS==\"mac\"", {"xcode_settings": {"GCC_ENABLE_CPP_EXCEPTIONS": "YES"}}]
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse("42"), DescriptorValue::Integer(42));
        assert_eq!(parse("-7"), DescriptorValue::Integer(-7));
        assert_eq!(parse("+0x10"), DescriptorValue::Integer(16));
        assert_eq!(parse("2.5e1"), DescriptorValue::Float(25.0));
        assert_eq!(parse("- .5"), DescriptorValue::Float(-0.5));
        assert_eq!(parse("True"), DescriptorValue::Boolean(true));
        assert_eq!(parse("false"), DescriptorValue::Boolean(false));
        assert_eq!(parse("None"), DescriptorValue::Null);
        assert_eq!(parse("null"), DescriptorValue::Null);
        assert_eq!(
            parse("-9223372036854775808"),
            DescriptorValue::Integer(i64::MIN)
        );
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        assert_eq!(
            parse("'lib' \"foo\"\n  '.so'"),
            DescriptorValue::String("libfoo.so".to_string())
        );
        assert_eq!(json("{'a' 'b': 1}"), serde_json::json!({"ab": 1}));
    }

    #[test]
    fn test_bare_and_numeric_keys() {
        assert_eq!(
            json("{targets: [], 1: 'one', 'q': 2,}"),
            serde_json::json!({"targets": [], "1": "one", "q": 2})
        );
        assert_eq!(
            json("{1.0: 'a', 2.5: 'b', 0x10: 'c'}"),
            serde_json::json!({"1.0": "a", "2.5": "b", "16": "c"})
        );
    }

    #[test]
    fn test_duplicate_keys_keep_first_position_last_value() {
        let value = parse("{'a': 1, 'b': 2, 'a': 3}");
        let map = value.as_mapping().unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map["a"], DescriptorValue::Integer(3));
    }

    #[test]
    fn test_tuples() {
        assert_eq!(json("('a', 'b')"), serde_json::json!(["a", "b"]));
        assert_eq!(json("('a',)"), serde_json::json!(["a"]));
        assert_eq!(json("()"), serde_json::json!([]));
        assert_eq!(json("('a')"), serde_json::json!("a"));
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(json("{}"), serde_json::json!({}));
        assert_eq!(json("[ ]"), serde_json::json!([]));
    }

    #[test]
    fn test_names_and_calls_are_security_errors() {
        for source in [
            "{'a': os}",
            "__import__('os').system('true')",
            "[open('/etc/passwd')]",
            "{'a': lambda: 1}",
        ] {
            assert_eq!(error(source).kind, ParseErrorKind::Security, "{source}");
        }

        let err = error("[1, eval('2')]");
        assert!(err.message.contains("call to `eval`"));
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn test_operators_are_security_errors() {
        for source in ["1 + 2", "['a' * 3]", "{'a': [1][0]}", "{'a': 'x'.upper}", "~1", "-True"] {
            assert_eq!(error(source).kind, ParseErrorKind::Security, "{source}");
        }
    }

    #[test]
    fn test_word_operators_are_security_errors() {
        for source in [
            "True and False",
            "{'a': 1 if c else 2}",
            "['a' in x]",
            "(1 or 2)",
            "[x for x in y]",
            "not True",
            "{'a': None is None}",
        ] {
            assert_eq!(error(source).kind, ParseErrorKind::Security, "{source}");
        }

        let err = error("{'a': True and False}");
        assert!(err.message.contains("`and`"), "{}", err.message);
        assert_eq!((err.line, err.column), (1, 12));
    }

    #[test]
    fn test_syntax_errors() {
        for source in [
            "",
            "{'a' 1}",
            "{'a': 1",
            "[1, 2",
            "[1 2]",
            "{,}",
            "[,]",
            "{'a': 1} {'b': 2}",
            "99999999999999999999",
            "1e999",
            "(1 2)",
        ] {
            assert_eq!(error(source).kind, ParseErrorKind::Syntax, "{source:?}");
        }
    }

    #[test]
    fn test_unterminated_reports_opening_position() {
        let err = error("{\n  'targets': [\n    'a',\n");
        assert_eq!((err.line, err.column), (2, 14));
        assert!(err.message.contains("unterminated sequence"));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_descriptor(&deep).is_ok());

        let too_deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        let err = error(&too_deep);
        assert_eq!(err.kind, ParseErrorKind::Syntax);
        assert!(err.message.contains("nesting"));
    }
}
