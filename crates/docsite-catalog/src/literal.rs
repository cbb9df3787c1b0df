//! Recursive-descent parser for the restricted literal grammar used by the
//! embedded catalog data.
//!
//! The catalog source embeds a script-style array literal. Rather than
//! evaluating it, this module parses a deliberately small superset of JSON:
//! arrays, objects with bare or quoted keys, single/double/backtick strings,
//! numbers, booleans, null, trailing commas, and `//` / `/* */` comments.
//! Nothing here is executable.

use thiserror::Error;

/// Parsed literal value.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Literal>),
    Object(Vec<(String, Literal)>),
}

impl Literal {
    /// Return the string payload, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(value) => Some(value),
            _ => None,
        }
    }

    /// Look up a key on an object value.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Literal::Object(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

/// Errors raised while parsing a literal. Offsets are byte positions into
/// the literal span, not the surrounding document.
#[derive(Debug, Error)]
pub enum LiteralError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEnd(usize),
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("invalid number at offset {0}")]
    InvalidNumber(usize),
    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("unterminated comment starting at offset {0}")]
    UnterminatedComment(usize),
    #[error("trailing content at offset {0}")]
    TrailingContent(usize),
}

/// Parse a complete literal, requiring the whole input to be consumed.
pub fn parse_literal(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser { input, pos: 0 };
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.pos < parser.input.len() {
        return Err(LiteralError::TrailingContent(parser.pos));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            Some(found) => Err(LiteralError::UnexpectedChar {
                found,
                offset: self.pos,
            }),
            None => Err(LiteralError::UnexpectedEnd(self.pos)),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let start = self.pos;
                    match self.input[self.pos..].get(..2) {
                        Some("//") => {
                            while let Some(ch) = self.peek() {
                                if ch == '\n' {
                                    break;
                                }
                                self.bump();
                            }
                        }
                        Some("/*") => {
                            self.pos += 2;
                            match self.input[self.pos..].find("*/") {
                                Some(end) => self.pos += end + 2,
                                None => return Err(LiteralError::UnterminatedComment(start)),
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            Some('[') => self.parse_array(),
            Some('{') => self.parse_object(),
            Some('"') | Some('\'') | Some('`') => self.parse_string().map(Literal::String),
            Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '+' || ch == '.' => {
                self.parse_number()
            }
            Some(ch) if is_ident_start(ch) => self.parse_keyword(),
            Some(found) => Err(LiteralError::UnexpectedChar {
                found,
                offset: self.pos,
            }),
            None => Err(LiteralError::UnexpectedEnd(self.pos)),
        }
    }

    fn parse_array(&mut self) -> Result<Literal, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Literal::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                Some(found) => {
                    return Err(LiteralError::UnexpectedChar {
                        found,
                        offset: self.pos,
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd(self.pos)),
            }
        }
    }

    fn parse_object(&mut self) -> Result<Literal, LiteralError> {
        self.expect('{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Literal::Object(entries));
            }
            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            entries.push((key, value));
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                Some(found) => {
                    return Err(LiteralError::UnexpectedChar {
                        found,
                        offset: self.pos,
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd(self.pos)),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some('"') | Some('\'') | Some('`') => self.parse_string(),
            Some(ch) if is_ident_start(ch) => {
                let start = self.pos;
                while let Some(ch) = self.peek() {
                    if is_ident_continue(ch) {
                        self.bump();
                    } else {
                        break;
                    }
                }
                Ok(self.input[start..self.pos].to_owned())
            }
            Some(found) => Err(LiteralError::UnexpectedChar {
                found,
                offset: self.pos,
            }),
            None => Err(LiteralError::UnexpectedEnd(self.pos)),
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        let quote = self.bump().ok_or(LiteralError::UnexpectedEnd(start))?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(value),
                Some('\\') => {
                    let escape_pos = self.pos;
                    match self.bump() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('0') => value.push('\0'),
                        Some('u') => value.push(self.parse_unicode_escape(escape_pos)?),
                        // JS semantics: an unrecognised escape yields the
                        // character itself (covers \\ \' \" \` \/ and more)
                        Some(other) => value.push(other),
                        None => return Err(LiteralError::UnterminatedString(start)),
                    }
                }
                Some(ch) => value.push(ch),
                None => return Err(LiteralError::UnterminatedString(start)),
            }
        }
    }

    fn parse_unicode_escape(&mut self, escape_pos: usize) -> Result<char, LiteralError> {
        let hex = self
            .input
            .get(self.pos..self.pos + 4)
            .ok_or(LiteralError::InvalidEscape(escape_pos))?;
        let code =
            u32::from_str_radix(hex, 16).map_err(|_| LiteralError::InvalidEscape(escape_pos))?;
        self.pos += 4;
        char::from_u32(code).ok_or(LiteralError::InvalidEscape(escape_pos))
    }

    fn parse_number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' || ch == 'e' || ch == 'E' {
                self.bump();
            } else if (ch == '-' || ch == '+')
                && matches!(
                    self.input[..self.pos].chars().next_back(),
                    Some('e') | Some('E')
                )
            {
                self.bump();
            } else {
                break;
            }
        }
        self.input[start..self.pos]
            .parse::<f64>()
            .map(Literal::Number)
            .map_err(|_| LiteralError::InvalidNumber(start))
    }

    fn parse_keyword(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if is_ident_continue(ch) {
                self.bump();
            } else {
                break;
            }
        }
        match &self.input[start..self.pos] {
            "true" => Ok(Literal::Bool(true)),
            "false" => Ok(Literal::Bool(false)),
            "null" | "undefined" => Ok(Literal::Null),
            _ => Err(LiteralError::UnexpectedChar {
                found: self.input[start..].chars().next().unwrap_or('\0'),
                offset: start,
            }),
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars() {
        assert_eq!(parse_literal("true").unwrap(), Literal::Bool(true));
        assert_eq!(parse_literal("null").unwrap(), Literal::Null);
        assert_eq!(parse_literal("-1.5e2").unwrap(), Literal::Number(-150.0));
        assert_eq!(
            parse_literal("'单引号'").unwrap(),
            Literal::String("单引号".to_owned())
        );
    }

    #[test]
    fn parses_nested_structure_with_bare_keys() {
        let value = parse_literal(r#"[{id: "a", items: [{title: "X", count: 2}]}]"#).unwrap();
        let Literal::Array(sections) = &value else {
            panic!("expected array");
        };
        let section = &sections[0];
        assert_eq!(section.get("id").and_then(Literal::as_str), Some("a"));
        let Some(Literal::Array(items)) = section.get("items") else {
            panic!("expected items array");
        };
        assert_eq!(items[0].get("count"), Some(&Literal::Number(2.0)));
    }

    #[test]
    fn tolerates_trailing_commas_and_comments() {
        let value = parse_literal(
            "[\n  // first entry\n  { id: 'a', /* inline */ title: \"A\", },\n]",
        )
        .unwrap();
        let Literal::Array(items) = value else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("title").and_then(Literal::as_str), Some("A"));
    }

    #[test]
    fn string_escapes_follow_source_semantics() {
        assert_eq!(
            parse_literal(r#""a\nb中\"c""#).unwrap(),
            Literal::String("a\nb中\"c".to_owned())
        );
    }

    #[test]
    fn rejects_unterminated_input() {
        assert!(matches!(
            parse_literal("[{id: 'a'"),
            Err(LiteralError::UnexpectedEnd(_))
        ));
        assert!(matches!(
            parse_literal("'open"),
            Err(LiteralError::UnterminatedString(_))
        ));
        assert!(matches!(
            parse_literal("/* open"),
            Err(LiteralError::UnterminatedComment(_))
        ));
    }

    #[test]
    fn rejects_executable_content() {
        // function calls and identifiers are outside the grammar
        assert!(parse_literal("require('fs')").is_err());
        assert!(parse_literal("[globalThis]").is_err());
    }
}
