//! Tokenization of Pallene source.
//!
//! The lexer is a linear byte-level scanner: byte positions (not codepoints)
//! feed the location table, so later stages that reproduce source geometry
//! can rely on token spans matching the raw input. Integer and float
//! literals are distinguished here and stay distinct for the rest of the
//! pipeline. Comment spans are collected separately because the Lua
//! translator must preserve comment bytes inside stripped regions.

mod token;

pub use token::*;

use std::collections::HashMap;
use std::rc::Rc;
use std::{error::Error, fmt::Display};

use once_cell::sync::Lazy;

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("and", TokenKind::And);
    m.insert("as", TokenKind::As);
    m.insert("break", TokenKind::Break);
    m.insert("do", TokenKind::Do);
    m.insert("else", TokenKind::Else);
    m.insert("elseif", TokenKind::Elseif);
    m.insert("end", TokenKind::End);
    m.insert("export", TokenKind::Export);
    m.insert("false", TokenKind::False);
    m.insert("for", TokenKind::For);
    m.insert("function", TokenKind::Function);
    m.insert("if", TokenKind::If);
    m.insert("import", TokenKind::Import);
    m.insert("local", TokenKind::Local);
    m.insert("nil", TokenKind::Nil);
    m.insert("not", TokenKind::Not);
    m.insert("or", TokenKind::Or);
    m.insert("record", TokenKind::Record);
    m.insert("repeat", TokenKind::Repeat);
    m.insert("return", TokenKind::Return);
    m.insert("then", TokenKind::Then);
    m.insert("true", TokenKind::True);
    m.insert("typealias", TokenKind::Typealias);
    m.insert("until", TokenKind::Until);
    m.insert("while", TokenKind::While);
    m
});

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LexError {
    pub message: String,
    pub loc: Loc,
}

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: syntax: {}", self.loc, self.message)
    }
}

impl Error for LexError {}

pub type LexResult<T> = Result<T, LexError>;

/// Everything the lexer produces: the token stream and the byte spans of
/// all comments in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub comments: Vec<(usize, usize)>,
}

pub struct Lexer<'a> {
    input: &'a [u8],
    file: Rc<str>,
    pos: usize,
    line: u32,
    col: u32,
    tokens: Vec<Token>,
    comments: Vec<(usize, usize)>,
}

impl<'a> Lexer<'a> {
    pub fn new(file: impl Into<Rc<str>>, input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            file: file.into(),
            pos: 0,
            line: 1,
            col: 1,
            tokens: vec![],
            comments: vec![],
        }
    }

    fn loc(&self) -> Loc {
        Loc::new(self.file.clone(), self.pos, self.line, self.col)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(byte)
    }

    fn error(&self, loc: Loc, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            loc,
        }
    }

    fn push(&mut self, kind: TokenKind, loc: Loc) {
        let len = self.pos - loc.pos;
        self.tokens.push(Token { kind, loc, len });
    }

    pub fn lex(mut self) -> LexResult<LexOutput> {
        loop {
            self.eat_trivia()?;
            let Some(next) = self.peek() else {
                break;
            };

            match next {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_name(),
                b'0'..=b'9' => self.lex_number()?,
                b'.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => self.lex_number()?,
                b'"' | b'\'' => self.lex_string()?,
                _ => self.lex_symbol()?,
            }
        }

        let eof = self.loc();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            loc: eof,
            len: 0,
        });

        Ok(LexOutput {
            tokens: self.tokens,
            comments: self.comments,
        })
    }

    /// Skip whitespace and comments, recording comment byte spans.
    fn eat_trivia(&mut self) -> LexResult<()> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    self.lex_comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_comment(&mut self) -> LexResult<()> {
        let start = self.pos;
        let loc = self.loc();
        self.advance();
        self.advance();

        if self.peek() == Some(b'[') && self.peek_at(1) == Some(b'[') {
            self.advance();
            self.advance();
            loop {
                match self.peek() {
                    Some(b']') if self.peek_at(1) == Some(b']') => {
                        self.advance();
                        self.advance();
                        break;
                    }
                    Some(_) => {
                        self.advance();
                    }
                    None => return Err(self.error(loc, "unterminated long comment")),
                }
            }
        } else {
            while let Some(byte) = self.peek() {
                if byte == b'\n' {
                    break;
                }
                self.advance();
            }
        }

        self.comments.push((start, self.pos));
        Ok(())
    }

    fn lex_name(&mut self) {
        let loc = self.loc();
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b'_' {
                self.advance();
            } else {
                break;
            }
        }

        // the input slice is valid UTF-8 and names are pure ASCII
        let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap();
        let kind = match KEYWORDS.get(text) {
            Some(keyword) => keyword.clone(),
            None => TokenKind::Name(text.to_string()),
        };
        self.push(kind, loc);
    }

    fn lex_number(&mut self) -> LexResult<()> {
        let loc = self.loc();
        let start = self.pos;

        if self.peek() == Some(b'0')
            && matches!(self.peek_at(1), Some(b'x') | Some(b'X'))
        {
            self.advance();
            self.advance();
            let digits = self.pos;
            while matches!(self.peek(), Some(b) if b.is_ascii_hexdigit()) {
                self.advance();
            }
            if self.pos == digits {
                return Err(self.error(loc, "malformed number"));
            }
            let text = std::str::from_utf8(&self.input[digits..self.pos]).unwrap();
            // hex literals wrap around like in Lua
            let value = u64::from_str_radix(text, 16)
                .map_err(|_| self.error(loc.clone(), "hexadecimal literal is too large"))?;
            self.push(TokenKind::Integer(value as i64), loc);
            return Ok(());
        }

        let mut is_float = false;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if self.peek() == Some(b'.') {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            is_float = true;
            self.advance();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.advance();
            }
            let exp = self.pos;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
            if self.pos == exp {
                return Err(self.error(loc, "malformed number"));
            }
        }

        let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap();
        if is_float {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.error(loc.clone(), "malformed number"))?;
            self.push(TokenKind::Float(value), loc);
        } else {
            // decimal integers that overflow become floats, as in Lua
            match text.parse::<i64>() {
                Ok(value) => self.push(TokenKind::Integer(value), loc),
                Err(_) => {
                    let value = text
                        .parse::<f64>()
                        .map_err(|_| self.error(loc.clone(), "malformed number"))?;
                    self.push(TokenKind::Float(value), loc);
                }
            }
        }
        Ok(())
    }

    fn lex_string(&mut self) -> LexResult<()> {
        let loc = self.loc();
        let quote = self.advance().unwrap();
        let mut value: Vec<u8> = vec![];

        loop {
            let Some(byte) = self.advance() else {
                return Err(self.error(loc, "unterminated string"));
            };
            match byte {
                b'\n' => return Err(self.error(loc, "unterminated string")),
                b'\\' => {
                    let Some(escape) = self.advance() else {
                        return Err(self.error(loc, "unterminated string"));
                    };
                    match escape {
                        b'n' => value.push(b'\n'),
                        b't' => value.push(b'\t'),
                        b'r' => value.push(b'\r'),
                        b'a' => value.push(0x07),
                        b'b' => value.push(0x08),
                        b'f' => value.push(0x0c),
                        b'v' => value.push(0x0b),
                        b'\\' => value.push(b'\\'),
                        b'"' => value.push(b'"'),
                        b'\'' => value.push(b'\''),
                        b'\n' => value.push(b'\n'),
                        b'x' => {
                            let mut code = 0u32;
                            for _ in 0..2 {
                                let Some(digit) = self.advance() else {
                                    return Err(self.error(loc, "unterminated string"));
                                };
                                let digit = (digit as char)
                                    .to_digit(16)
                                    .ok_or_else(|| {
                                        self.error(
                                            self.loc(),
                                            "hexadecimal digit expected in escape sequence",
                                        )
                                    })?;
                                code = code * 16 + digit;
                            }
                            value.push(code as u8);
                        }
                        b'0'..=b'9' => {
                            let mut code = (escape - b'0') as u32;
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(digit @ b'0'..=b'9') => {
                                        self.advance();
                                        code = code * 10 + (digit - b'0') as u32;
                                    }
                                    _ => break,
                                }
                            }
                            if code > 255 {
                                return Err(
                                    self.error(self.loc(), "decimal escape is too large")
                                );
                            }
                            value.push(code as u8);
                        }
                        other => {
                            return Err(self.error(
                                self.loc(),
                                format!("invalid escape sequence '\\{}'", other as char),
                            ));
                        }
                    }
                }
                _ if byte == quote => break,
                _ => value.push(byte),
            }
        }

        let value = String::from_utf8_lossy(&value).into_owned();
        self.push(TokenKind::Str(value), loc);
        Ok(())
    }

    fn lex_symbol(&mut self) -> LexResult<()> {
        let loc = self.loc();
        let byte = self.advance().unwrap();

        let kind = match byte {
            b'+' => TokenKind::Plus,
            b'-' => {
                if self.peek() == Some(b'>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => TokenKind::Star,
            b'/' => {
                if self.peek() == Some(b'/') {
                    self.advance();
                    TokenKind::DoubleSlash
                } else {
                    TokenKind::Slash
                }
            }
            b'%' => TokenKind::Percent,
            b'^' => TokenKind::Caret,
            b'#' => TokenKind::Hash,
            b'&' => TokenKind::Ampersand,
            b'~' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    TokenKind::Tilde
                }
            }
            b'|' => TokenKind::Pipe,
            b'<' => match self.peek() {
                Some(b'<') => {
                    self.advance();
                    TokenKind::ShiftLeft
                }
                Some(b'=') => {
                    self.advance();
                    TokenKind::LessEq
                }
                _ => TokenKind::Less,
            },
            b'>' => match self.peek() {
                Some(b'>') => {
                    self.advance();
                    TokenKind::ShiftRight
                }
                Some(b'=') => {
                    self.advance();
                    TokenKind::GreaterEq
                }
                _ => TokenKind::Greater,
            },
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b';' => TokenKind::Semicolon,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b'.' => {
                if self.peek() == Some(b'.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            other => {
                return Err(self.error(
                    loc,
                    format!("unexpected symbol near '{}'", other as char),
                ));
            }
        };

        self.push(kind, loc);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new("test.pln", input)
            .lex()
            .unwrap()
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_lex_keywords_and_names() {
        assert_eq!(
            kinds("local xs"),
            vec![
                TokenKind::Local,
                TokenKind::Name("xs".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_integer_and_float_are_distinct() {
        assert_eq!(
            kinds("1 1.0 2e3 0x10"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Float(1.0),
                TokenKind::Float(2000.0),
                TokenKind::Integer(16),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_positions_across_lines() {
        let out = Lexer::new("test.pln", "local x\n  = 1\n").lex().unwrap();
        let tok = &out.tokens[2];
        assert_eq!(tok.kind, TokenKind::Assign);
        assert_eq!(tok.loc.line, 2);
        assert_eq!(tok.loc.col, 3);
        assert_eq!(tok.loc.pos, 10);
    }

    #[test]
    fn test_comment_spans_recorded() {
        let src = "local x -- trailing\n--[[ block\ncomment ]] local y";
        let out = Lexer::new("test.pln", src).lex().unwrap();
        assert_eq!(out.comments.len(), 2);
        let (start, end) = out.comments[0];
        assert_eq!(&src[start..end], "-- trailing");
        let (start, end) = out.comments[1];
        assert_eq!(&src[start..end], "--[[ block\ncomment ]]");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\n\t\065\x41""#),
            vec![TokenKind::Str("a\n\tAA".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_shift_and_compare_tokens() {
        assert_eq!(
            kinds("< << <= ~ ~= .."),
            vec![
                TokenKind::Less,
                TokenKind::ShiftLeft,
                TokenKind::LessEq,
                TokenKind::Tilde,
                TokenKind::NotEq,
                TokenKind::DotDot,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("test.pln", "\"abc").lex().unwrap_err();
        assert!(err.message.contains("unterminated string"));
        assert_eq!(err.loc.line, 1);
        assert_eq!(err.loc.col, 1);
    }
}
