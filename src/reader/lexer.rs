use super::token::{SourceLoc, Token, TokenWithLoc};
use crate::error::ReadError;

/// Checks if a character ends a symbol
#[inline]
fn is_delimiter(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | '\'' | '"' | ';')
}

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn get_loc(&self) -> SourceLoc {
        SourceLoc::new(self.line, self.col)
    }

    fn error(&self, message: impl Into<String>, loc: SourceLoc) -> ReadError {
        ReadError::new(message, loc)
    }

    fn current(&self) -> Option<char> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let byte = self.bytes[self.pos];
        if byte < 128 {
            Some(byte as char)
        } else {
            // Multi-byte UTF-8 character
            self.input[self.pos..].chars().next()
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current();
        if let Some(ch) = c {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += ch.len_utf8();
        }
        c
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn skip_whitespace(&mut self) {
        // A `#!` interpreter line at the very start reads as a comment
        if self.pos == 0 && self.input.starts_with("#!") {
            while let Some(c) = self.advance() {
                if c == '\n' {
                    break;
                }
            }
        }
        while let Some(c) = self.current() {
            if c.is_whitespace() || c == ',' {
                self.advance();
            } else if c == ';' {
                // Skip comment until newline
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, loc: SourceLoc) -> Result<String, ReadError> {
        self.advance(); // skip opening quote
        let mut s = String::new();
        loop {
            match self.current() {
                None => return Err(self.error("unterminated string", loc)),
                Some('"') => {
                    self.advance();
                    return Ok(s);
                }
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        Some('n') => s.push('\n'),
                        Some('t') => s.push('\t'),
                        Some('r') => s.push('\r'),
                        Some('\\') => s.push('\\'),
                        Some('"') => s.push('"'),
                        Some(c) => s.push(c),
                        None => return Err(self.error("unterminated string escape", loc)),
                    }
                    self.advance();
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Read a run of symbol characters and return a slice of the input
    fn read_symbol(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_whitespace() || c == ',' || is_delimiter(c) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos]
    }

    fn read_number(&mut self, loc: SourceLoc) -> Result<Token<'a>, ReadError> {
        let text = self.read_symbol();
        if text.contains('.') || text.contains('e') || text.contains('E') {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(format!("invalid float: {}", text), loc))
        } else {
            text.parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| self.error(format!("invalid integer: {}", text), loc))
        }
    }

    pub fn next_token_with_loc(&mut self) -> Result<Option<TokenWithLoc<'a>>, ReadError> {
        self.skip_whitespace();
        let loc = self.get_loc();

        let token = match self.current() {
            None => return Ok(None),
            Some('(') => {
                self.advance();
                Token::LeftParen
            }
            Some(')') => {
                self.advance();
                Token::RightParen
            }
            Some('[') => {
                self.advance();
                Token::LeftBracket
            }
            Some(']') => {
                self.advance();
                Token::RightBracket
            }
            Some('\'') => {
                self.advance();
                Token::Quote
            }
            Some('"') => Token::String(self.read_string(loc)?),
            Some(':') => {
                self.advance();
                let keyword = self.read_symbol();
                if keyword.is_empty() {
                    return Err(self.error("invalid keyword: expected name after :", loc));
                }
                Token::Keyword(keyword)
            }
            Some(c) if c.is_ascii_digit() => self.read_number(loc)?,
            Some('-' | '+') if self.peek(1).is_some_and(|n| n.is_ascii_digit()) => {
                self.read_number(loc)?
            }
            Some(_) => match self.read_symbol() {
                "nil" => Token::Nil,
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                sym => Token::Symbol(sym),
            },
        };
        Ok(Some(TokenWithLoc { token, loc }))
    }

    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, ReadError> {
        self.next_token_with_loc()
            .map(|opt| opt.map(|twl| twl.token))
    }
}
