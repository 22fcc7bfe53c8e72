use super::token::{OwnedToken, SourceLoc};
use crate::error::ReadError;
use crate::symbol::SymbolTable;
use crate::value::{Symbol, Value};

pub struct Reader {
    tokens: Vec<OwnedToken>,
    locations: Vec<SourceLoc>,
    pos: usize,
}

impl Reader {
    pub fn new(tokens: Vec<OwnedToken>, locations: Vec<SourceLoc>) -> Self {
        Reader {
            tokens,
            locations,
            pos: 0,
        }
    }

    fn current(&self) -> Option<&OwnedToken> {
        self.tokens.get(self.pos)
    }

    fn current_location(&self) -> SourceLoc {
        self.locations.get(self.pos).copied().unwrap_or_else(|| {
            // Past the end: report the last token's location
            self.locations
                .last()
                .copied()
                .unwrap_or_else(SourceLoc::start)
        })
    }

    fn advance(&mut self) -> Option<OwnedToken> {
        let token = self.current().cloned();
        self.pos += 1;
        token
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Try to read a single value from the token stream.
    /// Returns None at EOF (not an error), Some(Err(_)) on a parse error.
    pub fn try_read(&mut self, symbols: &SymbolTable) -> Option<Result<Value, ReadError>> {
        let token = self.current().cloned()?;
        Some(self.read_one(symbols, &token))
    }

    pub fn read(&mut self, symbols: &SymbolTable) -> Result<Value, ReadError> {
        match self.try_read(symbols) {
            Some(result) => result,
            None => Err(ReadError::new(
                "unexpected end of input",
                self.current_location(),
            )),
        }
    }

    fn read_one(&mut self, symbols: &SymbolTable, token: &OwnedToken) -> Result<Value, ReadError> {
        let loc = self.current_location();
        match token {
            OwnedToken::LeftParen => self.read_seq(symbols, OwnedToken::RightParen, "list")
                .map(Value::list),
            OwnedToken::LeftBracket => self
                .read_seq(symbols, OwnedToken::RightBracket, "vector")
                .map(Value::vector),
            OwnedToken::Quote => {
                self.advance();
                let val = self.read(symbols)?;
                let quote = symbol(symbols, "quote");
                Ok(Value::list(vec![quote, val]))
            }
            OwnedToken::Integer(n) => {
                self.advance();
                Ok(Value::Int(*n))
            }
            OwnedToken::Float(f) => {
                self.advance();
                Ok(Value::Float(*f))
            }
            OwnedToken::String(s) => {
                self.advance();
                Ok(Value::string(s))
            }
            OwnedToken::Bool(b) => {
                self.advance();
                Ok(Value::Bool(*b))
            }
            OwnedToken::Nil => {
                self.advance();
                Ok(Value::Nil)
            }
            OwnedToken::Symbol(s) => {
                self.advance();
                Ok(symbol(symbols, s))
            }
            OwnedToken::Keyword(s) => {
                self.advance();
                Ok(Value::keyword(s))
            }
            OwnedToken::RightParen => Err(ReadError::new("unexpected closing parenthesis", loc)),
            OwnedToken::RightBracket => Err(ReadError::new("unexpected closing bracket", loc)),
        }
    }

    fn read_seq(
        &mut self,
        symbols: &SymbolTable,
        close: OwnedToken,
        what: &str,
    ) -> Result<Vec<Value>, ReadError> {
        let open_loc = self.current_location();
        self.advance(); // skip opening delimiter
        let mut elements = Vec::new();

        loop {
            match self.current() {
                None => {
                    return Err(ReadError::new(format!("unterminated {}", what), open_loc));
                }
                Some(token) if *token == close => {
                    self.advance();
                    return Ok(elements);
                }
                _ => elements.push(self.read(symbols)?),
            }
        }
    }
}

fn symbol(symbols: &SymbolTable, name: &str) -> Value {
    let id = symbols.intern(name);
    Value::Symbol(Symbol {
        id,
        name: name.into(),
    })
}
