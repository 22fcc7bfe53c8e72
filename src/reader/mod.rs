mod lexer;
mod parser;
mod token;

pub use lexer::Lexer;
pub use parser::Reader;
pub use token::{OwnedToken, SourceLoc, Token, TokenWithLoc};

use crate::error::ReadError;
use crate::symbol::SymbolTable;
use crate::value::Value;

fn tokenize(input: &str) -> Result<Reader, ReadError> {
    // Strip shebang if present (e.g., #!/usr/bin/env tether)
    let input = if input.starts_with("#!") {
        match input.find('\n') {
            Some(end) => &input[end..],
            None => "",
        }
    } else {
        input
    };

    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    let mut locations = Vec::new();

    while let Some(twl) = lexer.next_token_with_loc()? {
        tokens.push(OwnedToken::from(twl.token));
        locations.push(twl.loc);
    }

    Ok(Reader::new(tokens, locations))
}

/// Read a single form from a string
pub fn read_str(input: &str, symbols: &SymbolTable) -> Result<Value, ReadError> {
    let mut reader = tokenize(input)?;
    if reader.is_at_end() {
        return Err(ReadError::new("no input", SourceLoc::start()));
    }
    reader.read(symbols)
}

/// Read every form in a string
pub fn read_all(input: &str, symbols: &SymbolTable) -> Result<Vec<Value>, ReadError> {
    let mut reader = tokenize(input)?;
    let mut forms = Vec::new();
    while let Some(form) = reader.try_read(symbols) {
        forms.push(form?);
    }
    Ok(forms)
}
