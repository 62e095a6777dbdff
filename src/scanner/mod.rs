pub mod lexer;
pub mod token;

use crate::error::CompileError;
use token::Token;

/// Scan source text into tokens. The list always ends with one `Eof` token;
/// on `Err` every lexical error found in the whole input is returned.
pub fn scan(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    lexer::scan_all(source)
}
