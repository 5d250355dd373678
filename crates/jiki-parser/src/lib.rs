//! Jiki parser: converts a token stream into a list of statements.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{check_allowed_nodes, Parser, MAX_NESTING_DEPTH};

use jiki_types::ast::Statement;
use jiki_types::{LanguageFeatures, SyntaxError};

/// Scan and parse `source`, then reject nodes that `features` disallows.
///
/// Any syntax error aborts the whole parse; no partial program is returned.
pub fn parse(source: &str, features: &LanguageFeatures) -> Result<Vec<Statement>, SyntaxError> {
    let tokens = jiki_lexer::scan_tokens(source)?;
    let statements = Parser::new(tokens).parse()?;
    check_allowed_nodes(&statements, features)?;
    Ok(statements)
}
