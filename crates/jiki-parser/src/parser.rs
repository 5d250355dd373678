//! Core parser infrastructure: token cursor, error reporting, helpers.

use jiki_lexer::token::{Token, TokenKind};
use jiki_types::ast::{Ident, Node, Statement};
use jiki_types::{LanguageFeatures, Location, SyntaxError, SyntaxErrorKind};

pub(crate) type ParseResult<T> = Result<T, SyntaxError>;

/// Combined expression and statement nesting allowed before parsing stops.
pub const MAX_NESTING_DEPTH: usize = 128;

/// The Jiki parser.
///
/// Consumes a token stream produced by the scanner and builds a list of
/// statements. Parsing is all-or-nothing: the first error aborts the parse.
pub struct Parser {
    /// The token stream, always terminated by `Eof`.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Number of function bodies enclosing the current position.
    pub(crate) function_depth: u32,
    /// Number of loop bodies enclosing the current position, reset inside
    /// function bodies.
    pub(crate) loop_depth: u32,
    /// Current expression/statement nesting depth.
    depth: usize,
}

impl Parser {
    /// Create a new parser from a token stream.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let at = tokens
                .last()
                .map(|t| {
                    let end = t.location;
                    Location::point(end.line, end.absolute.end, end.relative.end)
                })
                .unwrap_or_else(|| Location::point(1, 0, 1));
            tokens.push(Token::new(TokenKind::Eof, "", at));
        }
        Self {
            tokens,
            pos: 0,
            function_depth: 0,
            loop_depth: 0,
            depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Location of the most recently consumed token.
    pub(crate) fn previous_location(&self) -> Location {
        match self.pos.checked_sub(1) {
            Some(index) => self.tokens[index].location,
            None => self.peek().location,
        }
    }

    pub(crate) fn current_location(&self) -> Location {
        self.peek().location
    }

    pub(crate) fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect `kind`, raising `error` at the current token otherwise.
    ///
    /// An unimplemented token in that position is reported as such instead.
    pub(crate) fn expect(&mut self, kind: TokenKind, error: SyntaxErrorKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(error))
        }
    }

    pub(crate) fn expect_semicolon(&mut self) -> ParseResult<Token> {
        let found = self.found();
        self.expect(TokenKind::Semicolon, SyntaxErrorKind::MissingSemicolon { found })
    }

    /// Expect an identifier, raising `error` at the current token otherwise.
    pub(crate) fn expect_identifier(&mut self, error: SyntaxErrorKind) -> ParseResult<Ident> {
        let token = self.expect(TokenKind::Identifier, error)?;
        Ok(Ident::new(token.lexeme, token.location))
    }

    /// Description of the current token for error contexts.
    pub(crate) fn found(&self) -> String {
        match self.peek_kind() {
            TokenKind::Eof => TokenKind::Eof.to_string(),
            _ => self.peek().lexeme.clone(),
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(kind, self.current_location())
    }

    /// Raise `error` at the current token, unless that token is a reserved
    /// but unimplemented word, which is the more useful thing to report.
    pub(crate) fn unexpected(&self, error: SyntaxErrorKind) -> SyntaxError {
        if self.check(TokenKind::Unimplemented) {
            self.error_at_current(SyntaxErrorKind::UnimplementedToken {
                token: self.peek().lexeme.clone(),
            })
        } else {
            self.error_at_current(error)
        }
    }

    // ── Nesting Guard ─────────────────────────────────────────────────────────

    /// Run `parse` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_at_current(SyntaxErrorKind::MaximumNestingDepthExceeded {
                max: MAX_NESTING_DEPTH,
            }));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until the start of the next statement.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.advance().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek_kind() {
                TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue => return,
                _ => {}
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the whole token stream into a program.
    ///
    /// An error inside a top-level statement first synchronizes to the next
    /// statement boundary, then aborts the parse with that error.
    pub fn parse(mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.at_end() {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.synchronize();
                    tracing::debug!(%error, location = %error.location, "parse failed");
                    return Err(error);
                }
            }
        }
        tracing::debug!(statements = statements.len(), "parsed program");
        Ok(statements)
    }
}

/// Reject the first node whose kind `features` does not allow.
pub fn check_allowed_nodes(
    statements: &[Statement],
    features: &LanguageFeatures,
) -> ParseResult<()> {
    if features.exclude_list.is_none() && features.include_list.is_none() {
        return Ok(());
    }
    for statement in statements {
        Node::Statement(statement).walk(&mut |node| {
            let kind = node.node_kind();
            if features.is_node_allowed(kind) {
                Ok(())
            } else {
                Err(SyntaxError::new(
                    SyntaxErrorKind::NodeNotAllowed { node: kind },
                    node.location(),
                ))
            }
        })?;
    }
    Ok(())
}
