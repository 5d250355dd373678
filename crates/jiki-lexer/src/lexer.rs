//! Core Jiki scanner: converts source text to a token stream.
//!
//! - Single pass with per-character dispatch
//! - `//` line comments and `/* */` block comments are skipped
//! - Whitespace, including newlines, separates tokens and is otherwise ignored
//! - Fails fast: the first problem aborts scanning with a [`SyntaxError`]
//! - The stream always ends with a zero-width [`TokenKind::Eof`]

use jiki_types::ast::LiteralValue;
use jiki_types::{Location, OffsetRange, SyntaxError, SyntaxErrorKind};

use crate::token::{Token, TokenKind};

type ScanResult<T> = Result<T, SyntaxError>;

/// Position of the first byte of a token, captured before it is consumed.
#[derive(Debug, Clone, Copy)]
struct Mark {
    offset: usize,
    line: u32,
    column: usize,
}

/// The Jiki scanner.
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Byte offset at which the current line starts.
    line_start: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Scan the whole source into a token stream.
    pub fn lex(mut self) -> ScanResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.at_end() {
                break;
            }
            tokens.push(self.scan_token()?);
        }
        let mark = self.mark();
        tokens.push(Token::new(TokenKind::Eof, "", self.location_from(mark)));
        tracing::trace!(count = tokens.len(), "scanned tokens");
        Ok(tokens)
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(ch)
    }

    /// Consume the next byte if it equals `expected`.
    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn mark(&self) -> Mark {
        Mark {
            offset: self.pos,
            line: self.line,
            column: self.pos - self.line_start + 1,
        }
    }

    /// Location from `mark` up to the current position.
    fn location_from(&self, mark: Mark) -> Location {
        let len = self.pos - mark.offset;
        Location::new(
            mark.line,
            OffsetRange::new(mark.offset, self.pos),
            OffsetRange::new(mark.column, mark.column + len),
        )
    }

    fn lexeme_from(&self, mark: Mark) -> &'src str {
        &self.source[mark.offset..self.pos]
    }

    fn token_from(&self, kind: TokenKind, mark: Mark) -> Token {
        Token::new(kind, self.lexeme_from(mark), self.location_from(mark))
    }

    fn error_from(&self, kind: SyntaxErrorKind, mark: Mark) -> SyntaxError {
        SyntaxError::new(kind, self.location_from(mark))
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    fn skip_trivia(&mut self) -> ScanResult<()> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while self.peek().is_some_and(|ch| ch != b'\n') {
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> ScanResult<()> {
        let mark = self.mark();
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error_from(SyntaxErrorKind::MissingCommentTerminator, mark))
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> ScanResult<Token> {
        let mark = self.mark();
        let Some(ch) = self.advance() else {
            return Ok(self.token_from(TokenKind::Eof, mark));
        };

        let kind = match ch {
            b'"' => return self.scan_string(mark),
            b'0'..=b'9' => return self.scan_number(mark),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => return Ok(self.scan_identifier(mark)),

            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b'{' => TokenKind::LeftBrace,
            b'}' => TokenKind::RightBrace,
            b'[' => TokenKind::LeftBracket,
            b']' => TokenKind::RightBracket,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b';' => TokenKind::Semicolon,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,

            b'*' => {
                if self.eat(b'*') {
                    TokenKind::StarStar
                } else {
                    TokenKind::Star
                }
            }
            b'=' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::EqualEqualEqual
                    } else {
                        TokenKind::EqualEqual
                    }
                } else {
                    TokenKind::Equal
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::BangEqualEqual
                    } else {
                        TokenKind::BangEqual
                    }
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.eat(b'=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }
            b'>' => {
                if self.eat(b'=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            b'&' => {
                if self.eat(b'&') {
                    TokenKind::AndAnd
                } else {
                    TokenKind::Unimplemented
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    TokenKind::OrOr
                } else {
                    TokenKind::Unimplemented
                }
            }
            b'?' | b':' => TokenKind::Unimplemented,

            _ => return Err(self.unknown_character(mark)),
        };
        Ok(self.token_from(kind, mark))
    }

    /// Report the full (possibly multi-byte) character starting at `mark`.
    fn unknown_character(&mut self, mark: Mark) -> SyntaxError {
        let character = self.source[mark.offset..].chars().next().unwrap_or('\0');
        // The first byte is already consumed; step over any continuation bytes.
        self.pos = mark.offset + character.len_utf8();
        self.error_from(
            SyntaxErrorKind::UnknownCharacter {
                character: character.to_string(),
            },
            mark,
        )
    }

    // ─────────────────────────────────────────────────────────────
    // Literals
    // ─────────────────────────────────────────────────────────────

    /// `digits [ "." digits ] [ ("e" | "E") [ "+" | "-" ] digits ]`
    fn scan_number(&mut self, mark: Mark) -> ScanResult<Token> {
        self.skip_digits();

        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.skip_digits();
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.advance();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.advance();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error_from(
                    SyntaxErrorKind::InvalidNumericLiteral {
                        lexeme: self.lexeme_from(mark).to_string(),
                    },
                    mark,
                ));
            }
            self.skip_digits();
        }

        let lexeme = self.lexeme_from(mark);
        let value: f64 = lexeme.parse().map_err(|_| {
            self.error_from(
                SyntaxErrorKind::InvalidNumericLiteral {
                    lexeme: lexeme.to_string(),
                },
                mark,
            )
        })?;
        Ok(self
            .token_from(TokenKind::Number, mark)
            .with_literal(LiteralValue::Number(value)))
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Scan a string literal; the opening `"` is already consumed.
    /// Strings may not span lines.
    fn scan_string(&mut self, mark: Mark) -> ScanResult<Token> {
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(self.error_from(
                        SyntaxErrorKind::MissingDoubleQuoteToTerminateString {
                            string: self.lexeme_from(mark).to_string(),
                        },
                        mark,
                    ));
                }
                Some(b'"') => {
                    self.advance();
                    return Ok(self
                        .token_from(TokenKind::String, mark)
                        .with_literal(LiteralValue::String(value)));
                }
                Some(b'\\') => value.push(self.scan_escape_sequence()?),
                Some(_) => {
                    // Copy whole characters so multi-byte text survives intact.
                    let rest = &self.source[self.pos..];
                    let ch = rest.chars().next().unwrap_or('\0');
                    self.pos += ch.len_utf8();
                    value.push(ch);
                }
            }
        }
    }

    fn scan_escape_sequence(&mut self) -> ScanResult<char> {
        let mark = self.mark();
        self.advance();
        let escaped = match self.peek() {
            Some(b'n') => '\n',
            Some(b't') => '\t',
            Some(b'r') => '\r',
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            // A lone backslash before end of line or input is reported as an
            // unterminated string by the caller.
            None | Some(b'\n') => return Ok('\\'),
            Some(_) => {
                let ch = self.source[self.pos..].chars().next().unwrap_or('\0');
                self.pos += ch.len_utf8();
                return Err(self.error_from(
                    SyntaxErrorKind::InvalidEscapeSequence {
                        sequence: self.lexeme_from(mark).to_string(),
                    },
                    mark,
                ));
            }
        };
        self.advance();
        Ok(escaped)
    }

    fn scan_identifier(&mut self, mark: Mark) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let word = self.lexeme_from(mark);
        let kind = TokenKind::from_keyword(word).unwrap_or(TokenKind::Identifier);
        self.token_from(kind, mark)
    }
}
