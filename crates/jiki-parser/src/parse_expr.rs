//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 9. `||`
//! 8. `&&`
//! 7. `==`, `!=`, `===`, `!==`
//! 6. `<`, `<=`, `>`, `>=`
//! 5. `+`, `-`
//! 4. `*`, `/`, `%`
//! 3. unary `!`, `-`
//! 2. `**` (right-associative)
//! 1. `()` (call), `[]` (subscript), `.` (member)

use jiki_lexer::token::TokenKind;
use jiki_types::ast::*;
use jiki_types::SyntaxErrorKind;

use crate::parser::{ParseResult, Parser};

impl Parser {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.nested(Self::parse_or)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `OrExpr = AndExpr { "||" AndExpr }`
    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and()?;
        while self.eat(TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = logical(left, LogicalOperator::Or, right);
        }
        Ok(left)
    }

    /// `AndExpr = EqualityExpr { "&&" EqualityExpr }`
    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_equality()?;
        while self.eat(TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            left = logical(left, LogicalOperator::And, right);
        }
        Ok(left)
    }

    /// `EqualityExpr = CompExpr { ("==" | "!=" | "===" | "!==") CompExpr }`
    fn parse_equality(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_comparison()?;
        loop {
            let operator = match self.peek_kind() {
                TokenKind::EqualEqual => BinaryOperator::Equal,
                TokenKind::BangEqual => BinaryOperator::NotEqual,
                TokenKind::EqualEqualEqual => BinaryOperator::StrictEqual,
                TokenKind::BangEqualEqual => BinaryOperator::StrictNotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(left, operator, right);
        }
        Ok(left)
    }

    /// `CompExpr = AddExpr { ("<" | "<=" | ">" | ">=") AddExpr }`
    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_add()?;
        loop {
            let operator = match self.peek_kind() {
                TokenKind::Less => BinaryOperator::Less,
                TokenKind::LessEqual => BinaryOperator::LessEqual,
                TokenKind::Greater => BinaryOperator::Greater,
                TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_add()?;
            left = binary(left, operator, right);
        }
        Ok(left)
    }

    /// `AddExpr = MulExpr { ("+" | "-") MulExpr }`
    fn parse_add(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_mul()?;
        loop {
            let operator = match self.peek_kind() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul()?;
            left = binary(left, operator, right);
        }
        Ok(left)
    }

    /// `MulExpr = UnaryExpr { ("*" | "/" | "%") UnaryExpr }`
    fn parse_mul(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let operator = match self.peek_kind() {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                TokenKind::Percent => BinaryOperator::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(left, operator, right);
        }
        Ok(left)
    }

    /// `UnaryExpr = ("!" | "-") UnaryExpr | PowerExpr`
    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let operator = match self.peek_kind() {
            TokenKind::Bang => UnaryOperator::Not,
            TokenKind::Minus => UnaryOperator::Negate,
            _ => return self.parse_power(),
        };
        let start = self.advance().location;
        let operand = self.nested(Self::parse_unary)?;
        let location = start.span_to(operand.location);
        Ok(Expression::new(
            ExpressionKind::Unary {
                operator,
                operand: Box::new(operand),
            },
            location,
        ))
    }

    /// `PowerExpr = PostfixExpr [ "**" UnaryExpr ]`
    ///
    /// The right operand re-enters the unary level, so `2 ** 3 ** 2` groups
    /// as `2 ** (3 ** 2)` and `2 ** -1` is accepted.
    fn parse_power(&mut self) -> ParseResult<Expression> {
        let base = self.parse_postfix()?;
        if !self.eat(TokenKind::StarStar) {
            return Ok(base);
        }
        let exponent = self.nested(Self::parse_unary)?;
        Ok(binary(base, BinaryOperator::Power, exponent))
    }

    /// `PostfixExpr = PrimaryExpr { "(" Args ")" | "[" Expr "]" | "." Ident }`
    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LeftParen => {
                    self.advance();
                    let arguments = self.parse_arguments()?;
                    let close = self.expect(
                        TokenKind::RightParen,
                        SyntaxErrorKind::MissingRightParenthesisAfterArguments,
                    )?;
                    let location = expr.location.span_to(close.location);
                    expr = Expression::new(
                        ExpressionKind::Call {
                            callee: Box::new(expr),
                            arguments,
                        },
                        location,
                    );
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let close = self.expect(
                        TokenKind::RightBracket,
                        SyntaxErrorKind::MissingRightBracketAfterIndex,
                    )?;
                    let location = expr.location.span_to(close.location);
                    expr = Expression::new(
                        ExpressionKind::Subscript {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        location,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let property = self.expect_identifier(SyntaxErrorKind::MissingPropertyName)?;
                    let location = expr.location.span_to(property.location);
                    expr = Expression::new(
                        ExpressionKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        location,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `Args = [ Expr { "," Expr } ]`, stopping before the closing `)`.
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut arguments = Vec::new();
        if self.check(TokenKind::RightParen) {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_expression()?);
            if !self.eat(TokenKind::Comma) {
                return Ok(arguments);
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let literal = match self.peek_kind() {
            TokenKind::Number | TokenKind::String => self.peek().literal.clone(),
            TokenKind::True => Some(LiteralValue::Boolean(true)),
            TokenKind::False => Some(LiteralValue::Boolean(false)),
            TokenKind::Null => Some(LiteralValue::Null),
            _ => None,
        };
        if let Some(value) = literal {
            let token = self.advance();
            return Ok(Expression::new(ExpressionKind::Literal(value), token.location));
        }

        match self.peek_kind() {
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Expression::new(
                    ExpressionKind::Identifier(token.lexeme),
                    token.location,
                ))
            }
            TokenKind::LeftParen => self.parse_grouping(),
            TokenKind::LeftBracket => self.parse_list(),
            _ => {
                let found = self.found();
                Err(self.unexpected(SyntaxErrorKind::MissingExpression { found }))
            }
        }
    }

    /// `"(" Expr ")"`
    fn parse_grouping(&mut self) -> ParseResult<Expression> {
        let open = self.advance();
        let inner = self.parse_expression()?;
        let close = self.expect(
            TokenKind::RightParen,
            SyntaxErrorKind::MissingRightParenthesisAfterExpression,
        )?;
        Ok(Expression::new(
            ExpressionKind::Grouping(Box::new(inner)),
            open.location.span_to(close.location),
        ))
    }

    /// `"[" [ Expr { "," Expr } ] "]"`
    fn parse_list(&mut self) -> ParseResult<Expression> {
        let open = self.advance();
        let mut elements = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.expect(
            TokenKind::RightBracket,
            SyntaxErrorKind::MissingRightBracketInList,
        )?;
        Ok(Expression::new(
            ExpressionKind::List(elements),
            open.location.span_to(close.location),
        ))
    }
}

fn binary(left: Expression, operator: BinaryOperator, right: Expression) -> Expression {
    let location = left.location.span_to(right.location);
    Expression::new(
        ExpressionKind::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        },
        location,
    )
}

fn logical(left: Expression, operator: LogicalOperator, right: Expression) -> Expression {
    let location = left.location.span_to(right.location);
    Expression::new(
        ExpressionKind::Logical {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        },
        location,
    )
}
