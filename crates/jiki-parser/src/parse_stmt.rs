//! Statement parsing.
//!
//! Simple statements end with `;`. Compound statements (`if`, `while`,
//! `for`, blocks and function declarations) do not.

use std::rc::Rc;

use jiki_lexer::token::TokenKind;
use jiki_types::ast::*;
use jiki_types::{SyntaxError, SyntaxErrorKind};

use crate::parser::{ParseResult, Parser};

impl Parser {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Statement> {
        self.nested(|p| match p.peek_kind() {
            TokenKind::Let | TokenKind::Const => p.parse_variable_declaration(),
            TokenKind::LeftBrace => p.parse_block(),
            TokenKind::If => p.parse_if(),
            TokenKind::While => p.parse_while(),
            TokenKind::For => p.parse_for(),
            TokenKind::Function => p.parse_function_declaration(),
            TokenKind::Return => p.parse_return(),
            TokenKind::Break | TokenKind::Continue => p.parse_loop_jump(),
            _ => {
                let statement = p.parse_simple_statement()?;
                p.terminate(statement)
            }
        })
    }

    /// Consume the closing `;` and extend the statement's location over it.
    fn terminate(&mut self, mut statement: Statement) -> ParseResult<Statement> {
        let semicolon = self.expect_semicolon()?;
        statement.location = statement.location.span_to(semicolon.location);
        Ok(statement)
    }

    /// `("let" | "const") Ident [ "=" Expr ] ";"`
    fn parse_variable_declaration(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        let constant = keyword.kind == TokenKind::Const;
        let name = self.expect_identifier(SyntaxErrorKind::MissingVariableName {
            keyword: keyword.lexeme.clone(),
        })?;
        let initializer = if self.eat(TokenKind::Equal) {
            Some(self.parse_expression()?)
        } else if constant {
            return Err(self.error_at_current(
                SyntaxErrorKind::MissingInitializerInConstDeclaration {
                    name: name.name.clone(),
                },
            ));
        } else {
            None
        };
        let statement = Statement::new(
            StatementKind::VariableDeclaration {
                name,
                constant,
                initializer,
            },
            keyword.location.span_to(self.previous_location()),
        );
        self.terminate(statement)
    }

    /// An assignment or expression statement without its `;`.
    ///
    /// `Target "=" Expr | Expr`, where `Target` is an identifier or subscript.
    fn parse_simple_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression()?;
        if !self.check(TokenKind::Equal) {
            let location = expression.location;
            return Ok(Statement::new(StatementKind::Expression(expression), location));
        }

        let target_location = expression.location;
        let target = match expression.kind {
            ExpressionKind::Identifier(name) => {
                AssignmentTarget::Variable(Ident::new(name, target_location))
            }
            ExpressionKind::Subscript { object, index } => AssignmentTarget::Subscript {
                object: *object,
                index: *index,
            },
            _ => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::InvalidAssignmentTarget,
                    target_location,
                ))
            }
        };
        self.advance();
        let value = self.parse_expression()?;
        let location = target_location.span_to(value.location);
        Ok(Statement::new(
            StatementKind::Assignment { target, value },
            location,
        ))
    }

    /// `"{" { Statement } "}"`
    fn parse_block(&mut self) -> ParseResult<Statement> {
        let open = self.advance();
        let statements = self.parse_block_body()?;
        Ok(Statement::new(
            StatementKind::Block(statements),
            open.location.span_to(self.previous_location()),
        ))
    }

    /// Statements up to and including the closing `}`; the `{` is consumed.
    fn parse_block_body(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            if self.at_end() {
                return Err(self.error_at_current(SyntaxErrorKind::MissingRightBraceToTerminateBlock));
            }
            statements.push(self.parse_statement()?);
        }
        self.advance();
        Ok(statements)
    }

    /// `"(" Expr ")"` after `if` or `while`.
    fn parse_condition(&mut self, keyword: &str) -> ParseResult<Expression> {
        self.expect(
            TokenKind::LeftParen,
            SyntaxErrorKind::MissingLeftParenthesisAfterKeyword {
                keyword: keyword.to_string(),
            },
        )?;
        let condition = self.parse_expression()?;
        self.expect(
            TokenKind::RightParen,
            SyntaxErrorKind::MissingRightParenthesisAfterCondition {
                keyword: keyword.to_string(),
            },
        )?;
        Ok(condition)
    }

    /// `"if" "(" Expr ")" Statement [ "else" Statement ]`
    fn parse_if(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        let condition = self.parse_condition("if")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::new(
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            },
            keyword.location.span_to(self.previous_location()),
        ))
    }

    /// `"while" "(" Expr ")" Statement`
    fn parse_while(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        let condition = self.parse_condition("while")?;
        let body = Box::new(self.parse_loop_body()?);
        Ok(Statement::new(
            StatementKind::While { condition, body },
            keyword.location.span_to(self.previous_location()),
        ))
    }

    /// `"for" "(" [ Init ] ";" [ Expr ] ";" [ Update ] ")" Statement`
    ///
    /// `Init` is a declaration or simple statement, `Update` a simple
    /// statement without its `;`.
    fn parse_for(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        self.expect(
            TokenKind::LeftParen,
            SyntaxErrorKind::MissingLeftParenthesisAfterKeyword {
                keyword: "for".into(),
            },
        )?;

        let initializer = match self.peek_kind() {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Let | TokenKind::Const => Some(Box::new(self.parse_variable_declaration()?)),
            _ => {
                let statement = self.parse_simple_statement()?;
                Some(Box::new(self.terminate(statement)?))
            }
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon()?;

        let update = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect(
            TokenKind::RightParen,
            SyntaxErrorKind::MissingRightParenthesisAfterCondition {
                keyword: "for".into(),
            },
        )?;

        let body = Box::new(self.parse_loop_body()?);
        Ok(Statement::new(
            StatementKind::For {
                initializer,
                condition,
                update,
                body,
            },
            keyword.location.span_to(self.previous_location()),
        ))
    }

    fn parse_loop_body(&mut self) -> ParseResult<Statement> {
        self.loop_depth += 1;
        let body = self.parse_statement();
        self.loop_depth -= 1;
        body
    }

    /// `"function" Ident "(" [ Ident { "," Ident } ] ")" "{" { Statement } "}"`
    fn parse_function_declaration(&mut self) -> ParseResult<Statement> {
        let keyword = self.advance();
        let name = self.expect_identifier(SyntaxErrorKind::MissingFunctionName)?;
        self.expect(
            TokenKind::LeftParen,
            SyntaxErrorKind::MissingLeftParenthesisAfterKeyword {
                keyword: "function".into(),
            },
        )?;

        let mut parameters: Vec<Ident> = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let parameter = self.expect_identifier(SyntaxErrorKind::MissingParameterName {
                    function: name.name.clone(),
                })?;
                if parameters.iter().any(|p| p.name == parameter.name) {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::DuplicateParameterName {
                            function: name.name.clone(),
                            parameter: parameter.name,
                        },
                        parameter.location,
                    ));
                }
                parameters.push(parameter);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(
            TokenKind::RightParen,
            SyntaxErrorKind::MissingRightParenthesisAfterParameters,
        )?;
        self.expect(
            TokenKind::LeftBrace,
            SyntaxErrorKind::MissingLeftBraceBeforeFunctionBody {
                name: name.name.clone(),
            },
        )?;

        // A loop outside the function cannot be broken out of from inside it.
        let enclosing_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let body = self.parse_block_body();
        self.function_depth -= 1;
        self.loop_depth = enclosing_loops;
        let body = body?;

        Ok(Statement::new(
            StatementKind::FunctionDeclaration(Rc::new(FunctionDeclaration {
                name,
                parameters,
                body,
            })),
            keyword.location.span_to(self.previous_location()),
        ))
    }

    /// `"return" [ Expr ] ";"`
    fn parse_return(&mut self) -> ParseResult<Statement> {
        if self.function_depth == 0 {
            return Err(self.error_at_current(SyntaxErrorKind::ReturnOutsideFunction));
        }
        let keyword = self.advance();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let statement = Statement::new(
            StatementKind::Return(value),
            keyword.location.span_to(self.previous_location()),
        );
        self.terminate(statement)
    }

    /// `"break" ";"` or `"continue" ";"`
    fn parse_loop_jump(&mut self) -> ParseResult<Statement> {
        let (kind, error) = match self.peek_kind() {
            TokenKind::Break => (StatementKind::Break, SyntaxErrorKind::BreakOutsideLoop),
            _ => (StatementKind::Continue, SyntaxErrorKind::ContinueOutsideLoop),
        };
        if self.loop_depth == 0 {
            return Err(self.error_at_current(error));
        }
        let keyword = self.advance();
        self.terminate(Statement::new(kind, keyword.location))
    }
}
