pub mod ast;
pub mod lexer;

use std::mem;

use ast::{BinaryOperator, Width};
use thiserror::Error;
use tracing::{debug, trace};

use crate::lexer::{Lexer, LexerError, Loc, Token, TokenKind};

/// Binary operator levels, loosest first. Every level is left-associative.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Precedence {
    Comparison,
    Sum,
    Product,
    Bitwise,
}

impl Precedence {
    fn operator(self, token: &TokenKind) -> Option<BinaryOperator> {
        Some(match (self, token) {
            (Self::Comparison, TokenKind::Equal) => BinaryOperator::Equal,
            (Self::Comparison, TokenKind::NotEqual) => BinaryOperator::NotEqual,
            (Self::Comparison, TokenKind::GreaterThan) => BinaryOperator::GreaterThan,
            (Self::Comparison, TokenKind::LessThan) => BinaryOperator::LessThan,
            (Self::Comparison, TokenKind::GreaterOrEqual) => BinaryOperator::GreaterOrEqual,
            (Self::Comparison, TokenKind::LessOrEqual) => BinaryOperator::LessOrEqual,
            (Self::Sum, TokenKind::Plus) => BinaryOperator::Add,
            (Self::Sum, TokenKind::Minus) => BinaryOperator::Subtract,
            (Self::Product, TokenKind::Asterisk) => BinaryOperator::Multiply,
            (Self::Product, TokenKind::Slash) => BinaryOperator::Divide,
            (Self::Product, TokenKind::Percent) => BinaryOperator::Reminder,
            (Self::Bitwise, TokenKind::Ampersand) => BinaryOperator::BitwiseAnd,
            (Self::Bitwise, TokenKind::Pipe) => BinaryOperator::BitwiseOr,
            (Self::Bitwise, TokenKind::Caret) => BinaryOperator::Xor,
            _ => return None,
        })
    }

    fn tighter(self) -> Option<Self> {
        match self {
            Self::Comparison => Some(Self::Sum),
            Self::Sum => Some(Self::Product),
            Self::Product => Some(Self::Bitwise),
            Self::Bitwise => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("{0}")]
    LexerError(#[from] LexerError),
    #[error("{}: Unexpected Token, expected: \"{expected:?}\", actual: \"{:?}\"", .actual.loc, .actual.kind)]
    UnexpectedToken { expected: TokenKind, actual: Token },
    #[error("{1}: \"{0}\" does not start a statement, expected res, reserve, const, set or exit")]
    UnknownStatement(String, Loc),
    #[error("{1}: Unknown size \"{0}\", expected one of u8, u16, u32 or u64")]
    UnknownSizeTag(String, Loc),
    #[error("{}: Expected an expression, got \"{:?}\"", .0.loc, .0.kind)]
    ExpectedExpression(Token),
    #[error("{}: Only names can have their address taken, got \"{:?}\"", .0.loc, .0.kind)]
    ExpectedAddressableName(Token),
}

#[derive(Debug)]
pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
}

impl Parser {
    pub fn try_build(lexer: Lexer) -> Result<Self, ParserError> {
        let mut parser = Self {
            lexer,
            cur_token: Token {
                kind: TokenKind::Eof,
                loc: Loc { line: 0, column: 0 },
            },
        };

        parser.next_token()?;

        Ok(parser)
    }

    /// Advances to the next token and returns the one that was current.
    fn next_token(&mut self) -> Result<Token, LexerError> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.cur_token, next))
    }

    fn cur_token_is(&self, token: &TokenKind) -> bool {
        mem::discriminant(&self.cur_token.kind) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParserError> {
        if self.cur_token_is(&expected) {
            Ok(self.next_token()?)
        } else {
            Err(ParserError::UnexpectedToken {
                expected,
                actual: self.cur_token.clone(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<(ast::Identifier, Loc), ParserError> {
        let token = self.expect(TokenKind::Identifier(String::new()))?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.loc)),
            _ => unreachable!("expect only returns tokens of the expected kind"),
        }
    }

    fn expect_integer(&mut self) -> Result<u64, ParserError> {
        let token = self.expect(TokenKind::Integer(0))?;
        match token.kind {
            TokenKind::Integer(value) => Ok(value),
            _ => unreachable!("expect only returns tokens of the expected kind"),
        }
    }

    pub fn parse_program(&mut self) -> Result<ast::Program, ParserError> {
        let mut statements = vec![];

        while !self.cur_token_is(&TokenKind::Eof) {
            let statement = self.parse_statement()?;
            trace!(?statement, "parsed statement");
            statements.push(statement);
        }

        debug!(count = statements.len(), "parsed program");

        Ok(ast::Program { statements })
    }

    // Statements

    // Consumes the trailing semicolon.
    fn parse_statement(&mut self) -> Result<ast::Statement, ParserError> {
        let keyword = match &self.cur_token.kind {
            TokenKind::Identifier(keyword) => keyword.clone(),
            _ => {
                return Err(ParserError::UnexpectedToken {
                    expected: TokenKind::Identifier(String::new()),
                    actual: self.cur_token.clone(),
                })
            }
        };

        let statement = match keyword.as_str() {
            "res" | "reserve" => self.parse_reserve_statement(),
            "const" => self.parse_const_statement(),
            "set" => self.parse_set_statement(),
            "exit" => self.parse_exit_statement(),
            _ => Err(ParserError::UnknownStatement(keyword, self.cur_token.loc)),
        }?;

        self.expect(TokenKind::Semicolon)?;

        Ok(statement)
    }

    fn parse_width(&mut self) -> Result<Width, ParserError> {
        let (tag, loc) = self.expect_identifier()?;
        Width::from_tag(&tag).ok_or(ParserError::UnknownSizeTag(tag, loc))
    }

    fn parse_reserve_statement(&mut self) -> Result<ast::Statement, ParserError> {
        self.next_token()?;
        let width = self.parse_width()?;
        self.expect(TokenKind::Comma)?;
        let (name, _) = self.expect_identifier()?;

        Ok(ast::Statement::Reserve { name, width })
    }

    fn parse_const_statement(&mut self) -> Result<ast::Statement, ParserError> {
        self.next_token()?;
        let width = self.parse_width()?;
        self.expect(TokenKind::Comma)?;
        let (name, _) = self.expect_identifier()?;
        self.expect(TokenKind::Comma)?;
        let value = self.expect_integer()?;

        Ok(ast::Statement::Const { name, width, value })
    }

    fn parse_set_statement(&mut self) -> Result<ast::Statement, ParserError> {
        self.next_token()?;
        let (name, _) = self.expect_identifier()?;
        self.expect(TokenKind::Comma)?;
        let value = self.parse_expression()?;

        Ok(ast::Statement::Set { name, value })
    }

    fn parse_exit_statement(&mut self) -> Result<ast::Statement, ParserError> {
        self.next_token()?;
        let value = self.parse_expression()?;

        Ok(ast::Statement::Exit(value))
    }

    // Expressions

    fn parse_expression(&mut self) -> Result<ast::Expression, ParserError> {
        self.parse_binary_expression(Precedence::Comparison)
    }

    fn parse_binary_expression(
        &mut self,
        precedence: Precedence,
    ) -> Result<ast::Expression, ParserError> {
        let mut lhs = self.parse_operand(precedence)?;

        while let Some(op) = precedence.operator(&self.cur_token.kind) {
            self.next_token()?;
            let rhs = self.parse_operand(precedence)?;
            lhs = ast::Expression::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_operand(&mut self, precedence: Precedence) -> Result<ast::Expression, ParserError> {
        match precedence.tighter() {
            Some(tighter) => self.parse_binary_expression(tighter),
            None => self.parse_factor(),
        }
    }

    fn parse_factor(&mut self) -> Result<ast::Expression, ParserError> {
        match &self.cur_token.kind {
            TokenKind::Integer(value) => {
                let value = *value;
                self.next_token()?;
                Ok(ast::Expression::Integer(value))
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.next_token()?;
                Ok(ast::Expression::Var(name))
            }
            TokenKind::OpenParen => self.parse_grouped_expression(),
            TokenKind::Ampersand => self.parse_address_of(),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Not => self.parse_unary(),
            _ => Err(ParserError::ExpectedExpression(self.cur_token.clone())),
        }
    }

    fn parse_grouped_expression(&mut self) -> Result<ast::Expression, ParserError> {
        self.next_token()?;

        let expr = self.parse_expression()?;

        self.expect(TokenKind::CloseParen)?;

        Ok(expr)
    }

    fn parse_address_of(&mut self) -> Result<ast::Expression, ParserError> {
        self.next_token()?;

        match self.cur_token.kind.clone() {
            TokenKind::Identifier(name) => {
                self.next_token()?;
                Ok(ast::Expression::AddressOf(name))
            }
            _ => Err(ParserError::ExpectedAddressableName(self.cur_token.clone())),
        }
    }

    fn parse_unary(&mut self) -> Result<ast::Expression, ParserError> {
        let op = match self.next_token()?.kind {
            TokenKind::Plus => ast::UnaryOperator::Plus,
            TokenKind::Minus => ast::UnaryOperator::Negate,
            TokenKind::Not => ast::UnaryOperator::Complement,
            kind => unreachable!("Wrong token passed to parse_unary, should not happen: {kind:?}"),
        };

        let expr = self.parse_factor()?;

        Ok(ast::Expression::Unary {
            op,
            expression: Box::new(expr),
        })
    }
}
