pub mod driver;

use rmc_asm::EmitAsm;
use rmc_codegen::CodegenError;
use rmc_parser::{
    ast,
    lexer::{Lexer, LexerError, Token},
    Parser, ParserError,
};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("scan error: {0}")]
    Lexer(#[from] LexerError),
    #[error("syntax error: {0}")]
    Parser(ParserError),
    #[error("name error: {0}")]
    Codegen(#[from] CodegenError),
}

impl From<ParserError> for CompileError {
    fn from(value: ParserError) -> Self {
        match value {
            ParserError::LexerError(err) => Self::Lexer(err),
            err => Self::Parser(err),
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let tokens = Lexer::new(source).tokenize()?;
    debug!(count = tokens.len(), "scanned tokens");
    Ok(tokens)
}

pub fn parse(source: &str) -> Result<ast::Program, CompileError> {
    let mut parser = Parser::try_build(Lexer::new(source))?;
    Ok(parser.parse_program()?)
}

pub fn generate(source: &str) -> Result<rmc_asm::Program, CompileError> {
    Ok(rmc_codegen::code_generation(parse(source)?)?)
}

/// Runs the whole pipeline and returns the NASM source.
pub fn compile(source: &str) -> Result<String, CompileError> {
    Ok(generate(source)?.emit(0))
}
