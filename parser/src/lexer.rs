use std::{fmt::Display, vec::IntoIter};

use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum LexerError {
    #[error("{1}: The character '{0}' could not be represented")]
    UnknownCharacter(char, Loc),
    #[error("{1}: Could not convert the number \"{0}\" to a number.")]
    InvalidNumber(String, Loc),
    #[error("{0}: Identifiers can not start with numbers.")]
    IdentifierStartedWithNumber(Loc),
    #[error("{0}: Character literal is missing its closing quote.")]
    UnterminatedCharLiteral(Loc),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct Loc {
    pub line: usize,
    pub column: usize,
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Eq, PartialEq, PartialOrd, Ord, Debug, Clone)]
pub enum TokenKind {
    Eof,
    /// Names, statement keywords and size tags alike.
    Identifier(String),
    /// Decimal and character literals.
    Integer(u64),
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Colon,
    Semicolon,
    Comma,

    // Operator
    Plus,           // +
    Minus,          // -
    Asterisk,       // *
    Slash,          // /
    Percent,        // %
    Ampersand,      // &
    Pipe,           // |
    Caret,          // ^
    Not,            // !
    Equal,          // =
    NotEqual,       // !=
    GreaterThan,    // >
    LessThan,       // <
    GreaterOrEqual, // >=
    LessOrEqual,    // <=
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Loc,
}

#[derive(Debug)]
pub struct Lexer {
    chars: IntoIter<char>,
    loc: Loc,

    ch: char,
    peek_ch: Option<char>,
    /// Set once `ch` has moved past the last input character.
    at_eof: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            chars: input.chars().collect::<Vec<_>>().into_iter(),
            ch: '\0',
            peek_ch: None,
            at_eof: false,

            loc: Loc { column: 0, line: 1 },
        };

        lexer.peek_ch = lexer.chars.next();
        lexer.read_char();
        lexer
    }

    /// Scans the whole input, stopping at the first error.
    pub fn tokenize(self) -> Result<Vec<Token>, LexerError> {
        self.collect()
    }

    fn peek_char(&self) -> char {
        self.peek_ch.unwrap_or('\0')
    }

    fn is_digit(&self) -> bool {
        self.ch.is_ascii_digit()
    }

    fn is_letter(&self) -> bool {
        self.ch.is_ascii_alphabetic()
    }

    fn is_valid_identifier_char(&self) -> bool {
        self.is_letter() || self.is_digit() || self.ch == '_'
    }

    fn skip_whitespace(&mut self) {
        while self.ch == ' ' || self.ch == '\n' || self.ch == '\r' || self.ch == '\t' {
            self.read_char();
        }
    }

    fn read_char(&mut self) {
        if self.ch == '\n' {
            self.loc.column = 0;
            self.loc.line += 1;
        }
        self.ch = self.peek_char();
        self.at_eof = self.peek_ch.is_none();
        self.peek_ch = self.chars.next();
        self.loc.column += 1;
    }

    fn read_integer(&mut self) -> Result<Token, LexerError> {
        let old_loc = self.loc;
        let mut string = String::new();

        while self.is_digit() {
            string.push(self.ch);
            self.read_char();
        }

        if self.is_valid_identifier_char() {
            return Err(LexerError::IdentifierStartedWithNumber(old_loc));
        }

        let num: u64 = string
            .parse()
            .or(Err(LexerError::InvalidNumber(string.to_owned(), old_loc)))?;

        Ok(Token {
            kind: TokenKind::Integer(num),
            loc: old_loc,
        })
    }

    // 'c' becomes the integer code point of c.
    fn read_char_literal(&mut self) -> Result<Token, LexerError> {
        let old_loc = self.loc;
        self.read_char();

        if self.at_eof {
            return Err(LexerError::UnterminatedCharLiteral(old_loc));
        }
        let value = u64::from(u32::from(self.ch));
        self.read_char();

        if self.ch != '\'' {
            return Err(LexerError::UnterminatedCharLiteral(old_loc));
        }
        self.read_char();

        Ok(Token {
            kind: TokenKind::Integer(value),
            loc: old_loc,
        })
    }

    fn read_identifier(&mut self) -> Token {
        let old_loc = self.loc;
        let mut string = String::new();

        while self.is_valid_identifier_char() {
            string.push(self.ch);
            self.read_char();
        }
        Token {
            kind: TokenKind::Identifier(string),
            loc: old_loc,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        let old_loc = self.loc;

        let result = match self.ch {
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '&' => TokenKind::Ampersand,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '=' => TokenKind::Equal,
            '!' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    TokenKind::NotEqual
                }
                _ => TokenKind::Not,
            },
            '>' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    TokenKind::GreaterOrEqual
                }
                _ => TokenKind::GreaterThan,
            },
            '<' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    TokenKind::LessOrEqual
                }
                _ => TokenKind::LessThan,
            },
            '\'' => return self.read_char_literal(),
            '\0' if self.at_eof => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    loc: self.loc,
                })
            }
            _ => {
                if self.is_digit() {
                    return self.read_integer();
                } else if self.is_letter() {
                    return Ok(self.read_identifier());
                }

                return Err(LexerError::UnknownCharacter(self.ch, old_loc));
            }
        };

        self.read_char();
        Ok(Token {
            kind: result,
            loc: old_loc,
        })
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();

        if let Ok(ref tok) = token {
            if let TokenKind::Eof = tok.kind {
                return None;
            }
        }

        Some(token)
    }
}
