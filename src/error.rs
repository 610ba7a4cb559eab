use thiserror::Error;

use crate::ast::{BinaryOp, UnaryOp};
use crate::token::Token;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unrecognized character {character:?} at position {position}")]
    UnrecognizedCharacter { character: char, position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnrecognizedCharacter { position, .. } => *position,
        }
    }
}

/// A grammar violation recorded by the parser. Parsing continues after each one.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("{message}, got {found}")]
    Expected { message: &'static str, found: Token },
    #[error("Expected an expression but got {found}")]
    ExpectedExpression { found: Token },
    #[error("Invalid assignment target at position {}", .equals.position)]
    InvalidAssignmentTarget { equals: Token },
    #[error("Invalid literal {text:?} at position {position}")]
    InvalidLiteral { text: String, position: usize },
    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    /// The token the error is bound to, when there is one.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::Expected { found, .. } | ParseError::ExpectedExpression { found } => {
                Some(found)
            }
            ParseError::InvalidAssignmentTarget { equals } => Some(equals),
            ParseError::InvalidLiteral { .. } | ParseError::Lex(_) => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("The param {name:?} already exists")]
    AlreadyDefined { name: String },
    #[error("The requested param {name:?} isn't set")]
    Undefined { name: String },
}

/// Failures raised while evaluating a program.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error(transparent)]
    Environment(#[from] EnvError),
    #[error("Cannot {} type {left} {} {right}", .operation.verb(), .operation.preposition())]
    TypeMismatch {
        operation: BinaryOp,
        left: &'static str,
        right: &'static str,
    },
    #[error("Cannot apply unary `{}` to type {operand}", .operation.symbol())]
    InvalidOperand {
        operation: UnaryOp,
        operand: &'static str,
    },
    #[error("Cannot repeat a string {count} times")]
    InvalidRepeatCount { count: f64 },
    #[error("The initializer of a `for` loop must be a variable declaration")]
    InvalidForInitializer,
    #[error("The loop variable {name:?} disappeared before the loop finished")]
    MissingLoopVariable { name: String },
    #[error("Unimplemented: calling functions is not supported")]
    UnsupportedCall,
}
