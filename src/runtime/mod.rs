pub mod env;
pub mod obj;

mod interpreter;
pub use interpreter::Interpreter;

use thiserror::Error;

use crate::lexer::token::Token;
use crate::runtime::obj::LoxObj;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Error raised while evaluating expressions or executing statements. The
/// first one halts the current interpretation.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct RuntimeError {
    /// The offending token, for line and lexeme in the report
    pub token: Token,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(token: &Token, kind: RuntimeErrorKind) -> Self {
        Self {
            token: token.clone(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
    #[error("Incompatible operands.")]
    IncompatibleOperands,
    #[error("Division by zero.")]
    DivisionByZero,
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
    #[error("Cannot reinitialize a variable.")]
    Reinitialize,
    #[error("Can only call functions and classes.")]
    NotCallable,
    #[error("Expected {expected} arguments but got {got}.")]
    WrongArity { expected: usize, got: usize },
    #[error("Only instances have properties.")]
    NoProperties,
    #[error("Only instances have fields.")]
    NoFields,
    #[error("Undefined property '{0}'.")]
    UndefinedProperty(String),
    #[error("Superclass must be a class.")]
    SuperclassNotClass,
}

/// Non-local control transfer raised by statements and caught by the nearest
/// matching construct: `Break`/`Continue` by the enclosing `while` dispatch,
/// `Return` by the function call. Runtime errors travel as `Err` instead.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(LoxObj),
}
