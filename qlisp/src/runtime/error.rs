// Error handling for the qlisp runtime
//
// Builtins and the apply path return `RuntimeResult`; the evaluator turns every
// `Err` into an inert `Value::Error` through `RuntimeError::to_value`, so user
// code only ever sees errors as data.

use crate::runtime::values::{Arity, Value, ValueKind};

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Runtime errors that can occur during qlisp evaluation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// Wrong kind of value passed to a builtin
    #[error("Function '{function}' passed incorrect type for argument {index}. Got {actual}, Expected {expected}.")]
    TypeError {
        function: String,
        index: usize,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Wrong number of arguments passed to a builtin
    #[error("Function '{function}' passed incorrect number of arguments. Got {actual}, Expected {expected}.")]
    ArityMismatch {
        function: String,
        expected: Arity,
        actual: usize,
    },

    #[error("Function '{function}' passed {{}} for argument {index}.")]
    EmptyList { function: String, index: usize },

    /// Lambda formal list containing something other than a symbol
    #[error("Cannot define non-symbol. Got {actual}, Expected Symbol.")]
    NonSymbolFormal { actual: ValueKind },

    /// `def` / `=` name list containing something other than a symbol
    #[error("Function '{function}' cannot define non-symbol. Got {actual}, Expected Symbol.")]
    NonSymbolBinding {
        function: String,
        actual: ValueKind,
    },

    #[error("Function '{function}' passed too many arguments for symbols. Got {symbols}, Expected {values}.")]
    BindingCountMismatch {
        function: String,
        symbols: usize,
        values: usize,
    },

    /// Lambda applied to more arguments than it has formals
    #[error("Function passed too many arguments. Got {given}, Expected {expected}.")]
    TooManyArguments { given: usize, expected: usize },

    #[error("Function format invalid. Symbol '&' not followed by single symbol.")]
    InvalidVariadic,

    #[error("S-Expression starts with incorrect type. Got {actual}, Expected Function.")]
    NotCallable { actual: ValueKind },

    #[error("Unbound Symbol '{0}'")]
    UndefinedSymbol(String),

    #[error("Division by zero!!")]
    DivisionByZero,

    #[error("Integer overflow in '{0}'")]
    IntegerOverflow(String),

    #[error("Invalid number")]
    InvalidNumber(String),

    /// Raised by the `error` builtin; the message is the user's string verbatim
    #[error("{0}")]
    UserError(String),

    /// `load` could not read or parse its file
    #[error("Could not load Library {0}")]
    LoadError(String),

    /// Writing to the evaluator's output failed
    #[error("I/O error: {0}")]
    IoError(String),
}

impl RuntimeError {
    /// Convert the runtime error into an inert qlisp error value
    pub fn to_value(&self) -> Value {
        Value::error(self)
    }
}
