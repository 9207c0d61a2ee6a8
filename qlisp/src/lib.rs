// qlisp Library
// Main library crate for the qlisp interpreter
pub mod ast;
pub mod config;
pub mod input_handling;
pub mod parser;
pub mod runtime;

// Re-export the main parsing function and the AST.
pub use ast::*;
pub use parser::{errors::PestParseError, parse};
pub use runtime::evaluator::Evaluator;
pub use runtime::values::{Builtin, Function, Lambda, Value};
pub use runtime::{Runtime, RuntimeError, RuntimeResult};
