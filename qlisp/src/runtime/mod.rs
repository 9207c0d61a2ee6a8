//! qlisp Runtime System
//!
//! High-level runtime entry points. The heavy logic is implemented in the
//! submodules listed below.

pub mod environment;
pub mod error;
pub mod evaluator;
pub mod stdlib;
pub mod values;


pub use environment::{EnvRef, Environment};
pub use error::{RuntimeError, RuntimeResult};
pub use evaluator::Evaluator;
pub use values::{Function, Value};

use crate::parser::{self, errors::PestParseError};
use crate::runtime::stdlib::StandardLibrary;
use std::path::Path;

/// A global environment paired with the evaluator that runs code in it.
pub struct Runtime {
    env: EnvRef,
    evaluator: Evaluator,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// A fresh global environment with every builtin bound, printing to stdout.
    pub fn new() -> Self {
        Self::with_evaluator(Evaluator::new())
    }

    pub fn with_evaluator(evaluator: Evaluator) -> Self {
        Self {
            env: StandardLibrary::create_global_environment(),
            evaluator,
        }
    }

    pub fn env(&self) -> &EnvRef {
        &self.env
    }

    /// Evaluate one interactive line. All forms on the line are read into a
    /// single S-Expression, so `+ 1 2` and `(+ 1 2)` both give 3.
    pub fn evaluate_line(&mut self, line: &str) -> Result<Value, PestParseError> {
        let forms = parser::parse(line)?;
        let program = Value::read_program(forms);
        Ok(self.evaluator.eval(&self.env, program))
    }

    /// Evaluate each top-level form of a program separately.
    pub fn evaluate_program(&mut self, source: &str) -> RuntimeResult<Vec<Value>> {
        self.evaluator.eval_program(&self.env, source)
    }

    /// Load a file the way `(load "path")` does. Failures come back as an
    /// error value rather than aborting.
    pub fn load_file(&mut self, path: &Path) -> Value {
        self.evaluator
            .load_file(&self.env, path)
            .unwrap_or_else(|err| err.to_value())
    }
}
