// qlisp Evaluator - walks values, resolves symbols and applies functions

use crate::parser;
use crate::runtime::environment::EnvRef;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::stdlib::StandardLibrary;
use crate::runtime::values::{Function, Lambda, Value, VARIADIC_MARKER};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// Tree-walking evaluator.
///
/// Holds no evaluation state of its own; the only thing it carries is the
/// sink that `print` and `load` diagnostics write to.
pub struct Evaluator {
    output: Box<dyn Write>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator").finish_non_exhaustive()
    }
}

impl Evaluator {
    /// Create an evaluator printing to stdout
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        Evaluator { output }
    }

    /// Evaluate a value in `env`. Symbols resolve, S-Expressions are applied,
    /// everything else (errors included) evaluates to itself.
    pub fn eval(&mut self, env: &EnvRef, value: Value) -> Value {
        match value {
            Value::Symbol(sym) => env.borrow().lookup(sym.as_str()),
            Value::SExpr(children) => self.eval_sexpr(env, children),
            other => other,
        }
    }

    pub fn eval_sexpr(&mut self, env: &EnvRef, children: Vec<Value>) -> Value {
        // Every child is evaluated before any error is looked at, so side
        // effects to the right of a failing child still happen.
        let mut children: Vec<Value> = children
            .into_iter()
            .map(|child| self.eval(env, child))
            .collect();

        if let Some(index) = children.iter().position(Value::is_error) {
            return children.swap_remove(index);
        }

        match children.len() {
            0 => return Value::SExpr(children),
            1 => return children.remove(0),
            _ => {}
        }

        match children.remove(0) {
            Value::Function(func) => self.apply(env, func, children),
            other => RuntimeError::NotCallable {
                actual: other.kind(),
            }
            .to_value(),
        }
    }

    /// Apply a function to already-evaluated arguments.
    pub fn apply(&mut self, env: &EnvRef, func: Function, args: Vec<Value>) -> Value {
        let result = match func {
            Function::Builtin(builtin) => {
                trace!(builtin = builtin.name(), argc = args.len(), "apply builtin");
                StandardLibrary::call(self, env, builtin, args)
            }
            Function::Lambda(lambda) => self.apply_lambda(env, lambda, args),
        };
        result.unwrap_or_else(|err| err.to_value())
    }

    fn apply_lambda(
        &mut self,
        env: &EnvRef,
        mut lambda: Lambda,
        args: Vec<Value>,
    ) -> RuntimeResult<Value> {
        let given = args.len();
        let total = lambda.formals.len();
        trace!(
            argc = given,
            formals = total,
            variadic = lambda.is_variadic(),
            "apply lambda"
        );

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if lambda.formals.is_empty() {
                return Err(RuntimeError::TooManyArguments {
                    given,
                    expected: total,
                });
            }

            let sym = lambda.formals.remove(0);
            if sym.as_str() == VARIADIC_MARKER {
                if lambda.formals.len() != 1 {
                    return Err(RuntimeError::InvalidVariadic);
                }
                let rest = lambda.formals.remove(0);
                let collected = std::iter::once(arg).chain(args.by_ref()).collect();
                lambda.env.set_local(rest.as_str(), Value::QExpr(collected));
                break;
            }

            lambda.env.set_local(sym.as_str(), arg);
        }

        // A variadic tail that received nothing binds to the empty list.
        if lambda
            .formals
            .first()
            .is_some_and(|sym| sym.as_str() == VARIADIC_MARKER)
        {
            if lambda.formals.len() != 2 {
                return Err(RuntimeError::InvalidVariadic);
            }
            let rest = lambda.formals.remove(1);
            lambda.formals.clear();
            lambda.env.set_local(rest.as_str(), Value::QExpr(Vec::new()));
        }

        if !lambda.formals.is_empty() {
            debug!(
                remaining = lambda.formals.len(),
                "partial application, returning curried lambda"
            );
            return Ok(Value::Function(Function::Lambda(lambda)));
        }

        // Free variables resolve against the caller's scope chain.
        let Lambda {
            body,
            env: mut closure,
            ..
        } = lambda;
        closure.set_parent(Some(env.clone()));
        let closure = closure.into_ref();
        Ok(self.eval(&closure, Value::SExpr(body)))
    }

    /// Evaluate each top-level form of `source` in `env`. Error results are
    /// reported on the output sink and do not stop the remaining forms, even
    /// when the sink itself fails.
    pub fn eval_program(&mut self, env: &EnvRef, source: &str) -> RuntimeResult<Vec<Value>> {
        let forms = parser::parse(source).map_err(|e| RuntimeError::LoadError(e.to_string()))?;

        let mut results = Vec::new();
        for value in forms.into_iter().filter_map(Value::read) {
            debug!(form = %value, "evaluating top-level form");
            let result = self.eval(env, value);
            if result.is_error() {
                warn!(error = %result, "top-level form failed");
                if let Err(err) = self.write_line(&result.to_string()) {
                    warn!(error = %err, "could not report failed form");
                }
            }
            results.push(result);
        }
        Ok(results)
    }

    /// Read, parse and evaluate a source file, the backing of `load`.
    pub fn load_file(&mut self, env: &EnvRef, path: &Path) -> RuntimeResult<Value> {
        info!(path = %path.display(), "loading file");
        let source = std::fs::read_to_string(path)
            .map_err(|e| RuntimeError::LoadError(format!("{}: {}", path.display(), e)))?;
        self.eval_program(env, &source)?;
        Ok(Value::unit())
    }

    /// Write one line to the output sink.
    pub fn write_line(&mut self, line: &str) -> RuntimeResult<()> {
        writeln!(self.output, "{}", line)
            .and_then(|_| self.output.flush())
            .map_err(|e| RuntimeError::IoError(e.to_string()))
    }
}
