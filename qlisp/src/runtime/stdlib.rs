//! qlisp Standard Library
//!
//! The builtin functions bound in every global environment, grouped as:
//! - Function construction (`\`)
//! - List manipulation (`list`, `head`, `tail`, `eval`, `join`)
//! - Arithmetic (`+`, `-`, `*`, `/`)
//! - Comparison (`>`, `<`, `>=`, `<=`, `==`, `!=`)
//! - Control flow (`if`)
//! - Variable definition (`def`, `=`)
//! - I/O and diagnostics (`load`, `error`, `print`)
//!
//! Every builtin validates its arguments before acting, so a rejected call
//! has no side effects.

use crate::ast::Symbol;
use crate::runtime::environment::{EnvRef, Environment};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::evaluator::Evaluator;
use crate::runtime::values::{Builtin, Function, Lambda, Value, ValueKind};
use itertools::Itertools;
use std::path::Path;
use tracing::debug;

/// The Standard Library for the qlisp runtime.
pub struct StandardLibrary;

impl StandardLibrary {
    /// Creates a new global environment populated with every builtin.
    pub fn create_global_environment() -> EnvRef {
        let mut env = Environment::new();
        Self::load_builtins(&mut env);
        env.into_ref()
    }

    pub fn load_builtins(env: &mut Environment) {
        for builtin in Builtin::ALL {
            env.set_local(builtin.name(), Value::Function(Function::Builtin(builtin)));
        }
    }

    /// Run a builtin on evaluated arguments.
    pub fn call(
        evaluator: &mut Evaluator,
        env: &EnvRef,
        builtin: Builtin,
        args: Vec<Value>,
    ) -> RuntimeResult<Value> {
        let arity = builtin.arity();
        if !arity.accepts(args.len()) {
            return Err(RuntimeError::ArityMismatch {
                function: builtin.name().to_string(),
                expected: arity,
                actual: args.len(),
            });
        }

        match builtin {
            Builtin::Lambda => Self::lambda(args),
            Builtin::List => Ok(Value::SExpr(args).into_qexpr()),
            Builtin::Head => Self::head(args),
            Builtin::Tail => Self::tail(args),
            Builtin::Eval => Self::eval(evaluator, env, args),
            Builtin::Join => Self::join(args),
            Builtin::Add | Builtin::Sub | Builtin::Mul | Builtin::Div => {
                Self::arithmetic(builtin, args)
            }
            Builtin::Gt | Builtin::Lt | Builtin::Ge | Builtin::Le => Self::ordering(builtin, args),
            Builtin::Eq => Ok(Self::truth(args[0] == args[1])),
            Builtin::Ne => Ok(Self::truth(args[0] != args[1])),
            Builtin::If => Self::if_(evaluator, env, args),
            Builtin::Def | Builtin::Put => Self::define(env, builtin, args),
            Builtin::Load => Self::load(evaluator, env, args),
            Builtin::Error => Self::error(args),
            Builtin::Print => Self::print(evaluator, args),
        }
    }

    // --- Argument validation ---

    fn expect_kind(
        builtin: Builtin,
        args: &[Value],
        index: usize,
        expected: ValueKind,
    ) -> RuntimeResult<()> {
        let actual = args[index].kind();
        if actual == expected {
            Ok(())
        } else {
            Err(RuntimeError::TypeError {
                function: builtin.name().to_string(),
                index,
                expected,
                actual,
            })
        }
    }

    fn expect_non_empty(builtin: Builtin, args: &[Value], index: usize) -> RuntimeResult<()> {
        if args[index].is_empty() {
            return Err(RuntimeError::EmptyList {
                function: builtin.name().to_string(),
                index,
            });
        }
        Ok(())
    }

    fn truth(b: bool) -> Value {
        Value::Number(i64::from(b))
    }

    /// First argument, consuming the rest. Arity has been checked already.
    fn first(args: Vec<Value>) -> Value {
        Value::SExpr(args).take(0).unwrap_or_else(Value::unit)
    }

    // --- Function construction ---

    /// `(\ {formals} {body})`
    fn lambda(args: Vec<Value>) -> RuntimeResult<Value> {
        Self::expect_kind(Builtin::Lambda, &args, 0, ValueKind::QExpr)?;
        Self::expect_kind(Builtin::Lambda, &args, 1, ValueKind::QExpr)?;

        let mut args = args.into_iter();
        let (formals, body) = match (args.next(), args.next()) {
            (Some(Value::QExpr(formals)), Some(Value::QExpr(body))) => (formals, body),
            _ => unreachable!("argument kinds checked above"),
        };

        let formals = formals
            .into_iter()
            .map(|formal| match formal {
                Value::Symbol(sym) => Ok(sym),
                other => Err(RuntimeError::NonSymbolFormal {
                    actual: other.kind(),
                }),
            })
            .collect::<RuntimeResult<Vec<Symbol>>>()?;

        Ok(Value::Function(Function::Lambda(Lambda::new(formals, body))))
    }

    // --- List manipulation ---

    fn head(args: Vec<Value>) -> RuntimeResult<Value> {
        Self::expect_kind(Builtin::Head, &args, 0, ValueKind::QExpr)?;
        Self::expect_non_empty(Builtin::Head, &args, 0)?;

        let mut list = Self::first(args);
        if let Some(children) = list.children_mut() {
            children.truncate(1);
        }
        Ok(list)
    }

    fn tail(args: Vec<Value>) -> RuntimeResult<Value> {
        Self::expect_kind(Builtin::Tail, &args, 0, ValueKind::QExpr)?;
        Self::expect_non_empty(Builtin::Tail, &args, 0)?;

        let mut list = Self::first(args);
        list.pop(0);
        Ok(list)
    }

    fn eval(evaluator: &mut Evaluator, env: &EnvRef, args: Vec<Value>) -> RuntimeResult<Value> {
        Self::expect_kind(Builtin::Eval, &args, 0, ValueKind::QExpr)?;

        let expr = Self::first(args).into_sexpr();
        Ok(evaluator.eval(env, expr))
    }

    fn join(args: Vec<Value>) -> RuntimeResult<Value> {
        for index in 0..args.len() {
            Self::expect_kind(Builtin::Join, &args, index, ValueKind::QExpr)?;
        }

        Ok(args
            .into_iter()
            .reduce(Value::join)
            .unwrap_or_else(|| Value::QExpr(Vec::new())))
    }

    // --- Arithmetic and comparison ---

    fn numbers(builtin: Builtin, args: &[Value]) -> RuntimeResult<Vec<i64>> {
        args.iter()
            .enumerate()
            .map(|(index, arg)| match arg {
                Value::Number(n) => Ok(*n),
                other => Err(RuntimeError::TypeError {
                    function: builtin.name().to_string(),
                    index,
                    expected: ValueKind::Number,
                    actual: other.kind(),
                }),
            })
            .collect()
    }

    /// Left fold over the operands; a lone operand to `-` is negated.
    fn arithmetic(builtin: Builtin, args: Vec<Value>) -> RuntimeResult<Value> {
        let numbers = Self::numbers(builtin, &args)?;
        let overflow = || RuntimeError::IntegerOverflow(builtin.name().to_string());

        let (&first, rest) = numbers
            .split_first()
            .ok_or_else(|| RuntimeError::ArityMismatch {
                function: builtin.name().to_string(),
                expected: builtin.arity(),
                actual: 0,
            })?;

        if builtin == Builtin::Sub && rest.is_empty() {
            return first.checked_neg().map(Value::Number).ok_or_else(overflow);
        }

        rest.iter()
            .try_fold(first, |acc, &y| match builtin {
                Builtin::Add => acc.checked_add(y).ok_or_else(overflow),
                Builtin::Sub => acc.checked_sub(y).ok_or_else(overflow),
                Builtin::Mul => acc.checked_mul(y).ok_or_else(overflow),
                Builtin::Div if y == 0 => Err(RuntimeError::DivisionByZero),
                Builtin::Div => acc.checked_div(y).ok_or_else(overflow),
                _ => unreachable!("not an arithmetic builtin: {:?}", builtin),
            })
            .map(Value::Number)
    }

    fn ordering(builtin: Builtin, args: Vec<Value>) -> RuntimeResult<Value> {
        Self::expect_kind(builtin, &args, 0, ValueKind::Number)?;
        Self::expect_kind(builtin, &args, 1, ValueKind::Number)?;

        let (a, b) = match (&args[0], &args[1]) {
            (Value::Number(a), Value::Number(b)) => (*a, *b),
            _ => unreachable!("argument kinds checked above"),
        };
        let result = match builtin {
            Builtin::Gt => a > b,
            Builtin::Lt => a < b,
            Builtin::Ge => a >= b,
            Builtin::Le => a <= b,
            _ => unreachable!("not an ordering builtin: {:?}", builtin),
        };
        Ok(Self::truth(result))
    }

    // --- Control flow ---

    /// `(if cond {then} {else})`: any nonzero condition takes the first branch.
    fn if_(evaluator: &mut Evaluator, env: &EnvRef, args: Vec<Value>) -> RuntimeResult<Value> {
        Self::expect_kind(Builtin::If, &args, 0, ValueKind::Number)?;
        Self::expect_kind(Builtin::If, &args, 1, ValueKind::QExpr)?;
        Self::expect_kind(Builtin::If, &args, 2, ValueKind::QExpr)?;

        let mut args = Value::SExpr(args);
        let condition = matches!(args.pop(0), Some(Value::Number(n)) if n != 0);
        let branch = if condition { args.take(0) } else { args.take(1) };
        let branch = branch.map(Value::into_sexpr).unwrap_or_else(Value::unit);
        Ok(evaluator.eval(env, branch))
    }

    // --- Variable definition ---

    /// `(def {a b} 1 2)` binds in the outermost scope, `(= {a b} 1 2)` in the
    /// current one.
    fn define(env: &EnvRef, builtin: Builtin, args: Vec<Value>) -> RuntimeResult<Value> {
        Self::expect_kind(builtin, &args, 0, ValueKind::QExpr)?;

        let mut args = args.into_iter();
        let names = args.next().and_then(Value::into_children).unwrap_or_default();
        let symbols = names
            .into_iter()
            .map(|name| match name {
                Value::Symbol(sym) => Ok(sym),
                other => Err(RuntimeError::NonSymbolBinding {
                    function: builtin.name().to_string(),
                    actual: other.kind(),
                }),
            })
            .collect::<RuntimeResult<Vec<Symbol>>>()?;

        let values: Vec<Value> = args.collect();
        if symbols.len() != values.len() {
            return Err(RuntimeError::BindingCountMismatch {
                function: builtin.name().to_string(),
                symbols: symbols.len(),
                values: values.len(),
            });
        }

        let mut env = env.borrow_mut();
        for (sym, value) in symbols.into_iter().zip(values) {
            if builtin == Builtin::Def {
                debug!(symbol = %sym, "global definition");
                env.set_global(sym.as_str(), value);
            } else {
                debug!(symbol = %sym, "local definition");
                env.set_local(sym.as_str(), value);
            }
        }
        Ok(Value::unit())
    }

    // --- I/O and diagnostics ---

    fn load(evaluator: &mut Evaluator, env: &EnvRef, args: Vec<Value>) -> RuntimeResult<Value> {
        Self::expect_kind(Builtin::Load, &args, 0, ValueKind::String)?;

        match Self::first(args) {
            Value::String(path) => evaluator.load_file(env, Path::new(&path)),
            _ => unreachable!("argument kind checked above"),
        }
    }

    fn error(args: Vec<Value>) -> RuntimeResult<Value> {
        Self::expect_kind(Builtin::Error, &args, 0, ValueKind::String)?;

        match Self::first(args) {
            Value::String(message) => Err(RuntimeError::UserError(message)),
            _ => unreachable!("argument kind checked above"),
        }
    }

    fn print(evaluator: &mut Evaluator, args: Vec<Value>) -> RuntimeResult<Value> {
        evaluator.write_line(&args.iter().join(" "))?;
        Ok(Value::unit())
    }
}
