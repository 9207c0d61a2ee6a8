// Runtime value system for qlisp
// Represents values during execution (different from AST which represents parsed code)

use crate::ast::{Expression, Symbol};
use crate::parser::utils::{escape, unescape};
use crate::runtime::environment::Environment;
use crate::runtime::error::RuntimeError;
use itertools::Itertools;
use std::fmt;

/// Longest error message kept, in bytes.
pub const MAX_ERROR_LEN: usize = 511;

/// Formal-parameter marker binding the remaining arguments as one list.
pub const VARIADIC_MARKER: &str = "&";

/// Every runtime datum. `Clone` is a full structural deep copy: no two
/// containers ever share a child.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(i64),
    /// Already-rendered diagnostic; inert once created.
    Error(String),
    Symbol(Symbol),
    String(String),
    /// Evaluable list; element 0 is the operator.
    SExpr(Vec<Value>),
    /// Quoted list, never evaluated implicitly.
    QExpr(Vec<Value>),
    Function(Function),
}

/// Kind tag of a [`Value`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Error,
    Symbol,
    String,
    SExpr,
    QExpr,
    Function,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Number => "Number",
            ValueKind::Error => "Error",
            ValueKind::Symbol => "Symbol",
            ValueKind::String => "String",
            ValueKind::SExpr => "S-Expression",
            ValueKind::QExpr => "Q-Expression",
            ValueKind::Function => "Function",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Build an error value from anything printable, truncating the message
    /// to [`MAX_ERROR_LEN`] bytes on a char boundary.
    pub fn error(message: impl fmt::Display) -> Value {
        let mut message = message.to_string();
        if message.len() > MAX_ERROR_LEN {
            let mut end = MAX_ERROR_LEN;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        Value::Error(message)
    }

    pub fn symbol(name: &str) -> Value {
        Value::Symbol(Symbol::new(name))
    }

    pub fn string(contents: &str) -> Value {
        Value::String(contents.to_string())
    }

    /// The empty S-Expression, `()`, returned by side-effecting builtins.
    pub fn unit() -> Value {
        Value::SExpr(Vec::new())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Error(_) => ValueKind::Error,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::String(_) => ValueKind::String,
            Value::SExpr(_) => ValueKind::SExpr,
            Value::QExpr(_) => ValueKind::QExpr,
            Value::Function(_) => ValueKind::Function,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn children(&self) -> Option<&[Value]> {
        match self {
            Value::SExpr(children) | Value::QExpr(children) => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::SExpr(children) | Value::QExpr(children) => Some(children),
            _ => None,
        }
    }

    pub fn into_children(self) -> Option<Vec<Value>> {
        match self {
            Value::SExpr(children) | Value::QExpr(children) => Some(children),
            _ => None,
        }
    }

    /// Number of children of a list, zero for anything else.
    pub fn len(&self) -> usize {
        self.children().map_or(0, <[Value]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return the child at `index`, keeping the order of the rest.
    pub fn pop(&mut self, index: usize) -> Option<Value> {
        match self.children_mut() {
            Some(children) if index < children.len() => Some(children.remove(index)),
            _ => None,
        }
    }

    /// Pop the child at `index` and drop the remaining container.
    pub fn take(mut self, index: usize) -> Option<Value> {
        self.pop(index)
    }

    /// Append a child at the end; non-lists are returned unchanged.
    pub fn push(mut self, child: Value) -> Value {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    /// Move every child of `other` onto the end of this list, consuming `other`.
    pub fn join(mut self, other: Value) -> Value {
        if let (Some(children), Some(rest)) = (self.children_mut(), other.into_children()) {
            children.extend(rest);
        }
        self
    }

    /// Retag a list as a Q-Expression without copying its children.
    pub fn into_qexpr(self) -> Value {
        match self {
            Value::SExpr(children) => Value::QExpr(children),
            other => other,
        }
    }

    /// Retag a list as an S-Expression without copying its children.
    pub fn into_sexpr(self) -> Value {
        match self {
            Value::QExpr(children) => Value::SExpr(children),
            other => other,
        }
    }

    /// Convert one parsed node into a value. Comments read as nothing.
    pub fn read(expr: Expression) -> Option<Value> {
        let value = match expr {
            Expression::Number(text) => match text.parse::<i64>() {
                Ok(n) => Value::Number(n),
                Err(_) => RuntimeError::InvalidNumber(text).to_value(),
            },
            Expression::Symbol(sym) => Value::Symbol(sym),
            Expression::String(literal) => {
                let body = literal
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .unwrap_or(literal.as_str());
                Value::String(unescape(body))
            }
            Expression::Comment(_) => return None,
            Expression::SExpr(children) => Value::SExpr(Self::read_all(children)),
            Expression::QExpr(children) => Value::QExpr(Self::read_all(children)),
        };
        Some(value)
    }

    /// Read a whole program as one root S-Expression of its top-level forms.
    pub fn read_program(forms: Vec<Expression>) -> Value {
        Value::SExpr(Self::read_all(forms))
    }

    fn read_all(exprs: Vec<Expression>) -> Vec<Value> {
        exprs.into_iter().filter_map(Value::read).collect()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Error(message) => write!(f, "Error : {}", message),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::String(s) => write!(f, "\"{}\"", escape(s)),
            Value::SExpr(children) => write!(f, "({})", children.iter().join(" ")),
            Value::QExpr(children) => write!(f, "{{{}}}", children.iter().join(" ")),
            Value::Function(func) => write!(f, "{}", func),
        }
    }
}

/// Native operations, identified by a closed tag resolved once when the
/// global environment is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Lambda,
    List,
    Head,
    Tail,
    Eval,
    Join,
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
    If,
    Def,
    Put,
    Load,
    Error,
    Print,
}

impl Builtin {
    pub const ALL: [Builtin; 22] = [
        Builtin::Lambda,
        Builtin::List,
        Builtin::Head,
        Builtin::Tail,
        Builtin::Eval,
        Builtin::Join,
        Builtin::Add,
        Builtin::Sub,
        Builtin::Mul,
        Builtin::Div,
        Builtin::Gt,
        Builtin::Lt,
        Builtin::Ge,
        Builtin::Le,
        Builtin::Eq,
        Builtin::Ne,
        Builtin::If,
        Builtin::Def,
        Builtin::Put,
        Builtin::Load,
        Builtin::Error,
        Builtin::Print,
    ];

    /// The symbol the builtin is bound to in the global environment.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Lambda => "\\",
            Builtin::List => "list",
            Builtin::Head => "head",
            Builtin::Tail => "tail",
            Builtin::Eval => "eval",
            Builtin::Join => "join",
            Builtin::Add => "+",
            Builtin::Sub => "-",
            Builtin::Mul => "*",
            Builtin::Div => "/",
            Builtin::Gt => ">",
            Builtin::Lt => "<",
            Builtin::Ge => ">=",
            Builtin::Le => "<=",
            Builtin::Eq => "==",
            Builtin::Ne => "!=",
            Builtin::If => "if",
            Builtin::Def => "def",
            Builtin::Put => "=",
            Builtin::Load => "load",
            Builtin::Error => "error",
            Builtin::Print => "print",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Builtin::List | Builtin::Print => Arity::Any,
            Builtin::Head | Builtin::Tail | Builtin::Eval => Arity::Fixed(1),
            Builtin::Load | Builtin::Error => Arity::Fixed(1),
            Builtin::Lambda => Arity::Fixed(2),
            Builtin::Gt | Builtin::Lt | Builtin::Ge | Builtin::Le => Arity::Fixed(2),
            Builtin::Eq | Builtin::Ne => Arity::Fixed(2),
            Builtin::If => Arity::Fixed(3),
            Builtin::Join | Builtin::Def | Builtin::Put => Arity::Variadic(1),
            Builtin::Add | Builtin::Sub | Builtin::Mul | Builtin::Div => Arity::Variadic(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic(usize), // Minimum number of arguments
    Any,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => count == *n,
            Arity::Variadic(min) => count >= *min,
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) | Arity::Variadic(n) => write!(f, "{}", n),
            Arity::Any => write!(f, "any"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Function {
    Builtin(Builtin),
    Lambda(Lambda),
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Function::Builtin(a), Function::Builtin(b)) => a == b,
            (Function::Lambda(a), Function::Lambda(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Builtin(_) => write!(f, "<builtin>"),
            Function::Lambda(lambda) => write!(f, "{}", lambda),
        }
    }
}

/// A user-defined function. The closure environment belongs to this lambda
/// alone and collects argument bindings across partial applications.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub formals: Vec<Symbol>,
    pub body: Vec<Value>,
    pub env: Environment,
}

impl Lambda {
    pub fn new(formals: Vec<Symbol>, body: Vec<Value>) -> Self {
        Lambda {
            formals,
            body,
            env: Environment::new(),
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.formals.iter().any(|s| s.as_str() == VARIADIC_MARKER)
    }
}

// Equality ignores the closure.
impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        self.formals == other.formals && self.body == other.body
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(\\ {{{}}} {{{}}})",
            self.formals.iter().join(" "),
            self.body.iter().join(" ")
        )
    }
}
