// Parsed syntax tree for qlisp.
// This is what the reader hands to the runtime; it is converted once into
// `runtime::values::Value` before evaluation.

use std::fmt;

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: &str) -> Self {
        Symbol(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node of the parse tree.
///
/// Leaves keep their literal source text: numbers are range-checked and
/// strings unescaped only when the tree is read into values.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// Integer literal text, e.g. `-42`.
    Number(String),
    Symbol(Symbol),
    /// String literal text including the surrounding quotes.
    String(String),
    Comment(String),
    SExpr(Vec<Expression>),
    QExpr(Vec<Expression>),
}
