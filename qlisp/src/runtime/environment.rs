// Environment for variable bindings and scope management

use crate::runtime::error::RuntimeError;
use crate::runtime::values::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a live scope. Parents are referenced through handles so a
/// scope never owns the scopes above it.
pub type EnvRef = Rc<RefCell<Environment>>;

/// A scope mapping symbol names to values, chained to an optional parent.
///
/// `Clone` deep-copies the local bindings but keeps pointing at the same
/// parent, which is what a lambda copy needs.
#[derive(Clone, Default)]
pub struct Environment {
    parent: Option<EnvRef>,
    bindings: IndexMap<String, Value>,
}

impl Environment {
    /// Creates a new, empty global environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new child environment that inherits from a parent.
    pub fn with_parent(parent: EnvRef) -> Self {
        Environment {
            parent: Some(parent),
            bindings: IndexMap::new(),
        }
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn parent(&self) -> Option<&EnvRef> {
        self.parent.as_ref()
    }

    pub fn set_parent(&mut self, parent: Option<EnvRef>) {
        self.parent = parent;
    }

    /// Looks up a symbol locally, then through the parent chain. A miss is an
    /// `Unbound Symbol` error value; a hit is an independent copy.
    pub fn lookup(&self, name: &str) -> Value {
        self.get(name)
            .unwrap_or_else(|| RuntimeError::UndefinedSymbol(name.to_string()).to_value())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            Some(value.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            None
        }
    }

    /// Binds or rebinds `name` in this scope only.
    pub fn set_local(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
        } else {
            self.bindings.insert(name.to_string(), value);
        }
    }

    /// Binds `name` in the outermost ancestor of this scope.
    pub fn set_global(&mut self, name: &str, value: Value) {
        match &self.parent {
            Some(parent) => parent.borrow_mut().set_global(name, value),
            None => self.set_local(name, value),
        }
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Local bindings in definition order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
