use std::collections::HashMap;

use super::lower::LoweredValue;

/// Chained symbol table for block scoping. Each block gets its own
/// `Environment` holding a non-owning reference to the scope it nests in;
/// dropping the child on block exit restores the parent.
pub struct Environment<'a> {
    values: HashMap<String, LoweredValue>,
    enclosing: Option<&'a Environment<'a>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Self { values: HashMap::new(), enclosing: None }
    }

    pub fn nested(enclosing: &'a Environment<'a>) -> Self {
        Self { values: HashMap::new(), enclosing: Some(enclosing) }
    }

    /// Insert or overwrite a binding in this scope. Never touches an
    /// enclosing scope, so shadowed bindings reappear on block exit.
    pub fn define(&mut self, name: String, value: LoweredValue) {
        self.values.insert(name, value);
    }

    /// Look up a name here, then through each enclosing scope in order.
    pub fn get(&self, name: &str) -> Option<LoweredValue> {
        match self.values.get(name) {
            Some(value) => Some(*value),
            None => self.enclosing.and_then(|outer| outer.get(name)),
        }
    }
}

impl Default for Environment<'_> {
    fn default() -> Self {
        Self::new()
    }
}
