use std::collections::HashMap;

use crate::interpreter::value::Value;

/// The variable store: one flat name-to-value map that lives for a whole
/// run. There are no nested scopes in this language subset.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any existing binding. Redeclaration is legal
    /// and has no error path.
    pub fn define(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}
