//! Scoped variable environment for one method activation.

use crate::value::Value;
use std::collections::BTreeMap;

/// A single scope level.
#[derive(Debug, Clone, Default)]
struct Scope {
    bindings: BTreeMap<String, Value>,
}

/// Locals and parameters of one activation, with push/pop block scoping.
///
/// Lookups search from the innermost scope outward; `define` always writes
/// the innermost scope; `set` updates the nearest existing binding.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.bindings.get_mut(name))
    }

    /// Update the nearest binding. Returns `false` when the name is unbound.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
