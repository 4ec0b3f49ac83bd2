//! Lexically scoped type environment for the checker.

use std::collections::HashMap;

use crate::ty::Type;

/// A single scope level.
#[derive(Debug)]
struct Scope {
    bindings: HashMap<String, Type>,
}

/// A stack of scopes for local/parameter resolution inside one method.
#[derive(Debug)]
pub struct TypeEnv {
    scopes: Vec<Scope>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                bindings: HashMap::new(),
            }],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope {
            bindings: HashMap::new(),
        });
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the root scope");
        self.scopes.pop();
    }

    /// Define a binding in the current scope. Returns `false` if the name is
    /// already defined in this scope (redeclaration check).
    pub fn define(&mut self, name: &str, ty: Type) -> bool {
        let scope = self.scopes.last_mut().expect("no scope");
        if scope.bindings.contains_key(name) {
            return false;
        }
        scope.bindings.insert(name.to_string(), ty);
        true
    }

    /// Look up a binding, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut env = TypeEnv::new();
        assert!(env.define("x", Type::Int));
        env.push_scope();
        assert!(env.define("x", Type::Str));
        assert_eq!(env.lookup("x"), Some(&Type::Str));
        env.pop_scope();
        assert_eq!(env.lookup("x"), Some(&Type::Int));
    }

    #[test]
    fn redefine_in_same_scope_fails() {
        let mut env = TypeEnv::new();
        assert!(env.define("x", Type::Int));
        assert!(!env.define("x", Type::Int));
    }
}
