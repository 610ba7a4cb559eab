//! Chained lexical scopes.
//!
//! Scopes live in an arena and point at their parent by index. Blocks nest strictly, so the
//! current scope is always the newest one and leaving a block just truncates the arena.

use std::collections::HashMap;

use crate::error::EnvError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope {
    bindings: HashMap<String, Value>,
    parent: Option<ScopeId>,
}

impl Scope {
    fn global() -> Self {
        Scope {
            bindings: HashMap::new(),
            parent: None,
        }
    }

    fn inner(parent: ScopeId) -> Self {
        Scope {
            bindings: HashMap::new(),
            parent: Some(parent),
        }
    }
}

#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::global()],
            current: ScopeId(0),
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Number of scopes between the current one and the global one, inclusive.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Opens a child of the current scope and makes it current. Returns the scope to hand back
    /// to [`Environment::restore`] when the child is done.
    pub fn enter(&mut self) -> ScopeId {
        let previous = self.current;
        self.scopes.push(Scope::inner(previous));
        self.current = ScopeId(self.scopes.len() - 1);
        previous
    }

    /// Makes `scope` current again, discarding every scope opened after it.
    pub fn restore(&mut self, scope: ScopeId) {
        self.scopes.truncate(scope.0 + 1);
        self.current = scope;
    }

    /// Binds `name` in the current scope. Shadowing an outer binding is fine, rebinding a name
    /// of the same scope is not.
    pub fn define(&mut self, name: &str, value: Value) -> Result<(), EnvError> {
        let bindings = &mut self.scopes[self.current.0].bindings;
        if bindings.contains_key(name) {
            return Err(EnvError::AlreadyDefined {
                name: name.to_string(),
            });
        }
        bindings.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Value, EnvError> {
        self.chain()
            .find_map(|scope| self.scopes[scope.0].bindings.get(name))
            .cloned()
            .ok_or_else(|| EnvError::Undefined {
                name: name.to_string(),
            })
    }

    /// Overwrites the nearest existing binding of `name`.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), EnvError> {
        let Some(scope) = self.resolve(name) else {
            return Err(EnvError::Undefined {
                name: name.to_string(),
            });
        };
        self.scopes[scope.0].bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Drops a binding from the current scope only.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.scopes[self.current.0].bindings.remove(name)
    }

    fn resolve(&self, name: &str) -> Option<ScopeId> {
        self.chain()
            .find(|scope| self.scopes[scope.0].bindings.contains_key(name))
    }

    fn chain(&self) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(self.current), |scope| self.scopes[scope.0].parent)
    }
}
