//! Name environment with scope stack.
//!
//! Scope 0 is the universe (builtin functions and type names), scope 1 the
//! package scope holding every top-level declaration. Blocks, function
//! bodies and statement initializers push further scopes on top.

use have_ast::ObjectId;
use rustc_hash::FxHashMap;

type Scope = FxHashMap<String, ObjectId>;

pub(crate) const UNIVERSE: usize = 0;
pub(crate) const PACKAGE: usize = 1;

pub struct TypeEnv {
    scopes: Vec<Scope>,
}

impl TypeEnv {
    /// An environment holding an empty universe and package scope.
    pub fn new() -> Self {
        TypeEnv {
            scopes: vec![Scope::default(), Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// # Panics
    ///
    /// Panics if only the universe and package scopes remain.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > PACKAGE + 1, "cannot pop the package scope");
        self.scopes.pop();
    }

    /// Bind `name` in the innermost scope, returning the object it replaced
    /// in that same scope.
    pub fn insert(&mut self, name: String, id: ObjectId) -> Option<ObjectId> {
        self.scopes
            .last_mut()
            .expect("scope stack should never be empty")
            .insert(name, id)
    }

    pub fn insert_universe(&mut self, name: String, id: ObjectId) {
        self.scopes[UNIVERSE].insert(name, id);
    }

    pub fn lookup(&self, name: &str) -> Option<ObjectId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Look up a top-level or builtin name, ignoring local scopes.
    pub fn lookup_global(&self, name: &str) -> Option<ObjectId> {
        self.scopes[PACKAGE]
            .get(name)
            .or_else(|| self.scopes[UNIVERSE].get(name))
            .copied()
    }

    /// Look up only the innermost scope.
    pub fn lookup_local(&self, name: &str) -> Option<ObjectId> {
        self.scopes.last().and_then(|scope| scope.get(name).copied())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Detach every scope above the package scope, so that the next checks
    /// only see top-level declarations.
    pub fn isolate(&mut self) -> Vec<Scope> {
        self.scopes.split_off(PACKAGE + 1)
    }

    pub fn restore(&mut self, saved: Vec<Scope>) {
        self.scopes.truncate(PACKAGE + 1);
        self.scopes.extend(saved);
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}
