//! Lexically scoped variable environment.
//!
//! An [`Environment`] is a shared handle to one scope; each scope points to
//! its parent. Blocks, `for` headers and function calls open a child scope.
//! Closures keep their defining scope alive by holding a handle to it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::object::RuntimeObject;

#[derive(Debug, Clone)]
struct Binding {
    value: RuntimeObject,
    constant: bool,
}

#[derive(Debug, Default)]
struct Scope {
    /// Bindings in declaration order, so dropped names are reported in the
    /// order they were declared.
    bindings: Vec<(String, Binding)>,
    parent: Option<Environment>,
}

impl Scope {
    fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|(n, _)| n == name).map(|(_, b)| b)
    }

    fn binding_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
    }

    fn insert(&mut self, name: &str, binding: Binding) {
        match self.binding_mut(name) {
            Some(existing) => *existing = binding,
            None => self.bindings.push((name.to_string(), binding)),
        }
    }
}

/// Handle to a scope. Cloning shares the scope.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    scope: Rc<RefCell<Scope>>,
}

impl Environment {
    /// A new global scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new empty scope whose parent is `parent`.
    pub fn with_parent(parent: &Environment) -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                bindings: Vec::new(),
                parent: Some(parent.clone()),
            })),
        }
    }

    /// Define (or overwrite) a mutable binding in this scope.
    pub fn define(&self, name: &str, value: RuntimeObject) {
        self.scope.borrow_mut().insert(
            name,
            Binding {
                value,
                constant: false,
            },
        );
    }

    /// Define (or overwrite) a constant binding in this scope.
    pub fn define_constant(&self, name: &str, value: RuntimeObject) {
        self.scope.borrow_mut().insert(
            name,
            Binding {
                value,
                constant: true,
            },
        );
    }

    /// Look a name up, innermost scope first.
    pub fn get(&self, name: &str) -> Option<RuntimeObject> {
        let scope = self.scope.borrow();
        match scope.binding(name) {
            Some(binding) => Some(binding.value.clone()),
            None => scope.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Replace the value of the nearest binding of `name`.
    ///
    /// Returns `false` when no scope defines it. Constness is not checked.
    pub fn update(&self, name: &str, value: RuntimeObject) -> bool {
        let mut scope = self.scope.borrow_mut();
        if let Some(binding) = scope.binding_mut(name) {
            binding.value = value;
            return true;
        }
        match &scope.parent {
            Some(parent) => parent.update(name, value),
            None => false,
        }
    }

    /// Whether this scope itself defines `name`.
    pub fn is_defined(&self, name: &str) -> bool {
        self.scope.borrow().binding(name).is_some()
    }

    /// Whether any scope outside this one defines `name`.
    pub fn is_defined_in_enclosing_scope(&self, name: &str) -> bool {
        let scope = self.scope.borrow();
        let mut current = scope.parent.clone();
        while let Some(env) = current {
            if env.is_defined(name) {
                return true;
            }
            current = env.scope.borrow().parent.clone();
        }
        false
    }

    /// Whether the nearest binding of `name` is constant.
    pub fn is_constant(&self, name: &str) -> bool {
        let scope = self.scope.borrow();
        match scope.binding(name) {
            Some(binding) => binding.constant,
            None => scope
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is_constant(name)),
        }
    }

    /// Every visible binding, with nearer scopes shadowing outer ones.
    pub fn get_all_variables(&self) -> BTreeMap<String, RuntimeObject> {
        let scope = self.scope.borrow();
        let mut variables = match &scope.parent {
            Some(parent) => parent.get_all_variables(),
            None => BTreeMap::new(),
        };
        for (name, binding) in &scope.bindings {
            variables.insert(name.clone(), binding.value.clone());
        }
        variables
    }

    /// Names defined directly in this scope, in declaration order.
    pub fn local_names(&self) -> Vec<String> {
        self.scope
            .borrow()
            .bindings
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}
