//! Symbol resolution surface used by [`EntryPointDescriptor::load`]
//!
//! Entry point targets name a symbol by its fully-qualified path
//! (`pkgx.sub`). A [`SymbolResolver`] turns that path into a live object, and
//! each object can expose named members through [`Symbol::member`] so dotted
//! attribute paths (`Thing.method`) can be walked afterwards.
//!
//! The process-wide [`SymbolTable::global`] plays the part of the module
//! registry: tests register namespaces under a path and entry points resolve
//! against it by default.
//!
//! [`EntryPointDescriptor::load`]: crate::EntryPointDescriptor::load

use crate::errors::LoadError;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to a resolved object
pub type SymbolRef = Arc<dyn Symbol>;

/// An object reachable from an entry point
pub trait Symbol: fmt::Debug + Send + Sync + 'static {
    /// Look up a named member of this object
    fn member(&self, _name: &str) -> Option<SymbolRef> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn Symbol {
    /// Downcast to a concrete symbol type
    pub fn downcast_ref<T: Symbol>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Borrow the payload of a [`Value`] symbol
    pub fn value<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<Value<T>>().map(|v| &v.0)
    }
}

/// Leaf symbol wrapping an arbitrary value (a function pointer, a factory, a constant)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value<T>(pub T);

impl<T: fmt::Debug + Send + Sync + 'static> Symbol for Value<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Module- or class-like symbol holding named members
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    name: String,
    members: BTreeMap<String, SymbolRef>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Namespace {
            name: name.into(),
            members: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a member, taking ownership of the symbol
    pub fn with_member(self, name: impl Into<String>, symbol: impl Symbol) -> Self {
        self.with_shared(name, Arc::new(symbol))
    }

    /// Add a member that is already shared elsewhere
    pub fn with_shared(mut self, name: impl Into<String>, symbol: SymbolRef) -> Self {
        self.insert(name, symbol);
        self
    }

    /// Insert or replace a member, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, symbol: SymbolRef) -> Option<SymbolRef> {
        self.members.insert(name.into(), symbol)
    }

    /// Member names in sorted order
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

impl Symbol for Namespace {
    fn member(&self, name: &str) -> Option<SymbolRef> {
        self.members.get(name).cloned()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Resolve a fully-qualified symbol path into an object
pub trait SymbolResolver {
    fn resolve(&self, target: &str) -> Result<SymbolRef, LoadError>;
}

static GLOBAL_TABLE: Lazy<SymbolTable> = Lazy::new(SymbolTable::new);

/// Path-keyed table of resolvable symbols
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: RwLock<AHashMap<String, SymbolRef>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table consulted by `EntryPointDescriptor::load`
    pub fn global() -> &'static SymbolTable {
        &GLOBAL_TABLE
    }

    /// Register a symbol under `path`, returning the shared handle
    pub fn register(&self, path: impl Into<String>, symbol: impl Symbol) -> SymbolRef {
        let symbol: SymbolRef = Arc::new(symbol);
        self.register_shared(path, symbol.clone());
        symbol
    }

    /// Register an already shared symbol under `path`, replacing any previous one
    pub fn register_shared(&self, path: impl Into<String>, symbol: SymbolRef) -> Option<SymbolRef> {
        let path = path.into();
        debug!("Registering symbol '{}'", path);
        self.symbols.write().insert(path, symbol)
    }

    /// Remove the symbol registered under `path`
    pub fn unregister(&self, path: &str) -> Option<SymbolRef> {
        self.symbols.write().remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.symbols.read().contains_key(path)
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, target: &str) -> Result<SymbolRef, LoadError> {
        self.symbols
            .read()
            .get(target)
            .cloned()
            .ok_or_else(|| LoadError::Resolution(target.to_string()))
    }
}
