//! Method symbols and display-name resolution.
//!
//! The global symbol table lives outside this crate. The graph only stores the
//! [`MethodRef`] of the method it describes, and asks a [`SymbolTable`] for a display name
//! when it is rendered. Lookups are read-only and may happen from many worker threads at
//! once, so implementations must be `Send + Sync`.
//!
//! [`MethodNames`] is a small concurrent implementation used by tooling and tests.

use std::fmt;

use dashmap::DashMap;

/// Identifier of a method symbol in the external symbol table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef(u32);

impl MethodRef {
    /// Creates a method reference from its raw symbol id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw symbol id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method#{}", self.0)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method#{}", self.0)
    }
}

/// Resolves symbols to human-readable names.
pub trait SymbolTable: Send + Sync {
    /// Returns the fully qualified display name of a method, e.g. `Foo::Bar#baz`.
    fn show_full_name(&self, method: MethodRef) -> String;
}

/// A thread-safe, read-mostly table of method display names.
///
/// Unknown methods render as their [`MethodRef`] display form.
///
/// # Examples
///
/// ```rust
/// use flowgraph::symbols::{MethodNames, MethodRef, SymbolTable};
///
/// let names = MethodNames::new();
/// names.insert(MethodRef::new(3), "Foo#bar");
///
/// assert_eq!(names.show_full_name(MethodRef::new(3)), "Foo#bar");
/// assert_eq!(names.show_full_name(MethodRef::new(4)), "method#4");
/// ```
#[derive(Debug, Default)]
pub struct MethodNames {
    names: DashMap<MethodRef, String>,
}

impl MethodNames {
    /// Creates an empty name table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the display name of `method`, replacing any previous one.
    pub fn insert(&self, method: MethodRef, name: impl Into<String>) {
        self.names.insert(method, name.into());
    }

    /// Returns the number of named methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no method has been named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl SymbolTable for MethodNames {
    fn show_full_name(&self, method: MethodRef) -> String {
        self.names
            .get(&method)
            .map_or_else(|| method.to_string(), |name| name.value().clone())
    }
}
