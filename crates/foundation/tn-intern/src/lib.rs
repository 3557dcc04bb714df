//! String interning for identifiers and package paths

pub use lasso::Spur as Name;
use lasso::Rodeo;
use std::fmt;

/// Single-threaded string interner
///
/// One compilation unit is resolved at a time, so the interner is owned by
/// the resolver instead of being shared behind a lock.
#[derive(Default)]
pub struct Interner {
    inner: Rodeo,
}

impl Interner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its stable name
    pub fn intern(&mut self, text: &str) -> Name {
        self.inner.get_or_intern(text)
    }

    /// Look up a string without interning it
    pub fn get(&self, text: &str) -> Option<Name> {
        self.inner.get(text)
    }

    /// Resolve a name back to its text
    pub fn resolve(&self, name: Name) -> &str {
        self.inner.resolve(&name)
    }

    /// Number of distinct strings interned so far
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("len", &self.inner.len())
            .finish()
    }
}
