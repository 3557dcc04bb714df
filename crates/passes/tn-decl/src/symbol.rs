//! Symbol table
//!
//! A symbol is the identity of a name within a package. It holds the
//! binding currently in effect; the declaration stack saves and restores
//! that binding as lexical scopes open and close.

use crate::decl::DeclId;
use crate::scope::BlockId;
use la_arena::{Arena, Idx};
use rustc_hash::FxHashMap;
use tn_intern::{Interner, Name};
use tn_span::Pos;
use tn_ty::PkgId;

/// Unique identifier for a symbol
pub type SymbolId = Idx<SymbolData>;

/// The live state of one `(package, name)` pair
#[derive(Debug, Clone)]
pub struct SymbolData {
    /// Enclosing package
    pub pkg: PkgId,
    /// Symbol name
    pub name: Name,
    /// Current binding
    pub def: Option<DeclId>,
    /// Block the current binding was made in; `None` if never bound in a block
    pub block: Option<BlockId>,
    /// Line of the last declaration; `None` for imported or predeclared names
    pub last_line: Option<Pos>,
}

/// A package known to this compilation
#[derive(Debug, Clone)]
pub struct Package {
    /// Import path
    pub path: String,
}

/// Symbol table mapping `(package, name)` to symbols
#[derive(Debug)]
pub struct SymbolTable {
    interner: Interner,
    symbols: Arena<SymbolData>,
    index: FxHashMap<(PkgId, Name), SymbolId>,
    packages: Vec<Package>,
    local: PkgId,
    builtin: PkgId,
}

impl SymbolTable {
    /// Create a table with the builtin package and the package being compiled
    pub fn new(local_path: &str) -> Self {
        let mut table = Self {
            interner: Interner::new(),
            symbols: Arena::default(),
            index: FxHashMap::default(),
            packages: Vec::new(),
            local: PkgId(0),
            builtin: PkgId(0),
        };
        table.builtin = table.add_package("");
        table.local = table.add_package(local_path);
        table
    }

    /// Register a package
    pub fn add_package(&mut self, path: &str) -> PkgId {
        let id = PkgId(self.packages.len() as u32);
        self.packages.push(Package {
            path: path.to_string(),
        });
        id
    }

    /// The package being compiled
    pub fn local_pkg(&self) -> PkgId {
        self.local
    }

    /// The package holding predeclared names
    pub fn builtin_pkg(&self) -> PkgId {
        self.builtin
    }

    /// Path of a registered package
    pub fn package_path(&self, pkg: PkgId) -> &str {
        self.packages
            .get(pkg.0 as usize)
            .map_or("", |package| package.path.as_str())
    }

    /// Find or create a symbol in the local package
    pub fn lookup(&mut self, name: &str) -> SymbolId {
        self.pkg_lookup(name, self.local)
    }

    /// Find or create a symbol in a given package
    pub fn pkg_lookup(&mut self, name: &str, pkg: PkgId) -> SymbolId {
        let name = self.interner.intern(name);
        self.symbol_for(name, pkg)
    }

    /// Find or create the symbol of an interned name
    pub fn symbol_for(&mut self, name: Name, pkg: PkgId) -> SymbolId {
        if let Some(&id) = self.index.get(&(pkg, name)) {
            return id;
        }
        let id = self.symbols.alloc(SymbolData {
            pkg,
            name,
            def: None,
            block: None,
            last_line: None,
        });
        self.index.insert((pkg, name), id);
        id
    }

    pub fn get(&self, id: SymbolId) -> &SymbolData {
        &self.symbols[id]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut SymbolData {
        &mut self.symbols[id]
    }

    /// Text of a symbol's name
    pub fn name(&self, id: SymbolId) -> &str {
        self.interner.resolve(self.symbols[id].name)
    }

    /// The blank identifier never binds
    pub fn is_blank(&self, id: SymbolId) -> bool {
        self.name(id) == "_"
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn intern(&mut self, text: &str) -> Name {
        self.interner.intern(text)
    }
}

/// Exported names start with an upper-case letter
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_per_package() {
        let mut table = SymbolTable::new("main");
        let other = table.add_package("fmt");
        let local = table.lookup("Println");
        let again = table.lookup("Println");
        let imported = table.pkg_lookup("Println", other);
        assert_eq!(local, again);
        assert_ne!(local, imported);
        assert_eq!(table.name(imported), "Println");
        assert_eq!(table.package_path(other), "fmt");
    }

    #[test]
    fn fresh_symbols_are_unbound() {
        let mut table = SymbolTable::new("main");
        let sym = table.lookup("x");
        let data = table.get(sym);
        assert!(data.def.is_none());
        assert!(data.block.is_none());
        assert!(data.last_line.is_none());
    }

    #[test]
    fn exported_names() {
        assert!(is_exported("Reader"));
        assert!(!is_exported("reader"));
        assert!(!is_exported(""));
    }
}
