//! Resolver state
//!
//! One [`Resolver`] owns every table of a compilation unit: symbols, the
//! declaration stack, declarations, functions and the type graph. The
//! declaration, capture, type and method operations are implemented on it
//! in their own modules.

use crate::config::ResolverConfig;
use crate::decl::{
    DeclClass, DeclData, DeclId, DeclKind, FuncData, FuncId, FunctionContext, WalkState,
};
use crate::error::{DeclError, Diagnostics};
use crate::scope::{BlockId, DeclStack};
use crate::symbol::{SymbolData, SymbolId, SymbolTable};
use crate::syntax::{Expr, FuncTypeExpr, TypeExpr};
use la_arena::Arena;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tn_span::{FileId, Pos, SourceMap};
use tn_ty::{BasicKind, Layout, RecursiveType, TypeArena, TypeId, TypeKind, TypeName};

/// Interface method whose signature is resolved after its type group
#[derive(Debug, Clone)]
pub(crate) struct QueuedMethod {
    pub placeholder: TypeId,
    pub sig: FuncTypeExpr,
    pub line: Pos,
}

/// Declaration and type resolver for one compilation unit
#[derive(Debug)]
pub struct Resolver {
    pub(crate) config: ResolverConfig,
    pub(crate) layout: Layout,
    pub(crate) sources: SourceMap,
    pub(crate) symtab: SymbolTable,
    pub(crate) stack: DeclStack,
    pub(crate) decls: Arena<DeclData>,
    pub(crate) funcs: Arena<FuncData>,
    pub(crate) types: TypeArena,
    pub(crate) diags: Diagnostics,
    pub(crate) context: FunctionContext,
    pub(crate) cur_fn: Option<FuncId>,
    /// Line of the construct being processed
    pub(crate) line: Pos,
    pub(crate) typegen: u32,
    pub(crate) vargen: u32,
    pub(crate) iota: i64,
    /// Values and type of the last `const` line that had values
    pub(crate) last_const: Option<(Vec<Expr>, Option<TypeExpr>)>,
    pub(crate) extern_decls: Vec<DeclId>,
    pub(crate) exports: Vec<DeclId>,
    pub(crate) package_syms: Vec<DeclId>,
    pub(crate) method_queue: VecDeque<QueuedMethod>,
    pub(crate) deferred_widths: Vec<(TypeId, Pos)>,
    /// Closure captures keyed by captured variable and function depth
    pub(crate) captures: FxHashMap<(DeclId, u32), DeclId>,
    pub(crate) universe: FxHashMap<BasicKind, TypeId>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl Resolver {
    /// Create a resolver with the predeclared types in scope
    pub fn new(config: ResolverConfig) -> Self {
        let mut resolver = Self {
            layout: config.layout(),
            sources: SourceMap::new(),
            symtab: SymbolTable::new(&config.package),
            stack: DeclStack::new(config.trace_declarations),
            decls: Arena::default(),
            funcs: Arena::default(),
            types: TypeArena::new(),
            diags: Diagnostics::default(),
            context: FunctionContext::External,
            cur_fn: None,
            line: Pos::new(FileId(0), 0),
            typegen: 0,
            vargen: 0,
            iota: 0,
            last_const: None,
            extern_decls: Vec::new(),
            exports: Vec::new(),
            package_syms: Vec::new(),
            method_queue: VecDeque::new(),
            deferred_widths: Vec::new(),
            captures: FxHashMap::default(),
            universe: FxHashMap::default(),
            config,
        };
        resolver.declare_universe();
        resolver
    }

    /// Predeclared types live in the builtin package and are bound in the
    /// local package without a block, so any declaration may shadow them.
    fn declare_universe(&mut self) {
        let builtin = self.symtab.builtin_pkg();
        for kind in BasicKind::ALL {
            let name = self.symtab.intern(kind.as_str());
            let ty = self
                .types
                .alloc_named(TypeKind::Basic(kind), TypeName { pkg: builtin, name });
            self.universe.insert(kind, ty);
            self.bind_universe(kind.as_str(), ty);
        }
        if let Some(&byte) = self.universe.get(&BasicKind::Uint8) {
            self.bind_universe("byte", byte);
        }
    }

    fn bind_universe(&mut self, name: &str, ty: TypeId) {
        let sym = self.symtab.lookup(name);
        let mut data = DeclData::new(sym, DeclKind::Type, self.line);
        data.class = Some(DeclClass::External);
        data.ty = Some(ty);
        data.walk = WalkState::Done;
        let decl = self.decls.alloc(data);
        self.symtab.get_mut(sym).def = Some(decl);
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Register a source file for diagnostics
    pub fn add_file(&mut self, name: impl Into<String>) -> FileId {
        self.sources.add_file(name)
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// Set the line used for diagnostics of the next operation
    pub fn set_line(&mut self, line: Pos) {
        self.line = line;
    }

    pub fn line(&self) -> Pos {
        self.line
    }

    /// Find or create a symbol in the package being compiled
    pub fn lookup(&mut self, name: &str) -> SymbolId {
        self.symtab.lookup(name)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symtab
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symtab
    }

    pub fn symbol(&self, sym: SymbolId) -> &SymbolData {
        self.symtab.get(sym)
    }

    pub fn decl(&self, decl: DeclId) -> &DeclData {
        &self.decls[decl]
    }

    pub fn decl_mut(&mut self, decl: DeclId) -> &mut DeclData {
        &mut self.decls[decl]
    }

    /// Current binding of a symbol
    pub fn binding(&self, sym: SymbolId) -> Option<DeclId> {
        self.symtab.get(sym).def
    }

    pub fn func(&self, func: FuncId) -> &FuncData {
        &self.funcs[func]
    }

    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeArena {
        &mut self.types
    }

    /// Predeclared scalar type
    pub fn basic(&self, kind: BasicKind) -> Option<TypeId> {
        self.universe.get(&kind).copied()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diags
    }

    /// Diagnostics rendered as `file:line: message` lines
    pub fn render_diagnostics(&self) -> String {
        self.diags.render(&self.sources)
    }

    /// Package-level declarations, in declaration order
    pub fn extern_decls(&self) -> &[DeclId] {
        &self.extern_decls
    }

    /// Declarations recorded for the export writer
    pub fn exports(&self) -> &[DeclId] {
        &self.exports
    }

    /// Unexported package-level declarations recorded for the export writer
    pub fn package_syms(&self) -> &[DeclId] {
        &self.package_syms
    }

    pub fn context(&self) -> FunctionContext {
        self.context
    }

    /// Function nesting depth; 0 at package level
    pub fn depth(&self) -> u32 {
        self.context.depth()
    }

    pub fn current_func(&self) -> Option<FuncId> {
        self.cur_fn
    }

    pub fn current_block(&self) -> BlockId {
        self.stack.current_block()
    }

    pub fn stack(&self) -> &DeclStack {
        &self.stack
    }

    pub fn iota(&self) -> i64 {
        self.iota
    }

    /// Printed form of a type
    pub fn render_type(&self, ty: TypeId) -> String {
        self.types.display(ty, self.symtab.interner()).to_string()
    }

    pub(crate) fn error(&mut self, error: DeclError) {
        self.error_at(self.line, error);
    }

    pub(crate) fn error_at(&mut self, pos: Pos, error: DeclError) {
        self.diags.push(pos, error);
    }

    /// Open a lexical block
    pub fn mark_scope(&mut self) {
        self.stack.mark_scope();
    }

    /// Close the innermost lexical block
    ///
    /// # Errors
    ///
    /// Returns `InternalError::ScopeUnderflow` if no block is open.
    pub fn pop_scope(&mut self) -> crate::DeclResult<()> {
        self.stack.pop_scope(&mut self.symtab)
    }

    /// Replace the innermost block by a new, distinct one
    ///
    /// # Errors
    ///
    /// Returns `InternalError::ScopeUnderflow` if no block is open.
    pub fn repoint_scope(&mut self) -> crate::DeclResult<()> {
        self.stack.repoint_scope(&mut self.symtab)
    }

    /// Report every block left open; returns how many were found
    pub fn assert_clean(&mut self) -> usize {
        let leftover = self.stack.leftover_marks();
        for _ in 0..leftover {
            self.error(DeclError::MarkLeftOnStack);
        }
        leftover
    }

    /// Listing of the declaration stack, innermost entry first
    pub fn dump_stack(&self) -> String {
        self.stack.dump(&self.symtab)
    }

    /// Compute a type's width now, or once its forward references are defined
    pub(crate) fn check_width(&mut self, ty: TypeId) {
        match self.types.width(ty, &self.layout) {
            Ok(Some(_)) => {}
            Ok(None) => self.deferred_widths.push((ty, self.line)),
            Err(RecursiveType(cycle)) => {
                let printed = self.render_type(cycle);
                self.types.get_mut(cycle).broke = true;
                self.error(DeclError::InvalidRecursiveType { ty: printed });
            }
        }
    }

    /// Recompute the widths deferred during the last type group
    pub(crate) fn flush_widths(&mut self) {
        for (ty, line) in std::mem::take(&mut self.deferred_widths) {
            if self.types.get(ty).broke {
                continue;
            }
            let Err(RecursiveType(cycle)) = self.types.width(ty, &self.layout) else {
                continue;
            };
            // A broken cycle was reported when it was defined.
            let reported = self.types.get(cycle).broke;
            self.types.get_mut(ty).broke = true;
            if !reported {
                let printed = self.render_type(cycle);
                self.types.get_mut(cycle).broke = true;
                self.error_at(line, DeclError::InvalidRecursiveType { ty: printed });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_is_shadowable() {
        let mut resolver = Resolver::default();
        let int = resolver.lookup("int");
        let byte = resolver.lookup("byte");
        let int_decl = resolver.binding(int).unwrap();
        assert_eq!(resolver.decl(int_decl).kind, DeclKind::Type);
        assert_eq!(resolver.symbol(int).block, None);
        assert_eq!(
            resolver.decl(resolver.binding(byte).unwrap()).ty,
            resolver.basic(BasicKind::Uint8)
        );
        assert!(!resolver.types().get(resolver.basic(BasicKind::Int).unwrap()).local);
    }

    #[test]
    fn leftover_marks_are_reported() {
        let mut resolver = Resolver::default();
        resolver.mark_scope();
        resolver.mark_scope();
        resolver.pop_scope().unwrap();
        assert_eq!(resolver.assert_clean(), 1);
        assert_eq!(
            resolver.diagnostics().errors().cloned().collect::<Vec<_>>(),
            vec![DeclError::MarkLeftOnStack]
        );
    }
}
