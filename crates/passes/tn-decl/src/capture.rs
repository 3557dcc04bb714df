//! Closure captures
//!
//! A variable of an enclosing function referenced from a nested function is
//! replaced by a capture declaration owned by the nested function. Captures
//! live in a table keyed by the captured variable and the depth of the
//! function using it, so each depth sees exactly one capture and a chain is
//! formed through `outer`.

use crate::decl::{DeclClass, DeclData, DeclId, DeclKind, Definition, FuncId};
use crate::resolver::Resolver;
use crate::symbol::SymbolId;
use tn_span::Pos;

impl Resolver {
    /// Declaration a use of `sym` refers to.
    ///
    /// Undefined names yield an unbound placeholder so a later definition at
    /// package level can still satisfy them. Variables of enclosing functions
    /// yield the current function's capture, never the original.
    pub fn resolve_name(&mut self, sym: SymbolId, line: Pos) -> DeclId {
        let Some(decl) = self.symtab.get(sym).def else {
            let mut data = DeclData::new(sym, DeclKind::Unresolved, line);
            data.iota = self.iota;
            return self.decls.alloc(data);
        };

        let depth = self.depth();
        let Some(func) = self.cur_fn else {
            return decl;
        };
        let original = &self.decls[decl];
        if !original.is_variable() || original.depth == 0 || original.depth == depth {
            return decl;
        }
        if let Some(&capture) = self.captures.get(&(decl, depth)) {
            return capture;
        }
        self.new_capture(decl, depth, func, line)
    }

    fn new_capture(&mut self, decl: DeclId, depth: u32, func: FuncId, line: Pos) -> DeclId {
        let original = &self.decls[decl];
        let outer = (original.depth + 1..depth)
            .rev()
            .find_map(|level| self.captures.get(&(decl, level)).copied());

        let mut data = DeclData::new(original.sym, DeclKind::Var, line);
        data.class = Some(DeclClass::ParamRef);
        data.is_ddd = original.is_ddd;
        data.ty = original.ty;
        data.type_expr = original.type_expr.clone();
        data.definition = Some(Definition::Capture(decl));
        data.addressable = false;
        data.depth = depth;
        data.outer = outer;
        data.func = Some(func);
        let capture = self.decls.alloc(data);

        self.captures.insert((decl, depth), capture);
        self.decls[decl].addr_taken = true;
        self.funcs[func].captures.push(capture);
        tracing::debug!(
            target: "decl",
            symbol = self.symtab.name(self.decls[decl].sym),
            depth,
            "closure capture"
        );
        capture
    }

    /// Capture of `decl` used by functions at `depth`
    pub fn capture_of(&self, decl: DeclId, depth: u32) -> Option<DeclId> {
        self.captures.get(&(decl, depth)).copied()
    }

    /// Forget the captures of a function whose body has ended
    pub(crate) fn unwind_captures(&mut self, func: FuncId) {
        for &capture in &self.funcs[func].captures {
            let data = &self.decls[capture];
            if let Some(original) = data.captured() {
                self.captures.remove(&(original, data.depth));
            }
        }
    }
}
