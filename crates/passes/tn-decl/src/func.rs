//! Function context
//!
//! A function header switches the resolver from the package-level context
//! into a local one, one depth deeper, and declares the parameters in a new
//! scope; the end of the body reverses it.

use crate::decl::{DeclClass, DeclKind, Definition, FuncData, FuncId, FunctionContext};
use crate::error::{DeclResult, InternalError};
use crate::resolver::Resolver;
use crate::syntax::{FieldDecl, FuncTypeExpr, Ident};
use tn_span::Pos;

impl Resolver {
    /// Register a function or closure; `name` is `None` for closures
    pub fn new_func(&mut self, name: Option<Ident>, sig: FuncTypeExpr, line: Pos) -> FuncId {
        self.funcs.alloc(FuncData::new(name, sig, line))
    }

    /// Declare the function name, open its scope and declare its parameters.
    ///
    /// # Errors
    ///
    /// Returns `InternalError::FuncHeaderContext` when the function context
    /// disagrees with the open functions.
    pub fn func_header(&mut self, func: FuncId) -> DeclResult<()> {
        if let Some(name) = self.funcs[func].name {
            if let Some(decl) = self.bind(&name, DeclKind::Func, DeclClass::Func)? {
                self.decls[decl].definition = Some(Definition::Func(func));
                self.funcs[func].decl = Some(decl);
                if !self.funcs[func].is_method() {
                    self.auto_export(decl, DeclClass::Func);
                }
            }
        }

        let consistent = match self.context {
            FunctionContext::External => self.cur_fn.is_none(),
            FunctionContext::Local { .. } => self.cur_fn.is_some(),
        };
        if !consistent {
            return Err(InternalError::FuncHeaderContext);
        }

        self.enter_function(func);
        let mut sig = std::mem::take(&mut self.funcs[func].sig);
        let declared = self.declare_params(&mut sig);
        self.funcs[func].sig = sig;
        declared
    }

    fn enter_function(&mut self, func: FuncId) {
        self.stack.mark_scope();
        let depth = self.depth() + 1;
        self.context = FunctionContext::Local { depth };
        let data = &mut self.funcs[func];
        data.outer = self.cur_fn;
        data.depth = depth;
        self.cur_fn = Some(func);
    }

    /// Receiver and inputs are `Param`, results `ParamOut`. Blank results
    /// are renamed `.anonN` so a bare return can assign them.
    fn declare_params(&mut self, sig: &mut FuncTypeExpr) -> DeclResult<()> {
        if let Some(receiver) = sig.receiver.as_mut() {
            self.declare_param(receiver, DeclClass::Param)?;
        }
        for param in &mut sig.params {
            self.declare_param(param, DeclClass::Param)?;
        }

        let mut anon = 0;
        for result in &mut sig.results {
            let Some(name) = result.name else { continue };
            if self.symtab.is_blank(name) {
                result.name = Some(self.symtab.lookup(&format!(".anon{anon}")));
                anon += 1;
            }
            self.declare_param(result, DeclClass::ParamOut)?;
        }
        Ok(())
    }

    fn declare_param(&mut self, field: &mut FieldDecl, class: DeclClass) -> DeclResult<()> {
        let Some(name) = field.name else {
            return Ok(());
        };
        let ident = Ident::new(name, field.line);
        if let Some(decl) = self.declare(&ident, DeclKind::Param, class)? {
            let data = &mut self.decls[decl];
            data.type_expr = field.ty.clone();
            data.is_ddd = field.is_ddd;
            field.decl = Some(decl);
        }
        Ok(())
    }

    /// Close the function's scope and return to the enclosing context.
    ///
    /// # Errors
    ///
    /// Returns `InternalError::FuncBodyContext` outside a function and
    /// `InternalError::ScopeUnderflow` if the scope was already closed.
    pub fn func_body_end(&mut self, func: FuncId) -> DeclResult<()> {
        let FunctionContext::Local { depth } = self.context else {
            return Err(InternalError::FuncBodyContext);
        };
        self.stack.pop_scope(&mut self.symtab)?;
        self.unwind_captures(func);

        let depth = depth - 1;
        self.cur_fn = self.funcs[func].outer.take();
        self.context = if depth == 0 {
            FunctionContext::External
        } else {
            FunctionContext::Local { depth }
        };
        Ok(())
    }

    /// Declare an interface method's parameters in a scope of their own so
    /// duplicate parameter names are caught
    ///
    /// # Errors
    ///
    /// Propagates internal errors from the throwaway function context.
    pub fn declare_interface_method_args(&mut self, sig: &mut FuncTypeExpr) -> DeclResult<()> {
        let func = self
            .funcs
            .alloc(FuncData::new(None, FuncTypeExpr::default(), self.line));

        self.enter_function(func);
        self.declare_params(sig)?;
        self.func_body_end(func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TypeExpr;

    #[test]
    fn header_and_body_nest() {
        let mut resolver = Resolver::default();
        let file = resolver.add_file("f.go");
        let line = Pos::new(file, 1);
        let int = resolver.lookup("int");
        let [f, g, x] = ["f", "g", "x"].map(|name| resolver.lookup(name));

        let sig = FuncTypeExpr::new(
            vec![FieldDecl::named(x, TypeExpr::name(int, line), line)],
            Vec::new(),
        );
        let outer = resolver.new_func(Some(Ident::new(f, line)), sig, line);
        resolver.func_header(outer).unwrap();
        assert_eq!(resolver.context(), FunctionContext::Local { depth: 1 });
        let param = resolver.binding(x).unwrap();
        assert_eq!(resolver.decl(param).class, Some(DeclClass::Param));
        assert_eq!(resolver.func(outer).sig.params[0].decl, Some(param));

        let inner = resolver.new_func(None, FuncTypeExpr::default(), line.with_line(2));
        resolver.func_header(inner).unwrap();
        assert_eq!(resolver.depth(), 2);
        resolver.func_body_end(inner).unwrap();
        assert_eq!(resolver.current_func(), Some(outer));
        resolver.func_body_end(outer).unwrap();

        assert_eq!(resolver.context(), FunctionContext::External);
        assert!(resolver.binding(x).is_none());
        assert!(resolver.binding(f).is_some());
        assert!(resolver.binding(g).is_none());
    }

    #[test]
    fn blank_results_are_renamed() {
        let mut resolver = Resolver::default();
        let file = resolver.add_file("f.go");
        let line = Pos::new(file, 3);
        let int = resolver.lookup("int");
        let blank = resolver.lookup("_");
        let sig = FuncTypeExpr::new(
            Vec::new(),
            vec![
                FieldDecl::named(blank, TypeExpr::name(int, line), line),
                FieldDecl::named(blank, TypeExpr::name(int, line), line),
            ],
        );
        let func = resolver.new_func(None, sig, line);
        resolver.func_header(func).unwrap();
        let names: Vec<&str> = resolver
            .func(func)
            .sig
            .results
            .iter()
            .filter_map(|result| result.name)
            .map(|name| resolver.symbols().name(name))
            .collect();
        assert_eq!(names, [".anon0", ".anon1"]);
        let anon = resolver.func(func).sig.results[1].decl.unwrap();
        assert_eq!(resolver.decl(anon).class, Some(DeclClass::ParamOut));
        resolver.func_body_end(func).unwrap();
        assert!(resolver.diagnostics().is_empty());
    }

    #[test]
    fn body_end_outside_function_is_fatal() {
        let mut resolver = Resolver::default();
        let func = resolver.new_func(None, FuncTypeExpr::default(), resolver.line());
        assert_eq!(
            resolver.func_body_end(func),
            Err(InternalError::FuncBodyContext)
        );
    }

    #[test]
    fn stale_function_context_is_fatal() {
        let mut resolver = Resolver::default();
        let func = resolver.new_func(None, FuncTypeExpr::default(), resolver.line());
        resolver.cur_fn = Some(func);
        assert_eq!(
            resolver.func_header(func),
            Err(InternalError::FuncHeaderContext)
        );
    }
}
