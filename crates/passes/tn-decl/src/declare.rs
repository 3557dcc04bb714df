//! Declaration engine
//!
//! Binds names to declarations under the active declaration context.
//! Package-level names are recorded as external declarations; everything
//! else is saved on the declaration stack first so the enclosing scope can
//! restore the previous binding.

use crate::decl::{DeclClass, DeclData, DeclId, DeclKind, Definition};
use crate::error::{DeclError, DeclResult, InternalError};
use crate::resolver::Resolver;
use crate::symbol::is_exported;
use crate::syntax::{Expr, ExprKind, Ident, Operand, Stmt, TypeExpr};
use tn_ty::TypeName;

impl Resolver {
    /// Bind `ident` to a new declaration.
    ///
    /// The blank identifier is never bound and yields `None`. Binding a name
    /// twice in one block is reported and the new binding still wins.
    ///
    /// # Errors
    ///
    /// Returns `InternalError::AutomaticOutsideFunction` for a local
    /// variable declared outside any function.
    pub fn declare(
        &mut self,
        ident: &Ident,
        kind: DeclKind,
        class: DeclClass,
    ) -> DeclResult<Option<DeclId>> {
        let decl = self.bind(ident, kind, class)?;
        if let Some(decl) = decl {
            self.auto_export(decl, class);
        }
        Ok(decl)
    }

    pub(crate) fn bind(
        &mut self,
        ident: &Ident,
        kind: DeclKind,
        class: DeclClass,
    ) -> DeclResult<Option<DeclId>> {
        let sym = ident.sym;
        if self.symtab.is_blank(sym) {
            return Ok(None);
        }
        self.line = ident.line;

        let decl = self.decls.alloc(DeclData::new(sym, kind, ident.line));
        let mut generation = 0;
        if class == DeclClass::External {
            self.extern_decls.push(decl);
            tracing::debug!(
                target: "decl",
                line = %self.sources.render(ident.line),
                symbol = self.symtab.name(sym),
                "global decl"
            );
        } else {
            if self.cur_fn.is_none() && class == DeclClass::Auto {
                return Err(InternalError::AutomaticOutsideFunction);
            }
            if let Some(func) = self.cur_fn {
                self.funcs[func].locals.push(decl);
            }
            match kind {
                DeclKind::Type => {
                    self.typegen += 1;
                    generation = self.typegen;
                }
                DeclKind::Var | DeclKind::Param | DeclKind::Func => {
                    self.vargen += 1;
                    generation = self.vargen;
                }
                _ => {}
            }
            self.stack.push_snapshot(sym, &self.symtab);
            self.decls[decl].func = self.cur_fn;
        }

        let block = self.stack.current_block();
        let previous = self.symtab.get(sym);
        if previous.block == Some(block) {
            let previous = match previous.last_line {
                Some(line) => format!("at {}", self.sources.render(line)),
                None => "during import".to_string(),
            };
            let name = self.symtab.name(sym).to_string();
            self.error(DeclError::Redeclared {
                name,
                place: "in this block",
                previous,
            });
        }

        let symbol = self.symtab.get_mut(sym);
        symbol.def = Some(decl);
        symbol.block = Some(block);
        symbol.last_line = Some(ident.line);

        let data = &mut self.decls[decl];
        data.vargen = generation;
        data.depth = self.context.depth();
        data.class = Some(class);
        Ok(Some(decl))
    }

    /// Record package-level names for the export writer
    pub(crate) fn auto_export(&mut self, decl: DeclId, class: DeclClass) {
        if !self.config.export_symbols {
            return;
        }
        if !matches!(class, DeclClass::External | DeclClass::Func) || self.depth() != 0 {
            return;
        }
        let name = self.symtab.name(self.decls[decl].sym);
        if is_exported(name) || name == "init" {
            self.exports.push(decl);
        } else {
            self.package_syms.push(decl);
        }
    }

    /// Declare a variable whose type is already known
    ///
    /// # Errors
    ///
    /// Fails like [`Resolver::declare`].
    pub fn add_var(
        &mut self,
        ident: &Ident,
        ty: tn_ty::TypeId,
        class: DeclClass,
    ) -> DeclResult<Option<DeclId>> {
        let decl = self.declare(ident, DeclKind::Var, class)?;
        if let Some(decl) = decl {
            self.decls[decl].ty = Some(ty);
        }
        Ok(decl)
    }

    fn declare_var(
        &mut self,
        ident: &Ident,
        ty: &Option<TypeExpr>,
    ) -> DeclResult<Option<DeclId>> {
        let class = self.context.class();
        let decl = self.declare(ident, DeclKind::Var, class)?;
        if let Some(decl) = decl {
            self.decls[decl].type_expr = ty.clone();
        }
        Ok(decl)
    }

    /// `var a, b T = x, y`
    ///
    /// A single value for several names becomes one multi-value assignment.
    /// Inside functions every declared name also gets a storage statement.
    ///
    /// # Errors
    ///
    /// Fails like [`Resolver::declare`].
    pub fn var_iter(
        &mut self,
        names: &[Ident],
        ty: Option<TypeExpr>,
        exprs: Vec<Expr>,
    ) -> DeclResult<Vec<Stmt>> {
        let in_func = self.depth() > 0;
        let mut init = Vec::new();

        if exprs.len() == 1 && names.len() > 1 {
            let mut lhs = Vec::with_capacity(names.len());
            for name in names {
                match self.declare_var(name, &ty)? {
                    Some(decl) => {
                        self.decls[decl].definition = Some(Definition::MultiAssign);
                        if in_func {
                            init.push(Stmt::Decl(decl));
                        }
                        lhs.push(Operand::Decl(decl));
                    }
                    None => lhs.push(Operand::Blank),
                }
            }
            init.push(Stmt::AssignList {
                lhs,
                rhs: exprs,
                define: false,
                init: Vec::new(),
            });
            return Ok(init);
        }

        let with_values = !exprs.is_empty();
        let mut values = exprs.into_iter();
        for name in names {
            let value = if with_values {
                match values.next() {
                    Some(value) => Some(value),
                    None => {
                        self.error_at(name.line, DeclError::MissingExpr { what: "var" });
                        break;
                    }
                }
            } else {
                None
            };

            let decl = self.declare_var(name, &ty)?;
            let blank = decl.is_none();
            if value.is_some() || in_func || blank {
                if let Some(decl) = decl {
                    if in_func {
                        init.push(Stmt::Decl(decl));
                    }
                    if value.is_some() {
                        self.decls[decl].definition = Some(Definition::Assign);
                    }
                }
                init.push(Stmt::Assign {
                    lhs: decl.map_or(Operand::Blank, Operand::Decl),
                    rhs: value,
                    define: false,
                    init: Vec::new(),
                });
            }
        }
        if values.next().is_some() {
            self.error(DeclError::ExtraExpr { what: "var" });
        }
        Ok(init)
    }

    /// Start a parenthesized `const` group
    pub fn begin_const_group(&mut self) {
        self.iota = 0;
        self.last_const = None;
    }

    /// One `const` line: `a, b T = x, y`, or `a, b` repeating the previous
    /// line's values and type. Every constant gets its own copy of its value
    /// with `iota` substituted; the counter advances once per call.
    ///
    /// # Errors
    ///
    /// Fails like [`Resolver::declare`].
    pub fn const_iter(
        &mut self,
        names: &[Ident],
        ty: Option<TypeExpr>,
        exprs: Option<Vec<Expr>>,
    ) -> DeclResult<Vec<Stmt>> {
        let (values, ty) = match exprs {
            None => {
                if ty.is_some() {
                    self.error(DeclError::ConstTypeWithoutExpr);
                }
                self.last_const.clone().unwrap_or_default()
            }
            Some(values) => {
                self.last_const = Some((values.clone(), ty.clone()));
                (values, ty)
            }
        };

        let class = self.context.class();
        let iota = self.iota;
        let mut stmts = Vec::new();
        let mut values = values.iter();
        for name in names {
            let Some(value) = values.next() else {
                self.error_at(name.line, DeclError::MissingExpr { what: "const" });
                break;
            };
            if let Some(decl) = self.declare(name, DeclKind::Const, class)? {
                let data = &mut self.decls[decl];
                data.type_expr = ty.clone();
                data.definition = Some(Definition::Const(value.with_iota(iota)));
                data.iota = iota;
                stmts.push(Stmt::DeclConst(decl));
            }
        }
        if values.next().is_some() {
            self.error(DeclError::ExtraExpr { what: "const" });
        }
        self.iota += 1;
        Ok(stmts)
    }

    /// Short variable declaration `a, b := x, y`.
    ///
    /// Names already bound in the active block are assigned, the others are
    /// declared. A one-to-one form collapses to a single assignment.
    ///
    /// # Errors
    ///
    /// Fails like [`Resolver::declare`].
    pub fn colas(&mut self, left: Vec<Expr>, mut right: Vec<Expr>) -> DeclResult<Stmt> {
        let class = self.context.class();
        let block = self.stack.current_block();
        let mut lhs = Vec::with_capacity(left.len());
        let mut init = Vec::new();
        let mut fresh = 0;
        let mut failed = 0;

        for operand in left {
            let ExprKind::Name(sym) = operand.kind else {
                let rendered = operand.render(&self.symtab);
                self.error_at(operand.line, DeclError::NonNameOnLeft { operand: rendered });
                failed += 1;
                lhs.push(Operand::Expr(operand));
                continue;
            };
            if self.symtab.is_blank(sym) {
                lhs.push(Operand::Blank);
                continue;
            }
            if self.symtab.get(sym).block == Some(block) {
                lhs.push(Operand::Decl(self.resolve_name(sym, operand.line)));
                continue;
            }

            fresh += 1;
            let ident = Ident::new(sym, operand.line);
            match self.declare(&ident, DeclKind::Var, class)? {
                Some(decl) => {
                    self.decls[decl].definition = Some(Definition::Define);
                    init.push(Stmt::Decl(decl));
                    lhs.push(Operand::Decl(decl));
                }
                None => lhs.push(Operand::Blank),
            }
        }

        if fresh == 0 && failed == 0 {
            self.error(DeclError::NoNewVariables);
        }

        if lhs.len() == 1 && right.len() == 1 {
            if let (Some(lhs), Some(rhs)) = (lhs.pop(), right.pop()) {
                return Ok(Stmt::Assign {
                    lhs,
                    rhs: Some(rhs),
                    define: true,
                    init,
                });
            }
        }
        Ok(Stmt::AssignList {
            lhs,
            rhs: right,
            define: true,
            init,
        })
    }

    /// Declare a type name bound to a fresh forward type
    ///
    /// # Errors
    ///
    /// Fails like [`Resolver::declare`].
    pub fn type_decl(&mut self, ident: &Ident) -> DeclResult<Option<DeclId>> {
        let class = self.context.class();
        let Some(decl) = self.declare(ident, DeclKind::Type, class)? else {
            return Ok(None);
        };
        let symbol = self.symtab.get(ident.sym);
        let name = TypeName {
            pkg: symbol.pkg,
            name: symbol.name,
        };
        let forward = self.types.forward(name);
        self.decls[decl].ty = Some(forward);
        Ok(Some(decl))
    }

    /// Attach the body of a type declaration; `local` marks types defined in
    /// this compilation unit
    pub fn type_decl_body(&mut self, decl: DeclId, body: TypeExpr, local: bool) -> Stmt {
        let data = &mut self.decls[decl];
        data.type_expr = Some(body);
        data.local = local;
        if let Some(ty) = data.ty {
            self.types.get_mut(ty).local = local;
        }
        Stmt::DeclType(decl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use tn_span::Pos;

    #[test]
    fn blank_is_never_bound() {
        let mut resolver = Resolver::default();
        let file = resolver.add_file("a.go");
        let blank = resolver.lookup("_");
        let ident = Ident::new(blank, Pos::new(file, 1));
        assert_eq!(
            resolver.declare(&ident, DeclKind::Var, DeclClass::External),
            Ok(None)
        );
        assert_eq!(
            resolver.declare(&ident, DeclKind::Var, DeclClass::External),
            Ok(None)
        );
        assert!(resolver.diagnostics().is_empty());
        assert!(resolver.binding(blank).is_none());
    }

    #[test]
    fn automatic_needs_a_function() {
        let mut resolver = Resolver::default();
        let file = resolver.add_file("a.go");
        let x = resolver.lookup("x");
        assert_eq!(
            resolver.declare(&Ident::new(x, Pos::new(file, 1)), DeclKind::Var, DeclClass::Auto),
            Err(InternalError::AutomaticOutsideFunction)
        );
    }

    #[test]
    fn exported_names_are_recorded() {
        let config = ResolverConfig {
            export_symbols: true,
            ..ResolverConfig::default()
        };
        let mut resolver = Resolver::new(config);
        let file = resolver.add_file("a.go");
        let line = Pos::new(file, 1);
        let upper = resolver.lookup("Reader");
        let lower = resolver.lookup("reader");
        let init = resolver.lookup("init");
        let reader = resolver
            .declare(&Ident::new(upper, line), DeclKind::Type, DeclClass::External)
            .unwrap()
            .unwrap();
        let private = resolver
            .declare(&Ident::new(lower, line), DeclKind::Var, DeclClass::External)
            .unwrap()
            .unwrap();
        let init = resolver
            .declare(&Ident::new(init, line), DeclKind::Func, DeclClass::Func)
            .unwrap()
            .unwrap();
        assert_eq!(resolver.exports(), &[reader, init]);
        assert_eq!(resolver.package_syms(), &[private]);
    }

    #[test]
    fn generations_are_counted_per_kind() {
        let mut resolver = Resolver::default();
        let file = resolver.add_file("a.go");
        let line = Pos::new(file, 1);
        let names = ["a", "b", "T"].map(|name| resolver.lookup(name));
        resolver.mark_scope();
        let a = resolver
            .declare(&Ident::new(names[0], line), DeclKind::Var, DeclClass::Param)
            .unwrap()
            .unwrap();
        let t = resolver
            .declare(&Ident::new(names[2], line), DeclKind::Type, DeclClass::Param)
            .unwrap()
            .unwrap();
        let b = resolver
            .declare(&Ident::new(names[1], line), DeclKind::Var, DeclClass::Param)
            .unwrap()
            .unwrap();
        assert_eq!(resolver.decl(a).vargen, 1);
        assert_eq!(resolver.decl(t).vargen, 1);
        assert_eq!(resolver.decl(b).vargen, 2);
        resolver.pop_scope().unwrap();
        assert!(resolver.binding(names[0]).is_none());
    }
}
