//! Type references
//!
//! Resolves type expressions to types. Named types are defined on demand:
//! using a type declared later in the unit defines it first, and a type
//! used inside its own definition resolves to its forward type.

use crate::decl::{DeclId, DeclKind, WalkState};
use crate::error::{DeclError, DeclResult};
use crate::resolver::Resolver;
use crate::syntax::TypeExpr;
use tn_ty::{TypeId, TypeKind};

impl Resolver {
    /// Resolve a type expression; `None` when it names no valid type
    ///
    /// # Errors
    ///
    /// Propagates internal errors from interface method declarations.
    pub fn resolve_type(&mut self, expr: &TypeExpr) -> DeclResult<Option<TypeId>> {
        let ty = match expr {
            TypeExpr::Resolved(ty) => Some(*ty),
            TypeExpr::Name { sym, line } => {
                let Some(decl) = self.symtab.get(*sym).def else {
                    let name = self.symtab.name(*sym).to_string();
                    self.error_at(*line, DeclError::Undefined { name });
                    return Ok(None);
                };
                if self.decls[decl].kind != DeclKind::Type {
                    let name = self.symtab.name(*sym).to_string();
                    self.error_at(*line, DeclError::NotAType { name });
                    return Ok(None);
                }
                self.define_type(decl)?
            }
            TypeExpr::Pointer(inner) => self
                .resolve_type(inner)?
                .map(|elem| self.types.pointer_to(elem)),
            TypeExpr::Slice(inner) | TypeExpr::Ellipsis(inner) => self
                .resolve_type(inner)?
                .map(|elem| self.types.alloc(TypeKind::Slice(elem))),
            TypeExpr::Struct(fields) => Some(self.build_struct(fields)?),
            TypeExpr::Interface(fields) => Some(self.build_interface(fields)?),
            TypeExpr::Func(sig) => Some(self.build_function_type(
                sig.receiver.as_ref(),
                &sig.params,
                &sig.results,
            )?),
        };
        Ok(ty)
    }

    /// Complete a declared type from its body.
    ///
    /// Returns the declaration's type, which is still the forward type when
    /// the definition is in progress further up the call chain.
    ///
    /// # Errors
    ///
    /// Propagates internal errors from resolving the body.
    pub fn define_type(&mut self, decl: DeclId) -> DeclResult<Option<TypeId>> {
        let data = &self.decls[decl];
        let Some(forward) = data.ty else {
            return Ok(None);
        };
        if data.walk != WalkState::Pending {
            return Ok(Some(forward));
        }
        let Some(body) = data.type_expr.clone() else {
            // Declared but the body has not been attached yet.
            return Ok(Some(forward));
        };
        self.decls[decl].walk = WalkState::InProgress;

        let saved = self.line;
        self.line = self.decls[decl].line;
        match self.resolve_type(&body)? {
            None => self.types.get_mut(forward).broke = true,
            Some(underlying) if self.types.get(underlying).is_forward() => {
                let printed = self.render_type(forward);
                self.types.get_mut(forward).broke = true;
                self.error(DeclError::InvalidRecursiveType { ty: printed });
            }
            Some(underlying) => {
                self.types.complete(forward, underlying);
                let ty = self.types.get(forward);
                if let Some(embed_line) = ty.embed_line {
                    if ty.is_ptr() {
                        self.error_at(embed_line, DeclError::EmbeddedPointer);
                    }
                }
                if !self.types.get(forward).broke {
                    self.check_width(forward);
                }
            }
        }
        self.line = saved;

        self.decls[decl].walk = WalkState::Done;
        Ok(Some(forward))
    }

    /// Define every type declared so far whose body is attached
    ///
    /// # Errors
    ///
    /// Propagates internal errors from resolving the bodies.
    pub fn define_pending_types(&mut self, decls: &[DeclId]) -> DeclResult<()> {
        for &decl in decls {
            if self.decls[decl].kind == DeclKind::Type {
                self.define_type(decl)?;
            }
        }
        Ok(())
    }
}
