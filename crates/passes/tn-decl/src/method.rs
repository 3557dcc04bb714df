//! Method binder

use crate::error::{DeclError, DeclResult, InternalError};
use crate::resolver::Resolver;
use crate::symbol::SymbolId;
use crate::syntax::TypeExpr;
use tn_ty::{Field, TypeId, TypeKind};

/// Suffix of the symbol used when a narrow value receiver is called through
/// an interface
const INTERFACE_SUFFIX: &str = "·i";

impl Resolver {
    /// Named type a receiver of type `ty` attaches methods to.
    ///
    /// One unnamed pointer is looked through. Interfaces, pointers and types
    /// that are not defined yet cannot carry methods.
    pub fn method_type(&self, ty: TypeId) -> Option<TypeId> {
        let mut ty = ty;
        let data = self.types.get(ty);
        if data.name.is_none() {
            ty = self.types.pointee(ty)?;
        }
        let data = self.types.get(ty);
        if data.name.is_none() {
            return None;
        }
        match data.kind {
            TypeKind::Basic(_) | TypeKind::Struct(_) | TypeKind::Slice(_) | TypeKind::Func(_) => {
                Some(ty)
            }
            _ => None,
        }
    }

    /// Attach method `sym` of type `func` to its receiver's base type.
    ///
    /// A second declaration with an identical signature is accepted and
    /// ignored. With `local` set, only types defined in this unit accept
    /// new methods.
    ///
    /// # Errors
    ///
    /// Returns `InternalError::NoMethodSymbol` without a method name.
    pub fn add_method(
        &mut self,
        sym: Option<SymbolId>,
        func: TypeId,
        local: bool,
    ) -> DeclResult<()> {
        let sym = sym.ok_or(InternalError::NoMethodSymbol)?;

        let receiver = self
            .types
            .func(func)
            .and_then(|sig| self.types.get(sig.receiver).fields().first())
            .map(|field| field.ty);
        let receiver = match receiver {
            None => {
                self.error(DeclError::MissingReceiver);
                return Ok(());
            }
            // Already reported where the receiver type failed to resolve.
            Some(None) => return Ok(()),
            Some(Some(receiver)) => receiver,
        };

        let Some(base) = self.method_type(receiver) else {
            let error = self.receiver_error(receiver);
            self.error(error);
            return Ok(());
        };

        let name = self.symtab.get(sym).name;
        let existing = self
            .types
            .get(base)
            .methods
            .iter()
            .find(|method| method.name == Some(name));
        if let Some(existing) = existing {
            let previous = existing.ty;
            if !previous.is_some_and(|previous| self.types.identical(previous, func)) {
                let error = DeclError::MethodRedeclared {
                    base: self.render_type(base),
                    name: self.symtab.name(sym).to_string(),
                    previous: previous.map_or_else(String::new, |ty| self.render_type(ty)),
                    current: self.render_type(func),
                };
                self.error(error);
            }
            return Ok(());
        }

        if local && !self.types.get(base).local {
            let base = self.render_type(base);
            self.error(DeclError::NonLocalMethod { base });
            return Ok(());
        }

        let mut method = Field::new(self.line);
        method.name = Some(name);
        method.ty = Some(func);
        self.types.get_mut(base).methods.push(method);
        Ok(())
    }

    fn receiver_error(&self, receiver: TypeId) -> DeclError {
        let printed = self.render_type(receiver);
        let mut ty = receiver;
        if self.types.get(ty).is_ptr() {
            if self.types.get(ty).name.is_some() {
                return DeclError::ReceiverIsPointer {
                    receiver: printed,
                    base: self.render_type(ty),
                };
            }
            if let Some(elem) = self.types.pointee(ty) {
                ty = elem;
            }
        }
        let data = self.types.get(ty);
        if data.name.is_none() {
            DeclError::ReceiverIsUnnamed {
                receiver: printed,
                base: self.render_type(ty),
            }
        } else if data.is_ptr() {
            DeclError::ReceiverIsPointer {
                receiver: printed,
                base: self.render_type(ty),
            }
        } else if data.is_interface() {
            DeclError::ReceiverIsInterface {
                receiver: printed,
                base: self.render_type(ty),
            }
        } else {
            DeclError::InvalidReceiver { receiver: printed }
        }
    }

    /// Mangled symbol of method `name` on `receiver`: `T.m` or `(*T).m`,
    /// with a `·i` suffix for interface calls on receivers narrower than a
    /// pointer. The symbol lives in the base type's package.
    pub fn method_symbol(
        &mut self,
        name: SymbolId,
        receiver: Option<TypeId>,
        iface: bool,
    ) -> Option<SymbolId> {
        let Some(receiver) = receiver else {
            self.error(DeclError::IllegalReceiver {
                ty: "<nil>".to_string(),
            });
            return None;
        };
        let base = match self.types.get(receiver).name {
            Some(base) => Some(base),
            None => self
                .types
                .pointee(receiver)
                .and_then(|elem| self.types.get(elem).name),
        };
        let Some(base) = base else {
            let ty = self.render_type(receiver);
            self.error(DeclError::IllegalReceiver { ty });
            return None;
        };

        let mut suffix = "";
        if iface {
            let narrow = matches!(
                self.types.width(receiver, &self.layout),
                Ok(Some(width)) if width < self.layout.ptr_width
            );
            if narrow {
                suffix = INTERFACE_SUFFIX;
            }
        }
        let printed = self.render_type(receiver);
        let method = self.symtab.name(name);
        let receiver = self.types.get(receiver);
        let mangled = if receiver.name.is_none() && receiver.is_ptr() {
            format!("({printed}).{method}{suffix}")
        } else {
            format!("{printed}.{method}{suffix}")
        };
        Some(self.symtab.pkg_lookup(&mangled, base.pkg))
    }

    /// Mangled name of method `name` on a resolved receiver type; `name`
    /// itself if the receiver is illegal
    pub fn method_name(&mut self, name: SymbolId, receiver: TypeId) -> SymbolId {
        self.method_symbol(name, Some(receiver), false).unwrap_or(name)
    }

    /// Mangled name of method `name` straight from the receiver syntax
    pub fn method_name_from_syntax(&mut self, name: SymbolId, receiver: &TypeExpr) -> SymbolId {
        let (star, base) = match receiver {
            TypeExpr::Pointer(inner) => (true, inner.as_ref()),
            other => (false, other),
        };
        let TypeExpr::Name { sym: base, .. } = base else {
            return name;
        };
        if self.symtab.is_blank(name) {
            return name;
        }
        let base_name = self.symtab.name(*base);
        let method = self.symtab.name(name);
        let mangled = if star {
            format!("(*{base_name}).{method}")
        } else {
            format!("{base_name}.{method}")
        };
        let pkg = self.symtab.get(*base).pkg;
        self.symtab.pkg_lookup(&mangled, pkg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_span::Pos;

    #[test]
    fn mangles_from_syntax() {
        let mut resolver = Resolver::default();
        let file = resolver.add_file("m.go");
        let line = Pos::new(file, 1);
        let point = resolver.lookup("Point");
        let abs = resolver.lookup("Abs");
        let by_value = resolver.method_name_from_syntax(abs, &TypeExpr::name(point, line));
        let by_pointer = resolver
            .method_name_from_syntax(abs, &TypeExpr::pointer(TypeExpr::name(point, line)));
        assert_eq!(resolver.symbols().name(by_value), "Point.Abs");
        assert_eq!(resolver.symbols().name(by_pointer), "(*Point).Abs");
    }

    #[test]
    fn method_without_receiver_is_reported() {
        let mut resolver = Resolver::default();
        let m = resolver.lookup("M");
        let func = resolver
            .build_function_type(None, &[], &[])
            .unwrap();
        resolver.add_method(Some(m), func, true).unwrap();
        assert_eq!(
            resolver.diagnostics().errors().cloned().collect::<Vec<_>>(),
            vec![DeclError::MissingReceiver]
        );
        assert_eq!(
            resolver.add_method(None, func, true),
            Err(InternalError::NoMethodSymbol)
        );
    }
}
