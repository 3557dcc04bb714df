//! Type builder
//!
//! Turns field declaration lists into struct, interface and function
//! types. Fields whose type failed to resolve are marked broken and poison
//! the type built from them, which suppresses follow-up diagnostics.
//!
//! Interface method signatures are not resolved while their interface is
//! built. Each method gets a [`TypeKind::InterfaceMethod`] placeholder and
//! is queued; [`Resolver::end_type_group`] resolves the queue once the
//! enclosing type group is complete, which lets interfaces refer to each
//! other.

use crate::decl::{DeclClass, FieldRef};
use crate::error::{DeclError, DeclResult};
use crate::resolver::{QueuedMethod, Resolver};
use crate::symbol::SymbolId;
use crate::syntax::{ArgItem, FieldDecl, Literal, TypeExpr};
use tn_span::Pos;
use tn_ty::{sort_methods, Field, FuncType, StructType, TypeId, TypeKind};

/// Separator between a name and its disambiguation suffix
const CENTER_DOT: char = '·';

impl Resolver {
    /// Build one struct field or parameter
    ///
    /// # Errors
    ///
    /// Propagates internal errors from resolving the field type.
    pub fn build_field(&mut self, decl: &FieldDecl) -> DeclResult<Field> {
        let saved = self.line;
        self.line = decl.line;

        let mut field = Field::new(decl.line);
        field.is_ddd = decl.is_ddd;

        let ty = match &decl.ty {
            Some(expr) => self.resolve_type(expr)?,
            None => None,
        };
        if let Some(param) = decl.decl {
            self.decls[param].ty = ty;
        }
        if decl.embedded {
            if let Some(ty) = ty {
                self.check_embedded_type(ty);
            }
        }
        field.ty = ty;
        field.broke = ty.is_none();

        field.note = match &decl.tag {
            None => None,
            Some(Literal::Str(note)) => Some(note.clone()),
            Some(_) => {
                self.error(DeclError::NonStringAnnotation);
                None
            }
        };

        if let Some(name) = decl.name {
            field.name = Some(self.symtab.get(name).name);
            field.embedded = decl.embedded;
        }

        self.line = saved;
        Ok(field)
    }

    fn check_embedded_type(&mut self, ty: TypeId) {
        let mut ty = ty;
        let data = self.types.get(ty);
        if data.name.is_none() {
            if let Some(elem) = self.types.pointee(ty) {
                if self.types.get(elem).is_interface() {
                    self.error(DeclError::EmbeddedPointerToInterface);
                }
                ty = elem;
            }
        }
        let data = self.types.get(ty);
        if data.is_ptr() {
            self.error(DeclError::EmbeddedPointer);
        } else if data.is_forward() && data.embed_line.is_none() {
            self.types.get_mut(ty).embed_line = Some(self.line);
        }
    }

    /// Report the first occurrence of every duplicated non-blank name
    fn check_dup_fields(&mut self, fields: &[Field], what: &'static str) {
        for (idx, field) in fields.iter().enumerate() {
            let Some(name) = field.name else { continue };
            let text = self.symtab.interner().resolve(name);
            if text == "_" {
                continue;
            }
            if fields[idx + 1..].iter().any(|later| later.name == Some(name)) {
                let name = text.to_string();
                self.error_at(field.line, DeclError::DuplicateField { what, name });
            }
        }
    }

    /// `struct { ... }`
    ///
    /// # Errors
    ///
    /// Propagates internal errors from resolving field types.
    pub fn build_struct(&mut self, decls: &[FieldDecl]) -> DeclResult<TypeId> {
        let mut fields = Vec::with_capacity(decls.len());
        for decl in decls {
            fields.push(self.build_field(decl)?);
        }
        let broke = fields.iter().any(|field| field.broke);
        self.check_dup_fields(&fields, "field");

        let ty = self.types.alloc(TypeKind::Struct(StructType {
            fields,
            funarg: false,
        }));
        self.types.get_mut(ty).broke = broke;
        if !broke {
            self.check_width(ty);
        }
        Ok(ty)
    }

    /// Argument tuple of a function type. Input parameters declared by a
    /// function header learn their position in the tuple.
    ///
    /// # Errors
    ///
    /// Propagates internal errors from resolving parameter types.
    pub fn build_function_args(&mut self, decls: &[FieldDecl]) -> DeclResult<TypeId> {
        let mut fields = Vec::with_capacity(decls.len());
        for decl in decls {
            fields.push(self.build_field(decl)?);
        }
        let broke = fields.iter().any(|field| field.broke);
        self.check_dup_fields(&fields, "argument");

        let tuple = self.types.alloc(TypeKind::Struct(StructType {
            fields,
            funarg: true,
        }));
        self.types.get_mut(tuple).broke = broke;

        for (index, decl) in decls.iter().enumerate() {
            let Some(param) = decl.decl else { continue };
            if self.decls[param].class == Some(DeclClass::Param) {
                self.decls[param].param_field = Some(FieldRef { tuple, index });
            }
        }
        Ok(tuple)
    }

    /// One interface entry: a method, queued, or an embedded interface
    ///
    /// # Errors
    ///
    /// Propagates internal errors from declaring the method's parameters.
    pub fn build_interface_field(&mut self, decl: &FieldDecl) -> DeclResult<Field> {
        let saved = self.line;
        self.line = decl.line;

        if decl.tag.is_some() {
            self.error(DeclError::InterfaceMethodAnnotation);
        }
        let mut field = Field::new(decl.line);
        field.is_ddd = decl.is_ddd;

        let ty = match (decl.name, &decl.ty) {
            (Some(name), Some(TypeExpr::Func(sig))) => {
                let mut sig = (**sig).clone();
                if sig.receiver.is_none() {
                    sig.receiver = Some(self.fake_this(decl.line));
                }
                self.declare_interface_method_args(&mut sig)?;

                let placeholder = self.types.alloc(TypeKind::InterfaceMethod);
                self.method_queue.push_back(QueuedMethod {
                    placeholder,
                    sig,
                    line: decl.line,
                });
                field.name = Some(self.symtab.get(name).name);
                field.embedded = decl.embedded;
                Some(placeholder)
            }
            (_, Some(expr)) => {
                let ty = self.resolve_type(expr)?;
                if let Some(ty) = ty {
                    if decl.embedded {
                        self.check_embedded_type(ty);
                    }
                    match self.types.get(ty).kind {
                        TypeKind::Interface(_) => {}
                        // A broken forward type was reported where it was defined.
                        TypeKind::Forward if self.types.get(ty).broke => field.broke = true,
                        TypeKind::Forward => {
                            let printed = self.render_type(ty);
                            self.error(DeclError::InterfaceTypeLoop { ty: printed });
                            field.broke = true;
                        }
                        _ => {
                            let printed = self.render_type(ty);
                            self.error(DeclError::EmbeddedNonInterface { ty: printed });
                            field.broke = true;
                        }
                    }
                }
                ty
            }
            (_, None) => None,
        };

        field.ty = ty;
        if ty.is_none() {
            field.broke = true;
        }
        self.line = saved;
        Ok(field)
    }

    /// `interface { ... }`, with embedded interfaces flattened one level and
    /// the method set in canonical order
    ///
    /// # Errors
    ///
    /// Propagates internal errors from declaring method parameters.
    pub fn build_interface(&mut self, decls: &[FieldDecl]) -> DeclResult<TypeId> {
        let mut methods = Vec::with_capacity(decls.len());
        for decl in decls {
            let field = self.build_interface_field(decl)?;
            if decl.name.is_none() && !field.broke {
                if let Some(TypeKind::Interface(inner)) =
                    field.ty.map(|ty| &self.types.get(ty).kind)
                {
                    for method in inner {
                        let mut inlined = Field::new(decl.line);
                        inlined.name = method.name;
                        inlined.ty = method.ty;
                        inlined.broke = method.broke;
                        methods.push(inlined);
                    }
                    continue;
                }
            }
            methods.push(field);
        }

        let broke = methods.iter().any(|method| method.broke);
        self.check_dup_fields(&methods, "method");
        sort_methods(&mut methods, self.symtab.interner());

        let ty = self.types.alloc(TypeKind::Interface(methods));
        self.types.get_mut(ty).broke = broke;
        self.check_width(ty);
        Ok(ty)
    }

    /// Function type with tuples laid out receiver, outputs, inputs
    ///
    /// # Errors
    ///
    /// Propagates internal errors from resolving parameter types.
    pub fn build_function_type(
        &mut self,
        receiver: Option<&FieldDecl>,
        params: &[FieldDecl],
        results: &[FieldDecl],
    ) -> DeclResult<TypeId> {
        let receiver_fields = match receiver {
            Some(receiver) => std::slice::from_ref(receiver),
            None => &[],
        };
        let receiver_tuple = self.build_function_args(receiver_fields)?;
        let outputs = self.build_function_args(results)?;
        let inputs = self.build_function_args(params)?;

        let broke = [receiver_tuple, outputs, inputs]
            .iter()
            .any(|&tuple| self.types.get(tuple).broke);
        let ty = self.types.alloc(TypeKind::Func(FuncType {
            receiver: receiver_tuple,
            outputs,
            inputs,
            this_tuple: receiver.is_some(),
            in_tuple: params.len(),
            out_tuple: results.len(),
            out_named: results.first().is_some_and(|result| result.name.is_some()),
        }));
        self.types.get_mut(ty).broke = broke;
        Ok(ty)
    }

    /// Normalize a raw parameter list.
    ///
    /// Lists are either all named or all anonymous; in a named list, bare
    /// names take the type of the next `name T` entry. `...T` becomes a
    /// variadic slice field.
    pub fn check_arg_list(&mut self, items: Vec<ArgItem>, input: bool) -> Vec<FieldDecl> {
        let named = items.iter().any(|item| matches!(item, ArgItem::Keyed { .. }));
        if named {
            let mixed = items.iter().find(|item| {
                matches!(item, ArgItem::Bare { ty, .. } if !matches!(ty, TypeExpr::Name { .. }))
            });
            match mixed {
                Some(item) => {
                    self.error_at(item.line(), DeclError::MixedNamedParameters);
                }
                None => {
                    if let Some(last @ ArgItem::Bare { .. }) = items.last() {
                        self.error_at(last.line(), DeclError::FinalParameterNeedsType);
                    }
                }
            }
        }

        let count = items.len();
        let mut fields = Vec::with_capacity(count);
        let mut next_type: Option<TypeExpr> = None;
        for (idx, item) in items.iter().enumerate() {
            let line = item.line();
            let (name, ty) = match item {
                ArgItem::Keyed { name, ty, .. } => {
                    next_type = None;
                    (Some(*name), Some(ty.clone()))
                }
                ArgItem::Bare {
                    ty: TypeExpr::Name { sym, .. },
                    ..
                } if named => {
                    if next_type.is_none() {
                        next_type = items[idx..].iter().find_map(|later| match later {
                            ArgItem::Keyed { ty, .. } => Some(ty.clone()),
                            ArgItem::Bare { .. } => None,
                        });
                    }
                    (Some(*sym), next_type.clone())
                }
                ArgItem::Bare { ty, .. } => (None, Some(ty.clone())),
            };

            let mut is_ddd = false;
            let ty = match ty {
                Some(TypeExpr::Ellipsis(elem)) => {
                    if !input {
                        self.error_at(line, DeclError::VariadicOutput);
                    } else if idx + 1 != count {
                        self.error_at(line, DeclError::VariadicNotFinal);
                    }
                    is_ddd = true;
                    Some(TypeExpr::Slice(elem))
                }
                other => other,
            };
            let mut field = FieldDecl::new(name, ty, line);
            field.is_ddd = is_ddd;
            fields.push(field);
        }
        fields
    }

    /// Struct field embedding the type named by `sym`; the field name drops
    /// any `·suffix`
    pub fn embedded_field(&mut self, sym: SymbolId, line: Pos) -> FieldDecl {
        let full = self.symtab.name(sym);
        let name = match full.find(CENTER_DOT) {
            Some(cut) => full[..cut].to_string(),
            None => full.to_string(),
        };
        let field_name = self.symtab.lookup(&name);
        let mut field = FieldDecl::named(field_name, TypeExpr::name(sym, line), line);
        field.embedded = true;
        field
    }

    /// Anonymous `*struct{}` receiver carried by interface methods
    pub fn fake_this(&mut self, line: Pos) -> FieldDecl {
        let empty = self.types.alloc(TypeKind::Struct(StructType {
            fields: Vec::new(),
            funarg: false,
        }));
        let ptr = self.types.pointer_to(empty);
        FieldDecl::anonymous(TypeExpr::Resolved(ptr), line)
    }

    /// Whether a function type is an interface method, i.e. has an anonymous
    /// `*struct{}` receiver
    pub fn is_interface_method(&self, func: TypeId) -> bool {
        let Some(sig) = self.types.func(func) else {
            return false;
        };
        let Some(receiver) = self.types.get(sig.receiver).fields().first() else {
            return false;
        };
        if receiver.name.is_some() {
            return false;
        }
        let Some(elem) = receiver.ty.and_then(|ty| self.types.pointee(ty)) else {
            return false;
        };
        let elem = self.types.get(elem);
        elem.name.is_none()
            && matches!(&elem.kind, TypeKind::Struct(body) if !body.funarg && body.fields.is_empty())
    }

    /// Resolve queued interface method signatures, including ones queued
    /// while draining
    ///
    /// # Errors
    ///
    /// Propagates internal errors from resolving the signatures.
    pub fn drain_method_queue(&mut self) -> DeclResult<()> {
        while let Some(queued) = self.method_queue.pop_front() {
            let saved = self.line;
            self.line = queued.line;
            let sig = queued.sig;
            let func = self.build_function_type(sig.receiver.as_ref(), &sig.params, &sig.results)?;
            self.types.complete(queued.placeholder, func);
            self.line = saved;
        }
        tracing::trace!(target: "decl", "interface method queue drained");
        Ok(())
    }

    /// Finish a group of type declarations: resolve queued interface
    /// methods, then widths that waited on forward types
    ///
    /// # Errors
    ///
    /// Propagates internal errors from resolving method signatures.
    pub fn end_type_group(&mut self) -> DeclResult<()> {
        self.drain_method_queue()?;
        self.flush_widths();
        Ok(())
    }
}
