//! Printing types for diagnostics and mangled method names

use crate::ty::{Field, FuncType, TypeArena, TypeId, TypeKind};
use std::fmt;
use tn_intern::Interner;

/// A type rendered with access to its arena and the name interner
pub struct TypeDisplay<'a> {
    types: &'a TypeArena,
    interner: &'a Interner,
    id: TypeId,
}

impl TypeArena {
    /// Printable form of a type
    pub fn display<'a>(&'a self, id: TypeId, interner: &'a Interner) -> TypeDisplay<'a> {
        TypeDisplay {
            types: self,
            interner,
            id,
        }
    }
}

impl TypeDisplay<'_> {
    fn with(&self, id: TypeId) -> Self {
        Self {
            types: self.types,
            interner: self.interner,
            id,
        }
    }

    fn field(&self, f: &mut fmt::Formatter<'_>, field: &Field) -> fmt::Result {
        if let Some(name) = field.name {
            if !field.embedded {
                write!(f, "{} ", self.interner.resolve(name))?;
            }
        }
        match field.ty {
            Some(ty) if field.is_ddd => match self.types.get(ty).kind {
                TypeKind::Slice(elem) => write!(f, "...{}", self.with(elem)),
                _ => write!(f, "...{}", self.with(ty)),
            },
            Some(ty) => write!(f, "{}", self.with(ty)),
            None => f.write_str("<broken>"),
        }
    }

    fn tuple(&self, f: &mut fmt::Formatter<'_>, tuple: TypeId) -> fmt::Result {
        for (idx, field) in self.types.get(tuple).fields().iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            self.field(f, field)?;
        }
        Ok(())
    }

    /// `(params) results`, shared by function types and interface methods
    fn signature(&self, f: &mut fmt::Formatter<'_>, func: &FuncType) -> fmt::Result {
        f.write_str("(")?;
        self.tuple(f, func.inputs)?;
        f.write_str(")")?;
        let outputs = self.types.get(func.outputs).fields();
        match outputs {
            [] => Ok(()),
            [only] if only.name.is_none() => {
                f.write_str(" ")?;
                self.field(f, only)
            }
            _ => {
                f.write_str(" (")?;
                self.tuple(f, func.outputs)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = self.types.get(self.id);
        if let Some(name) = ty.name {
            return f.write_str(self.interner.resolve(name.name));
        }
        match &ty.kind {
            TypeKind::Forward => f.write_str("<forward>"),
            TypeKind::Basic(kind) => f.write_str(kind.as_str()),
            TypeKind::Pointer(elem) => write!(f, "*{}", self.with(*elem)),
            TypeKind::Slice(elem) => write!(f, "[]{}", self.with(*elem)),
            TypeKind::Struct(body) if body.funarg => {
                f.write_str("(")?;
                self.tuple(f, self.id)?;
                f.write_str(")")
            }
            TypeKind::Struct(body) => {
                if body.fields.is_empty() {
                    return f.write_str("struct {}");
                }
                f.write_str("struct { ")?;
                for (idx, field) in body.fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("; ")?;
                    }
                    self.field(f, field)?;
                    if let Some(note) = &field.note {
                        write!(f, " {note:?}")?;
                    }
                }
                f.write_str(" }")
            }
            TypeKind::Interface(methods) => {
                if methods.is_empty() {
                    return f.write_str("interface {}");
                }
                f.write_str("interface { ")?;
                for (idx, method) in methods.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("; ")?;
                    }
                    if let Some(name) = method.name {
                        f.write_str(self.interner.resolve(name))?;
                    }
                    match method.ty.and_then(|ty| self.types.func(ty)) {
                        Some(func) => self.signature(f, func)?,
                        None => f.write_str("(...)")?,
                    }
                }
                f.write_str(" }")
            }
            TypeKind::Func(func) => {
                if func.this_tuple {
                    f.write_str("method(")?;
                    self.tuple(f, func.receiver)?;
                    f.write_str(")")?;
                }
                f.write_str("func")?;
                self.signature(f, func)
            }
            TypeKind::InterfaceMethod => f.write_str("func(...)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ty::{BasicKind, Field, PkgId, StructType, TypeArena, TypeKind, TypeName};
    use tn_intern::Interner;
    use tn_span::{FileId, Pos};

    #[test]
    fn prints_composite_types() {
        let mut interner = Interner::new();
        let mut types = TypeArena::new();
        let int = types.alloc(TypeKind::Basic(BasicKind::Int));
        let node = types.forward(TypeName {
            pkg: PkgId(1),
            name: interner.intern("Node"),
        });
        let next = types.pointer_to(node);
        let mut value = Field::new(Pos::new(FileId(0), 1));
        value.name = Some(interner.intern("value"));
        value.ty = Some(int);
        let mut link = Field::new(Pos::new(FileId(0), 2));
        link.name = Some(interner.intern("next"));
        link.ty = Some(next);
        link.note = Some("json".to_string());
        let body = types.alloc(TypeKind::Struct(StructType {
            fields: vec![value, link],
            funarg: false,
        }));
        let slice = types.alloc(TypeKind::Slice(next));

        assert_eq!(
            types.display(body, &interner).to_string(),
            r#"struct { value int; next *Node "json" }"#
        );
        assert_eq!(types.display(slice, &interner).to_string(), "[]*Node");
    }
}
