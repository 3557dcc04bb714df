//! Type widths

use crate::ty::{BasicKind, TypeArena, TypeId, TypeKind};
use rustc_hash::FxHashSet;

/// Target word sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Size of a pointer in bytes
    pub ptr_width: u64,
    /// Size of `int`/`uint` in bytes
    pub int_width: u64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            ptr_width: 8,
            int_width: 8,
        }
    }
}

impl Layout {
    fn basic(&self, kind: BasicKind) -> u64 {
        match kind {
            BasicKind::Bool | BasicKind::Int8 | BasicKind::Uint8 => 1,
            BasicKind::Int16 | BasicKind::Uint16 => 2,
            BasicKind::Int32 | BasicKind::Uint32 | BasicKind::Float32 => 4,
            BasicKind::Int64 | BasicKind::Uint64 | BasicKind::Float64 => 8,
            BasicKind::Int | BasicKind::Uint => self.int_width,
            BasicKind::String => self.ptr_width + self.int_width,
        }
    }
}

/// A struct contains itself by value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursiveType(pub TypeId);

impl TypeArena {
    /// Compute and cache the width of a type.
    ///
    /// `Ok(None)` means the width depends on a type that is still forward
    /// declared and must be computed again once it is defined.
    ///
    /// # Errors
    ///
    /// Returns `RecursiveType` when a struct contains itself by value.
    pub fn width(&mut self, id: TypeId, layout: &Layout) -> Result<Option<u64>, RecursiveType> {
        let mut visiting = FxHashSet::default();
        self.width_in(id, layout, &mut visiting)
    }

    fn width_in(
        &mut self,
        id: TypeId,
        layout: &Layout,
        visiting: &mut FxHashSet<TypeId>,
    ) -> Result<Option<u64>, RecursiveType> {
        let ty = self.get(id);
        if let Some(width) = ty.width {
            return Ok(Some(width));
        }
        // Broken types were already reported; they occupy no space.
        if ty.broke {
            return Ok(Some(0));
        }

        let width = match &self.get(id).kind {
            TypeKind::Forward => return Ok(None),
            TypeKind::Basic(kind) => layout.basic(*kind),
            TypeKind::Pointer(_) | TypeKind::Func(_) | TypeKind::InterfaceMethod => {
                layout.ptr_width
            }
            TypeKind::Slice(_) => layout.ptr_width + 2 * layout.int_width,
            TypeKind::Interface(_) => 2 * layout.ptr_width,
            TypeKind::Struct(body) => {
                let field_types: Vec<Option<TypeId>> =
                    body.fields.iter().map(|field| field.ty).collect();
                if !visiting.insert(id) {
                    return Err(RecursiveType(id));
                }
                let result = self.struct_width(&field_types, layout, visiting);
                visiting.remove(&id);
                match result? {
                    Some(width) => width,
                    None => return Ok(None),
                }
            }
        };

        self.get_mut(id).width = Some(width);
        Ok(Some(width))
    }

    fn struct_width(
        &mut self,
        field_types: &[Option<TypeId>],
        layout: &Layout,
        visiting: &mut FxHashSet<TypeId>,
    ) -> Result<Option<u64>, RecursiveType> {
        let mut offset = 0;
        let mut max_align = 1;
        for ty in field_types {
            // Broken fields were already reported; they occupy no space.
            let Some(ty) = *ty else { continue };
            let Some(width) = self.width_in(ty, layout, visiting)? else {
                return Ok(None);
            };
            let align = self.align(ty, layout);
            offset = align_to(offset, align) + width;
            max_align = max_align.max(align);
        }
        Ok(Some(align_to(offset, max_align)))
    }

    /// Alignment of a type whose width is known
    pub fn align(&self, id: TypeId, layout: &Layout) -> u64 {
        let ty = self.get(id);
        if ty.broke {
            return 1;
        }
        match &ty.kind {
            TypeKind::Basic(kind) => layout.basic(*kind).min(layout.ptr_width).max(1),
            TypeKind::Struct(body) => body
                .fields
                .iter()
                .filter_map(|field| field.ty)
                .map(|ty| self.align(ty, layout))
                .max()
                .unwrap_or(1),
            _ => layout.ptr_width,
        }
    }
}

/// Align offset to the given alignment
fn align_to(offset: u64, align: u64) -> u64 {
    (offset + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{Field, StructType, TypeName, PkgId};
    use tn_intern::Interner;
    use tn_span::{FileId, Pos};

    fn field(ty: TypeId) -> Field {
        let mut field = Field::new(Pos::new(FileId(0), 1));
        field.ty = Some(ty);
        field
    }

    fn strukt(types: &mut TypeArena, fields: Vec<Field>) -> TypeId {
        types.alloc(TypeKind::Struct(StructType {
            fields,
            funarg: false,
        }))
    }

    #[test]
    fn struct_fields_are_aligned() {
        let mut types = TypeArena::new();
        let layout = Layout::default();
        let byte = types.alloc(TypeKind::Basic(BasicKind::Uint8));
        let int = types.alloc(TypeKind::Basic(BasicKind::Int));
        let id = strukt(&mut types, vec![field(byte), field(int), field(byte)]);
        assert_eq!(types.width(id, &layout), Ok(Some(24)));
        assert_eq!(types.get(id).width, Some(24));
    }

    #[test]
    fn forward_fields_defer_the_width() {
        let mut interner = Interner::new();
        let mut types = TypeArena::new();
        let fwd = types.forward(TypeName {
            pkg: PkgId(1),
            name: interner.intern("T"),
        });
        let ptr = types.pointer_to(fwd);
        let by_pointer = strukt(&mut types, vec![field(ptr)]);
        let by_value = strukt(&mut types, vec![field(fwd)]);
        assert_eq!(types.width(by_pointer, &Layout::default()), Ok(Some(8)));
        assert_eq!(types.width(by_value, &Layout::default()), Ok(None));
    }

    #[test]
    fn by_value_cycles_are_detected() {
        let mut interner = Interner::new();
        let mut types = TypeArena::new();
        let fwd = types.forward(TypeName {
            pkg: PkgId(1),
            name: interner.intern("T"),
        });
        let body = strukt(&mut types, vec![field(fwd)]);
        types.complete(fwd, body);
        assert_eq!(
            types.width(fwd, &Layout::default()),
            Err(RecursiveType(fwd))
        );
    }

    #[test]
    fn broken_members_occupy_no_space() {
        let mut interner = Interner::new();
        let mut types = TypeArena::new();
        let fwd = types.forward(TypeName {
            pkg: PkgId(1),
            name: interner.intern("T"),
        });
        let body = strukt(&mut types, vec![field(fwd)]);
        types.complete(fwd, body);
        types.get_mut(fwd).broke = true;
        let int = types.alloc(TypeKind::Basic(BasicKind::Int));
        let outer = strukt(&mut types, vec![field(fwd), field(int)]);
        assert_eq!(types.width(outer, &Layout::default()), Ok(Some(8)));
    }

    #[test]
    fn word_sized_types_follow_the_layout() {
        let mut types = TypeArena::new();
        let layout = Layout {
            ptr_width: 4,
            int_width: 4,
        };
        let int = types.alloc(TypeKind::Basic(BasicKind::Int));
        let slice = types.alloc(TypeKind::Slice(int));
        let iface = types.alloc(TypeKind::Interface(Vec::new()));
        assert_eq!(types.width(int, &layout), Ok(Some(4)));
        assert_eq!(types.width(slice, &layout), Ok(Some(12)));
        assert_eq!(types.width(iface, &layout), Ok(Some(8)));
    }
}
