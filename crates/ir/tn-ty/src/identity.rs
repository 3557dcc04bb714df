//! Structural type identity

use crate::ty::{Field, TypeArena, TypeId, TypeKind};
use rustc_hash::FxHashSet;

impl TypeArena {
    /// Whether two types are identical.
    ///
    /// Named types are identical only to themselves. Function types compare
    /// their receiver, result and parameter tuples field by field, ignoring
    /// argument names.
    pub fn identical(&self, left: TypeId, right: TypeId) -> bool {
        let mut assumed = FxHashSet::default();
        self.identical_in(left, right, &mut assumed)
    }

    fn identical_in(
        &self,
        left: TypeId,
        right: TypeId,
        assumed: &mut FxHashSet<(TypeId, TypeId)>,
    ) -> bool {
        if left == right {
            return true;
        }
        let (lhs, rhs) = (self.get(left), self.get(right));
        if lhs.name.is_some() || rhs.name.is_some() {
            return false;
        }
        // Recursive unnamed types: assume equal while comparing the pair.
        if !assumed.insert((left, right)) {
            return true;
        }

        match (&lhs.kind, &rhs.kind) {
            (TypeKind::Basic(a), TypeKind::Basic(b)) => a == b,
            (TypeKind::Pointer(a), TypeKind::Pointer(b))
            | (TypeKind::Slice(a), TypeKind::Slice(b)) => self.identical_in(*a, *b, assumed),
            (TypeKind::Struct(a), TypeKind::Struct(b)) => {
                a.funarg == b.funarg && self.fields_identical(&a.fields, &b.fields, true, assumed)
            }
            (TypeKind::Interface(a), TypeKind::Interface(b)) => {
                self.fields_identical(a, b, true, assumed)
            }
            (TypeKind::Func(a), TypeKind::Func(b)) => {
                a.tuples().iter().zip(b.tuples().iter()).all(|(ta, tb)| {
                    self.fields_identical(
                        self.get(*ta).fields(),
                        self.get(*tb).fields(),
                        false,
                        assumed,
                    )
                })
            }
            _ => false,
        }
    }

    fn fields_identical(
        &self,
        left: &[Field],
        right: &[Field],
        by_name: bool,
        assumed: &mut FxHashSet<(TypeId, TypeId)>,
    ) -> bool {
        if left.len() != right.len() {
            return false;
        }
        left.iter().zip(right).all(|(a, b)| {
            if by_name && (a.name != b.name || a.embedded != b.embedded || a.note != b.note) {
                return false;
            }
            if a.is_ddd != b.is_ddd {
                return false;
            }
            match (a.ty, b.ty) {
                (Some(ta), Some(tb)) => self.identical_in(ta, tb, assumed),
                (None, None) => true,
                _ => false,
            }
        })
    }
}
