//! Type graph shared by declaration resolution and later phases
//!
//! Types live in a [`TypeArena`] and are addressed by [`TypeId`]. Named types
//! start out as [`TypeKind::Forward`] and are completed in place once their
//! definition is resolved, so every reference taken earlier observes the
//! final shape.

pub mod display;
pub mod identity;
pub mod layout;
pub mod ty;

pub use display::TypeDisplay;
pub use layout::{Layout, RecursiveType};
pub use ty::{
    BasicKind, Field, FuncType, PkgId, StructType, Type, TypeArena, TypeId, TypeKind, TypeName,
};

use tn_intern::Interner;

/// Put an interface method set into canonical (name) order.
///
/// Later phases compare interface shapes field by field, so every interface
/// must list its methods in the same order.
pub fn sort_methods(methods: &mut [Field], interner: &Interner) {
    methods.sort_by(|a, b| match (a.name, b.name) {
        (Some(x), Some(y)) => interner.resolve(x).cmp(interner.resolve(y)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
