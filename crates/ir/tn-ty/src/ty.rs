//! Type representation

use la_arena::{Arena, Idx};
use rustc_hash::FxHashMap;
use tn_intern::Name;
use tn_span::Pos;

/// Type ID for arena allocation
pub type TypeId = Idx<Type>;

/// Identifier of a package within one compilation
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct PkgId(pub u32);

/// The declared name of a named type
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct TypeName {
    /// Package the type was declared in
    pub pkg: PkgId,
    /// Type name
    pub name: Name,
}

/// Predeclared scalar types
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
}

impl BasicKind {
    /// Spelling used in source and in printed types
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
        }
    }

    /// Every predeclared scalar, in declaration order
    pub const ALL: [Self; 14] = [
        Self::Bool,
        Self::Int,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Float32,
        Self::Float64,
        Self::String,
    ];
}

/// A struct, interface or argument-list field
///
/// Methods in a method table and interface method sets are fields too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name, absent for anonymous arguments
    pub name: Option<Name>,
    /// Field type, absent when it failed to resolve
    pub ty: Option<TypeId>,
    /// String annotation
    pub note: Option<String>,
    /// Embedded (anonymous) field
    pub embedded: bool,
    /// Final `...T` argument
    pub is_ddd: bool,
    /// The type of this field failed to resolve
    pub broke: bool,
    /// Where the field was declared
    pub line: Pos,
}

impl Field {
    pub fn new(line: Pos) -> Self {
        Self {
            name: None,
            ty: None,
            note: None,
            embedded: false,
            is_ddd: false,
            broke: false,
            line,
        }
    }
}

/// Struct and argument-list body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    /// Fields in declaration order
    pub fields: Vec<Field>,
    /// This struct is a function argument tuple
    pub funarg: bool,
}

/// Function signature
///
/// The three tuples are laid out receiver, outputs, inputs; code generation
/// relies on that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncType {
    /// Receiver tuple (zero or one field)
    pub receiver: TypeId,
    /// Result tuple
    pub outputs: TypeId,
    /// Parameter tuple
    pub inputs: TypeId,
    /// A receiver is present
    pub this_tuple: bool,
    /// Number of parameters
    pub in_tuple: usize,
    /// Number of results
    pub out_tuple: usize,
    /// Results are named
    pub out_named: bool,
}

impl FuncType {
    /// The argument tuples in layout order
    pub fn tuples(&self) -> [TypeId; 3] {
        [self.receiver, self.outputs, self.inputs]
    }
}

/// Kind of type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Declared but not yet defined
    Forward,
    /// Predeclared scalar
    Basic(BasicKind),
    /// `*T`
    Pointer(TypeId),
    /// `[]T`
    Slice(TypeId),
    /// Struct or argument tuple
    Struct(StructType),
    /// Interface method set, sorted by name
    Interface(Vec<Field>),
    /// Function signature
    Func(FuncType),
    /// Interface method whose signature is still queued for resolution
    InterfaceMethod,
}

/// A type in the type graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    /// Type kind
    pub kind: TypeKind,
    /// Name for named types
    pub name: Option<TypeName>,
    /// Poisoned by an earlier resolution failure
    pub broke: bool,
    /// Cached layout width
    pub width: Option<u64>,
    /// Defined in the compilation unit being resolved
    pub local: bool,
    /// Method table, in declaration order
    pub methods: Vec<Field>,
    /// First line that embedded this type while it was still a forward type
    pub embed_line: Option<Pos>,
}

impl Type {
    fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            name: None,
            broke: false,
            width: None,
            local: false,
            methods: Vec::new(),
            embed_line: None,
        }
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface(_))
    }

    pub fn is_forward(&self) -> bool {
        matches!(self.kind, TypeKind::Forward)
    }

    /// Struct fields or interface methods, empty for other kinds
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            TypeKind::Struct(body) => &body.fields,
            TypeKind::Interface(methods) => methods,
            _ => &[],
        }
    }
}

/// Type arena for allocating types
#[derive(Debug, Default, Clone)]
pub struct TypeArena {
    arena: Arena<Type>,
    pointers: FxHashMap<TypeId, TypeId>,
}

impl TypeArena {
    /// Create a new type arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a type
    pub fn alloc(&mut self, kind: TypeKind) -> TypeId {
        self.arena.alloc(Type::new(kind))
    }

    /// Allocate a named type
    pub fn alloc_named(&mut self, kind: TypeKind, name: TypeName) -> TypeId {
        let mut ty = Type::new(kind);
        ty.name = Some(name);
        self.arena.alloc(ty)
    }

    /// Get a type by ID
    pub fn get(&self, id: TypeId) -> &Type {
        &self.arena[id]
    }

    /// Get a type by ID for in-place completion
    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.arena[id]
    }

    /// Number of allocated types
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Allocate a forward type for a name being declared
    pub fn forward(&mut self, name: TypeName) -> TypeId {
        self.alloc_named(TypeKind::Forward, name)
    }

    /// `*elem`, shared between callers
    pub fn pointer_to(&mut self, elem: TypeId) -> TypeId {
        if let Some(&ptr) = self.pointers.get(&elem) {
            return ptr;
        }
        let ptr = self.alloc(TypeKind::Pointer(elem));
        self.pointers.insert(elem, ptr);
        ptr
    }

    /// Element type of an unnamed or named pointer
    pub fn pointee(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id).kind {
            TypeKind::Pointer(elem) => Some(elem),
            _ => None,
        }
    }

    /// Signature of a function type
    pub fn func(&self, id: TypeId) -> Option<&FuncType> {
        match &self.get(id).kind {
            TypeKind::Func(func) => Some(func),
            _ => None,
        }
    }

    /// All argument fields of a function type: receiver, outputs, inputs
    pub fn func_fields(&self, id: TypeId) -> impl Iterator<Item = &Field> + '_ {
        self.func(id)
            .map(FuncType::tuples)
            .into_iter()
            .flatten()
            .flat_map(move |tuple| self.get(tuple).fields().iter())
    }

    /// Give a forward (or placeholder) type the shape of `underlying`.
    ///
    /// The id keeps its name, locality and method table so existing
    /// references observe the completed type.
    pub fn complete(&mut self, target: TypeId, underlying: TypeId) {
        let source = self.get(underlying);
        let kind = source.kind.clone();
        let broke = source.broke;
        let width = source.width;
        let ty = self.get_mut(target);
        ty.kind = kind;
        ty.broke |= broke;
        ty.width = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_intern::Interner;
    use tn_span::FileId;

    #[test]
    fn pointer_types_are_shared() {
        let mut types = TypeArena::new();
        let int = types.alloc(TypeKind::Basic(BasicKind::Int));
        let first = types.pointer_to(int);
        let second = types.pointer_to(int);
        assert_eq!(first, second);
        assert_eq!(types.pointee(first), Some(int));
    }

    #[test]
    fn completing_a_forward_type_keeps_its_name() {
        let mut interner = Interner::new();
        let mut types = TypeArena::new();
        let name = TypeName {
            pkg: PkgId(1),
            name: interner.intern("T"),
        };
        let fwd = types.forward(name);
        let body = types.alloc(TypeKind::Struct(StructType {
            fields: vec![Field::new(Pos::new(FileId(0), 1))],
            funarg: false,
        }));
        types.complete(fwd, body);
        let ty = types.get(fwd);
        assert_eq!(ty.name, Some(name));
        assert_eq!(ty.fields().len(), 1);
        assert!(!ty.is_forward());
    }
}
