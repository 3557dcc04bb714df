//! Declarations and functions

use crate::symbol::SymbolId;
use crate::syntax::{Expr, FuncTypeExpr, Ident, TypeExpr};
use la_arena::Idx;
use tn_span::Pos;
use tn_ty::TypeId;

/// Unique identifier for a declaration
pub type DeclId = Idx<DeclData>;

/// Unique identifier for a function being resolved
pub type FuncId = Idx<FuncData>;

/// What a declaration names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Var,
    Const,
    Type,
    Func,
    Param,
    /// Reference to a name with no definition yet
    Unresolved,
}

/// Storage class of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclClass {
    /// Package level
    External,
    /// The function itself
    Func,
    /// Input parameter or receiver
    Param,
    /// Result parameter
    ParamOut,
    /// Local variable
    Auto,
    /// Closure reference to an enclosing function's variable
    ParamRef,
}

/// How a declaration got its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    /// Constant value, with `iota` already substituted
    Const(Expr),
    /// `var x = e`
    Assign,
    /// `var x, y = f()`
    MultiAssign,
    /// `x := e`
    Define,
    Func(FuncId),
    /// Closure capture of the given variable
    Capture(DeclId),
}

/// Progress of a type declaration's definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkState {
    #[default]
    Pending,
    InProgress,
    Done,
}

/// Position of a parameter inside its argument tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef {
    pub tuple: TypeId,
    pub index: usize,
}

/// One named entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclData {
    pub sym: SymbolId,
    pub kind: DeclKind,
    /// `None` until the declaration is bound
    pub class: Option<DeclClass>,
    /// Function nesting depth at declaration; 0 at package level
    pub depth: u32,
    /// Per-kind generation number; 0 for package-level names
    pub vargen: u32,
    pub line: Pos,
    pub ty: Option<TypeId>,
    /// Declared type, resolved later
    pub type_expr: Option<TypeExpr>,
    pub definition: Option<Definition>,
    /// Enclosing function
    pub func: Option<FuncId>,
    /// Enumeration counter when the declaration was made
    pub iota: i64,
    /// Next capture outwards in a closure chain
    pub outer: Option<DeclId>,
    /// Referenced from a nested function
    pub addr_taken: bool,
    pub addressable: bool,
    pub is_ddd: bool,
    pub param_field: Option<FieldRef>,
    /// Type defined in this compilation unit
    pub local: bool,
    pub walk: WalkState,
}

impl DeclData {
    pub fn new(sym: SymbolId, kind: DeclKind, line: Pos) -> Self {
        Self {
            sym,
            kind,
            class: None,
            depth: 0,
            vargen: 0,
            line,
            ty: None,
            type_expr: None,
            definition: None,
            func: None,
            iota: 0,
            outer: None,
            addr_taken: false,
            addressable: true,
            is_ddd: false,
            param_field: None,
            local: false,
            walk: WalkState::Pending,
        }
    }

    /// Plain variables and parameters can be captured by closures
    pub fn is_variable(&self) -> bool {
        matches!(self.kind, DeclKind::Var | DeclKind::Param)
    }

    /// The variable a capture refers to
    pub fn captured(&self) -> Option<DeclId> {
        match self.definition {
            Some(Definition::Capture(original)) => Some(original),
            _ => None,
        }
    }
}

/// A function or closure
#[derive(Debug, Clone)]
pub struct FuncData {
    /// Declared name; `None` for closures
    pub name: Option<Ident>,
    pub decl: Option<DeclId>,
    pub sig: FuncTypeExpr,
    /// Enclosing function while this one is open
    pub outer: Option<FuncId>,
    /// Declarations made inside, in order
    pub locals: Vec<DeclId>,
    /// Capture variables, in order of first use
    pub captures: Vec<DeclId>,
    pub line: Pos,
    pub depth: u32,
}

impl FuncData {
    pub fn new(name: Option<Ident>, sig: FuncTypeExpr, line: Pos) -> Self {
        Self {
            name,
            decl: None,
            sig,
            outer: None,
            locals: Vec::new(),
            captures: Vec::new(),
            line,
            depth: 0,
        }
    }

    pub fn is_method(&self) -> bool {
        self.sig.receiver.is_some()
    }
}

/// Active declaration context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionContext {
    /// Package level
    #[default]
    External,
    /// Inside a function body at the given nesting depth (at least 1)
    Local { depth: u32 },
}

impl FunctionContext {
    pub fn depth(self) -> u32 {
        match self {
            Self::External => 0,
            Self::Local { depth } => depth,
        }
    }

    /// Class of variables declared in this context
    pub fn class(self) -> DeclClass {
        match self {
            Self::External => DeclClass::External,
            Self::Local { .. } => DeclClass::Auto,
        }
    }
}
