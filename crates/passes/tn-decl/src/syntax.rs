//! Declaration nodes produced by the parser
//!
//! These are the inputs of the resolver. Names are already looked up as
//! symbols; nothing here is bound until one of the resolver's declaration
//! operations runs.

use crate::decl::DeclId;
use crate::symbol::{SymbolId, SymbolTable};
use tn_span::Pos;
use tn_ty::TypeId;

/// A name being declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    pub sym: SymbolId,
    pub line: Pos,
}

impl Ident {
    pub fn new(sym: SymbolId, line: Pos) -> Self {
        Self { sym, line }
    }
}

/// Constant literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Char(char),
    Str(String),
    Nil,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Shl,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Shl => "<<",
            Self::Or => "|",
        }
    }
}

/// An expression, left for the type checker to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Lit(Literal),
    /// The enumeration counter of the enclosing `const` group
    Iota,
    Name(SymbolId),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `&x`
    AddrOf(Box<Expr>),
    /// `x.f`
    Selector {
        base: Box<Expr>,
        field: SymbolId,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, line: Pos) -> Self {
        Self { kind, line }
    }

    pub fn name(sym: SymbolId, line: Pos) -> Self {
        Self::new(ExprKind::Name(sym), line)
    }

    pub fn int(value: i64, line: Pos) -> Self {
        Self::new(ExprKind::Lit(Literal::Int(value)), line)
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        let line = callee.line;
        Self::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            line,
        )
    }

    /// Deep copy with every `iota` replaced by its value
    pub fn with_iota(&self, iota: i64) -> Expr {
        let kind = match &self.kind {
            ExprKind::Iota => ExprKind::Lit(Literal::Int(iota)),
            ExprKind::Lit(_) | ExprKind::Name(_) => self.kind.clone(),
            ExprKind::Call { callee, args } => ExprKind::Call {
                callee: Box::new(callee.with_iota(iota)),
                args: args.iter().map(|arg| arg.with_iota(iota)).collect(),
            },
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op: *op,
                lhs: Box::new(lhs.with_iota(iota)),
                rhs: Box::new(rhs.with_iota(iota)),
            },
            ExprKind::AddrOf(inner) => ExprKind::AddrOf(Box::new(inner.with_iota(iota))),
            ExprKind::Selector { base, field } => ExprKind::Selector {
                base: Box::new(base.with_iota(iota)),
                field: *field,
            },
        };
        Expr::new(kind, self.line)
    }

    /// Source-like rendering for diagnostics
    pub fn render(&self, table: &SymbolTable) -> String {
        match &self.kind {
            ExprKind::Lit(Literal::Int(value)) => value.to_string(),
            ExprKind::Lit(Literal::Bool(value)) => value.to_string(),
            ExprKind::Lit(Literal::Char(value)) => format!("{value:?}"),
            ExprKind::Lit(Literal::Str(value)) => format!("{value:?}"),
            ExprKind::Lit(Literal::Nil) => "nil".to_string(),
            ExprKind::Iota => "iota".to_string(),
            ExprKind::Name(sym) => table.name(*sym).to_string(),
            ExprKind::Call { callee, args } => {
                let args: Vec<String> = args.iter().map(|arg| arg.render(table)).collect();
                format!("{}({})", callee.render(table), args.join(", "))
            }
            ExprKind::Binary { op, lhs, rhs } => format!(
                "{} {} {}",
                lhs.render(table),
                op.as_str(),
                rhs.render(table)
            ),
            ExprKind::AddrOf(inner) => format!("&{}", inner.render(table)),
            ExprKind::Selector { base, field } => {
                format!("{}.{}", base.render(table), table.name(*field))
            }
        }
    }
}

/// A type as written in source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Name { sym: SymbolId, line: Pos },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// `...T`; only valid as the last input parameter
    Ellipsis(Box<TypeExpr>),
    Struct(Vec<FieldDecl>),
    Interface(Vec<FieldDecl>),
    Func(Box<FuncTypeExpr>),
    /// Already resolved by an earlier phase
    Resolved(TypeId),
}

impl TypeExpr {
    pub fn name(sym: SymbolId, line: Pos) -> Self {
        Self::Name { sym, line }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        Self::Pointer(Box::new(inner))
    }

    pub fn slice(inner: TypeExpr) -> Self {
        Self::Slice(Box::new(inner))
    }

    pub fn func(sig: FuncTypeExpr) -> Self {
        Self::Func(Box::new(sig))
    }
}

/// One entry of a struct, interface or parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field, method or parameter name; `None` for anonymous entries
    pub name: Option<SymbolId>,
    pub ty: Option<TypeExpr>,
    /// Annotation; only string literals are accepted
    pub tag: Option<Literal>,
    pub embedded: bool,
    pub is_ddd: bool,
    pub line: Pos,
    /// Parameter declaration made for this entry by a function header
    pub decl: Option<DeclId>,
}

impl FieldDecl {
    pub fn new(name: Option<SymbolId>, ty: Option<TypeExpr>, line: Pos) -> Self {
        Self {
            name,
            ty,
            tag: None,
            embedded: false,
            is_ddd: false,
            line,
            decl: None,
        }
    }

    pub fn named(name: SymbolId, ty: TypeExpr, line: Pos) -> Self {
        Self::new(Some(name), Some(ty), line)
    }

    pub fn anonymous(ty: TypeExpr, line: Pos) -> Self {
        Self::new(None, Some(ty), line)
    }

    pub fn with_tag(mut self, tag: Literal) -> Self {
        self.tag = Some(tag);
        self
    }
}

/// A function signature as written in source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuncTypeExpr {
    pub receiver: Option<FieldDecl>,
    pub params: Vec<FieldDecl>,
    pub results: Vec<FieldDecl>,
}

impl FuncTypeExpr {
    pub fn new(params: Vec<FieldDecl>, results: Vec<FieldDecl>) -> Self {
        Self {
            receiver: None,
            params,
            results,
        }
    }

    pub fn with_receiver(mut self, receiver: FieldDecl) -> Self {
        self.receiver = Some(receiver);
        self
    }
}

/// Raw parameter list entry before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgItem {
    /// `name T`
    Keyed {
        name: SymbolId,
        ty: TypeExpr,
        line: Pos,
    },
    /// `T`, or a name whose type follows later in the list
    Bare { ty: TypeExpr, line: Pos },
}

impl ArgItem {
    pub fn line(&self) -> Pos {
        match self {
            Self::Keyed { line, .. } | Self::Bare { line, .. } => *line,
        }
    }
}

/// Target of an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Decl(DeclId),
    Blank,
    Expr(Expr),
}

/// Statements synthesized by declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Storage for a local variable
    Decl(DeclId),
    DeclConst(DeclId),
    DeclType(DeclId),
    Assign {
        lhs: Operand,
        rhs: Option<Expr>,
        /// Came from `:=`
        define: bool,
        init: Vec<Stmt>,
    },
    /// Multi-value assignment
    AssignList {
        lhs: Vec<Operand>,
        rhs: Vec<Expr>,
        define: bool,
        init: Vec<Stmt>,
    },
}
