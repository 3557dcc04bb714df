//! Declaration and type resolution for Tarn
//!
//! This crate binds identifiers to declarations across nested lexical
//! scopes, builds struct, interface and function types from parsed field
//! lists, attaches methods to their receiver types and turns references to
//! enclosing-function variables into closure captures.
//!
//! # Architecture
//!
//! The resolver consists of:
//! - **Symbol table**: one symbol per `(package, name)` holding the live binding
//! - **Declaration stack**: undo log restoring bindings when a scope closes
//! - **Declaration engine**: `var`, `const`, `type` and `:=` declarations
//! - **Capture resolver**: closure captures keyed by variable and depth
//! - **Type builder**: struct, interface and signature construction
//! - **Method binder**: receiver validation and method name mangling
//! - **Function context**: entering and leaving function bodies
//!
//! User errors are collected as [`Diagnostics`]; an [`InternalError`] means
//! the calling phases are out of step with the resolver and aborts.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tn_decl::{DeclClass, DeclKind, Ident, Resolver, ResolverConfig};
//! use tn_span::Pos;
//!
//! let mut resolver = Resolver::new(ResolverConfig::default());
//! let file = resolver.add_file("main.tn");
//! let x = resolver.lookup("x");
//! resolver.declare(&Ident::new(x, Pos::new(file, 1)), DeclKind::Var, DeclClass::External)?;
//! if !resolver.diagnostics().is_empty() {
//!     eprint!("{}", resolver.render_diagnostics());
//! }
//! ```

pub mod build;
pub mod capture;
pub mod config;
pub mod decl;
pub mod declare;
pub mod error;
pub mod func;
pub mod method;
pub mod resolver;
pub mod scope;
pub mod symbol;
pub mod syntax;
pub mod typeref;

pub use config::{ConfigError, ResolverConfig};
pub use decl::{
    DeclClass, DeclData, DeclId, DeclKind, Definition, FieldRef, FuncData, FuncId,
    FunctionContext, WalkState,
};
pub use error::{DeclError, DeclResult, Diagnostic, Diagnostics, InternalError};
pub use resolver::Resolver;
pub use scope::{BlockId, DeclStack, Snapshot, StackEntry};
pub use symbol::{is_exported, SymbolData, SymbolId, SymbolTable};
pub use syntax::{
    ArgItem, BinaryOp, Expr, ExprKind, FieldDecl, FuncTypeExpr, Ident, Literal, Operand, Stmt,
    TypeExpr,
};
