//! Error types for declaration resolution
//!
//! [`DeclError`] covers mistakes in the program being compiled: they are
//! collected as [`Diagnostic`]s and resolution keeps going. [`InternalError`]
//! means the surrounding phases drove the resolver into an impossible state;
//! it is returned as `Err` and aborts the compilation.

use miette::Diagnostic as MietteDiagnostic;
use tn_span::{Pos, SourceMap};

/// Errors in the program being compiled
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, MietteDiagnostic)]
pub enum DeclError {
    /// Name bound twice in one block
    #[error("{name} redeclared {place}\n\tprevious declaration {previous}")]
    #[diagnostic(code(decl::redeclared))]
    Redeclared {
        /// The redeclared name
        name: String,
        /// Where the clash happened, e.g. "in this block"
        place: &'static str,
        /// `at file:line` or `during import`
        previous: String,
    },

    /// Fewer initializers than names
    #[error("missing expr in {what} dcl")]
    #[diagnostic(code(decl::missing_expr))]
    MissingExpr {
        /// `var` or `const`
        what: &'static str,
    },

    /// More initializers than names
    #[error("extra expr in {what} dcl")]
    #[diagnostic(code(decl::extra_expr))]
    ExtraExpr {
        /// `var` or `const`
        what: &'static str,
    },

    /// `const x T` without a value
    #[error("constdcl cannot have type without expr")]
    #[diagnostic(code(decl::const_type_without_expr))]
    ConstTypeWithoutExpr,

    /// Short declaration with something other than a name on the left
    #[error("non-name {operand} on left side of :=")]
    #[diagnostic(code(decl::non_name_define))]
    NonNameOnLeft {
        /// Printed operand
        operand: String,
    },

    /// Short declaration that declares nothing
    #[error("no new variables on left side of :=")]
    #[diagnostic(code(decl::no_new_variables))]
    NoNewVariables,

    /// Name used but never declared
    #[error("undefined: {name}")]
    #[diagnostic(code(decl::undefined))]
    Undefined {
        /// The undefined name
        name: String,
    },

    /// Non-type name in a type position
    #[error("{name} is not a type")]
    #[diagnostic(code(decl::not_a_type))]
    NotAType {
        /// The offending name
        name: String,
    },

    /// Embedded `*I` with `I` an interface
    #[error("embedded type cannot be a pointer to interface")]
    #[diagnostic(code(decl::embedded_pointer_to_interface))]
    EmbeddedPointerToInterface,

    /// Embedded pointer type other than `*T`
    #[error("embedded type cannot be a pointer")]
    #[diagnostic(code(decl::embedded_pointer))]
    EmbeddedPointer,

    /// Field tag that is not a string literal
    #[error("field annotation must be string")]
    #[diagnostic(code(decl::annotation_not_string))]
    NonStringAnnotation,

    /// Tag on an interface method
    #[error("interface method cannot have annotation")]
    #[diagnostic(code(decl::interface_method_annotation))]
    InterfaceMethodAnnotation,

    /// Two fields, arguments or methods with one name
    #[error("duplicate {what} {name}")]
    #[diagnostic(code(decl::duplicate_field))]
    DuplicateField {
        /// `field`, `argument` or `method`
        what: &'static str,
        /// The duplicated name
        name: String,
    },

    /// Interface embedding a type that is still being defined
    #[error("interface type loop involving {ty}")]
    #[diagnostic(code(decl::interface_loop))]
    InterfaceTypeLoop {
        /// Printed type
        ty: String,
    },

    /// Interface embedding a non-interface type
    #[error("interface contains embedded non-interface {ty}")]
    #[diagnostic(code(decl::embedded_non_interface))]
    EmbeddedNonInterface {
        /// Printed type
        ty: String,
    },

    /// Type that contains itself by value
    #[error("invalid recursive type {ty}")]
    #[diagnostic(code(decl::recursive_type))]
    InvalidRecursiveType {
        /// Printed type
        ty: String,
    },

    /// Parameter list mixing `name T` and bare `T`
    #[error("mixed named and unnamed function parameters")]
    #[diagnostic(code(decl::mixed_parameters))]
    MixedNamedParameters,

    /// Named parameter list ending in a bare name
    #[error("final function parameter must have type")]
    #[diagnostic(code(decl::final_parameter_type))]
    FinalParameterNeedsType,

    /// `...T` among the results
    #[error("cannot use ... in output argument list")]
    #[diagnostic(code(decl::variadic_output))]
    VariadicOutput,

    /// `...T` before the last parameter
    #[error("can only use ... as final argument in list")]
    #[diagnostic(code(decl::variadic_not_final))]
    VariadicNotFinal,

    /// Receiver type with no base type to mangle
    #[error("illegal receiver type: {ty}")]
    #[diagnostic(code(decl::illegal_receiver))]
    IllegalReceiver {
        /// Printed receiver type
        ty: String,
    },

    /// Method signature without receiver
    #[error("missing receiver")]
    #[diagnostic(code(decl::missing_receiver))]
    MissingReceiver,

    /// Receiver base is a pointer type
    #[error("invalid receiver type {receiver} ({base} is a pointer type)")]
    #[diagnostic(code(decl::receiver_pointer))]
    ReceiverIsPointer {
        /// Printed receiver
        receiver: String,
        /// Printed base type
        base: String,
    },

    /// Receiver base has no name
    #[error("invalid receiver type {receiver} ({base} is an unnamed type)")]
    #[diagnostic(code(decl::receiver_unnamed))]
    ReceiverIsUnnamed {
        /// Printed receiver
        receiver: String,
        /// Printed base type
        base: String,
    },

    /// Receiver base is an interface
    #[error("invalid receiver type {receiver} ({base} is an interface type)")]
    #[diagnostic(code(decl::receiver_interface))]
    ReceiverIsInterface {
        /// Printed receiver
        receiver: String,
        /// Printed base type
        base: String,
    },

    /// Receiver rejected for any other reason
    #[error("invalid receiver type {receiver}")]
    #[diagnostic(code(decl::invalid_receiver))]
    InvalidReceiver {
        /// Printed receiver
        receiver: String,
    },

    /// Same method name with a different signature
    #[error("method redeclared: {base}.{name}\n\t{previous}\n\t{current}")]
    #[diagnostic(code(decl::method_redeclared))]
    MethodRedeclared {
        /// Printed base type
        base: String,
        /// Method name
        name: String,
        /// Printed earlier signature
        previous: String,
        /// Printed new signature
        current: String,
    },

    /// Method on a type from another compilation unit
    #[error("cannot define new methods on non-local type {base}")]
    #[diagnostic(code(decl::non_local_method))]
    NonLocalMethod {
        /// Printed base type
        base: String,
    },

    /// Scope marker never popped
    #[error("mark left on the stack")]
    #[diagnostic(code(decl::mark_left))]
    MarkLeftOnStack,
}

/// Inconsistent resolver state caused by the calling phases
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    /// `pop_scope` found no scope marker
    #[error("popdcl: no mark")]
    ScopeUnderflow,

    /// Automatic variable declared at top level
    #[error("automatic outside function")]
    AutomaticOutsideFunction,

    /// Function header entered with a stale function context
    #[error("funchdr: dclcontext")]
    FuncHeaderContext,

    /// Function body ended outside a function
    #[error("funcbody: dclcontext")]
    FuncBodyContext,

    /// Method added without a name
    #[error("no method symbol")]
    NoMethodSymbol,
}

/// Result of an operation that can only fail on internal inconsistency
pub type DeclResult<T> = Result<T, InternalError>;

/// A user error at a source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the error was found
    pub pos: Pos,
    /// What went wrong
    pub error: DeclError,
}

/// Diagnostics collected over one resolution
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, pos: Pos, error: DeclError) {
        self.entries.push(Diagnostic { pos, error });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// The errors alone, in report order
    pub fn errors(&self) -> impl Iterator<Item = &DeclError> {
        self.entries.iter().map(|diag| &diag.error)
    }

    /// Render as `file:line: message` lines
    pub fn render(&self, sources: &SourceMap) -> String {
        let mut out = String::new();
        for diag in &self.entries {
            out.push_str(&sources.render(diag.pos));
            out.push_str(": ");
            out.push_str(&diag.error.to_string());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_previous_declaration() {
        let mut sources = SourceMap::new();
        let file = sources.add_file("main.go");
        let mut diags = Diagnostics::default();
        diags.push(
            Pos::new(file, 4),
            DeclError::Redeclared {
                name: "x".to_string(),
                place: "in this block",
                previous: "at main.go:3".to_string(),
            },
        );
        assert_eq!(
            diags.render(&sources),
            "main.go:4: x redeclared in this block\n\tprevious declaration at main.go:3\n"
        );
    }

    #[test]
    fn errors_carry_codes() {
        use miette::Diagnostic as _;
        let code = DeclError::NoNewVariables.code().map(|code| code.to_string());
        assert_eq!(code.as_deref(), Some("decl::no_new_variables"));
    }
}
