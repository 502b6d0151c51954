use recsynth_macros::declare_error_type;
use recsynth_span::Span;
use miette::Diagnostic;
use thiserror::Error;

declare_error_type! {
    /// Errors raised while loading a declaration file into a [`crate::Compilation`].
    #[error("symbol error: {0}")]
    pub enum SymbolError {
        InvalidDeclaration(InvalidDeclarationError),
        InvalidTypeName(InvalidTypeNameError),
        UnknownType(UnknownTypeError),
        DuplicateType(DuplicateTypeError),
        CyclicBase(CyclicBaseError),
        InvalidBase(InvalidBaseError),
        UnknownParameter(UnknownParameterError),
    }
}

pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(symbols::invalid_declaration))]
#[error("malformed declaration file: {message}")]
pub struct InvalidDeclarationError {
    pub message: String,
    #[label = "could not be read as a declaration"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(symbols::invalid_type_name))]
#[error("'{text}' is not a valid type name")]
pub struct InvalidTypeNameError {
    pub text: String,
    #[label = "expected a type such as int, string? or (int a, R b)"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(symbols::unknown_type))]
#[error("{name} does not name a known type")]
pub struct UnknownTypeError {
    pub name: String,
    #[label = "could not find type {name}"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(symbols::duplicate_type))]
#[error("type {name} is declared more than once")]
pub struct DuplicateTypeError {
    pub name: String,
    #[label = "{name} is declared again here"]
    pub span: Span,
    #[label = "first declaration of {name}"]
    pub previous: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(symbols::cyclic_base))]
#[error("base type chain of {name} is cyclic")]
pub struct CyclicBaseError {
    pub name: String,
    #[label = "{name} eventually derives from itself"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(symbols::invalid_base))]
#[error("{name} cannot derive from {base}")]
pub struct InvalidBaseError {
    pub name: String,
    pub base: String,
    pub reason: String,
    #[label = "{reason}"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(symbols::unknown_parameter))]
#[error("{name} is not a primary constructor parameter of {type_name}")]
pub struct UnknownParameterError {
    pub name: String,
    pub type_name: String,
    #[label = "passed to the base constructor here"]
    pub span: Span,
}
