use miette::Diagnostic;
use recsynth_macros::declare_error_type;
use recsynth_span::Span;
use thiserror::Error;

declare_error_type! {
    #[error("evaluation error: {0}")]
    pub enum EvalError {
        PoisonedBody(PoisonedBodyError),
        MissingBody(MissingBodyError),
        NullReference(NullReferenceError),
        InvalidCast(InvalidCastError),
        ArgumentCount(ArgumentCountError),
        StackOverflow(StackOverflowError),
        Unsupported(UnsupportedError),
    }
}

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(eval::poisoned_body))]
#[error("{member} threw because its body could not be synthesized")]
pub struct PoisonedBodyError {
    pub member: String,
    #[label = "body of {member} is poisoned"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(eval::missing_body))]
#[error("{member} has no body that can be evaluated")]
pub struct MissingBodyError {
    pub member: String,
    #[label = "declared here"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(eval::null_reference))]
#[error("{member} was invoked on a null reference")]
pub struct NullReferenceError {
    pub member: String,
    #[label = "instance member"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(eval::invalid_cast))]
#[error("cannot convert a value of type {from} to {to}")]
pub struct InvalidCastError {
    pub from: String,
    pub to: String,
    #[label = "conversion to {to}"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(eval::argument_count))]
#[error("{member} takes {expected} arguments but {actual} were supplied")]
pub struct ArgumentCountError {
    pub member: String,
    pub expected: usize,
    pub actual: usize,
    #[label = "{member} is declared here"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(eval::stack_overflow))]
#[error("insufficient execution stack after {depth} nested calls")]
pub struct StackOverflowError {
    pub depth: u32,
    #[label = "call nested too deeply"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(eval::unsupported))]
#[error("cannot evaluate {what}")]
pub struct UnsupportedError {
    pub what: String,
    #[label = "not supported by the evaluator"]
    pub span: Span,
}
