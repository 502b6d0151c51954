//! Module for declaring compiler diagnostic error types.
//!
//! This module exports a macro [`declare_error_type`] that can be used to define a new error that
//! the compiler infrastructure can use as a diagnostic error.

/// Declare a new error type that can be used as a diagnostic error.
///
/// Every variant wraps a single error struct which carries its own diagnostic code and labels. The
/// generated enum forwards both `Display` and `Diagnostic` to the wrapped struct, and implements
/// `From` for each of them so `?` can lift a specific error into the family.
#[macro_export]
macro_rules! declare_error_type {
    {
        $(#[doc = $doc:expr])*
        #[error($msg:expr)]
        $vis:vis enum $type_name:ident {
            $($name:ident($ty:ty),)*
        }
    } => {
        $(#[doc = $doc])*
        #[derive(thiserror::Error, miette::Diagnostic, Debug, Clone)]
        #[error($msg)]
        $vis enum $type_name {
            $(
                #[error(transparent)]
                #[diagnostic(transparent)]
                $name(#[from] $ty),
            )*
        }
    }
}
