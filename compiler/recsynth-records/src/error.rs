//! Diagnostics reported while synthesizing record members.
//!
//! User-visible problems are collected in a [`DiagnosticBag`] and never abort synthesis. Missing
//! predefined members travel as [`BodyError`] out of the body builders and are turned into a
//! diagnostic plus a poisoned body by the caller. The only hard failure is cancellation.

use miette::{Diagnostic, Severity};
use recsynth_macros::declare_error_type;
use recsynth_span::Span;
use recsynth_symbols::{CancelledError, MissingMemberError};
use thiserror::Error;

declare_error_type! {
    #[error("record synthesis error: {0}")]
    pub enum RecordDiagnostic {
        DoesNotOverrideBaseMethod(DoesNotOverrideBaseMethodError),
        DoesNotOverrideBaseEqualityContract(DoesNotOverrideBaseEqualityContractError),
        DoesNotOverrideMethodFromObject(DoesNotOverrideMethodFromObjectError),
        BadFieldTypeInRecord(BadFieldTypeInRecordError),
        BadRecordMemberForPositionalParameter(BadRecordMemberForPositionalParameterError),
        NoCopyConstructorInBaseType(NoCopyConstructorInBaseTypeError),
        CopyConstructorWrongAccessibility(CopyConstructorWrongAccessibilityError),
        InheritingFromRecordWithSealedToString(InheritingFromRecordWithSealedToStringError),
        SealedToStringNotAvailable(SealedToStringNotAvailableError),
        NonPublicApiInRecord(NonPublicApiInRecordError),
        NonProtectedApiInRecord(NonProtectedApiInRecordError),
        NonPrivateApiInRecord(NonPrivateApiInRecordError),
        NotOverridableApiInRecord(NotOverridableApiInRecordError),
        SignatureMismatchInRecord(SignatureMismatchInRecordError),
        StaticApiInRecord(StaticApiInRecordError),
        EqualityContractRequiresGetter(EqualityContractRequiresGetterError),
        DuplicateRecordMember(DuplicateRecordMemberError),
        CloneDisallowedInRecord(CloneDisallowedInRecordError),
        RecordEqualsWithoutGetHashCode(RecordEqualsWithoutGetHashCodeWarning),
        MissingPredefinedMember(MissingMemberError),
    }
}

impl RecordDiagnostic {
    pub fn is_error(&self) -> bool {
        !matches!(self.severity(), Some(Severity::Warning) | Some(Severity::Advice))
    }
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::does_not_override_base_method))]
#[error("'{member}' does not override expected method from '{base}'")]
pub struct DoesNotOverrideBaseMethodError {
    pub member: String,
    pub base: String,
    #[label = "must override a member of {base}"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::does_not_override_base_equality_contract))]
#[error("'{member}' does not override expected property from '{base}'")]
pub struct DoesNotOverrideBaseEqualityContractError {
    pub member: String,
    pub base: String,
    #[label = "must override EqualityContract of {base}"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::does_not_override_method_from_object))]
#[error("'{member}' does not override expected method from 'object'")]
pub struct DoesNotOverrideMethodFromObjectError {
    pub member: String,
    #[label = "the override chain does not reach System.Object"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::bad_field_type_in_record))]
#[error("the type '{ty}' may not be used for a field of a record")]
pub struct BadFieldTypeInRecordError {
    pub ty: String,
    pub field: String,
    #[label = "{field} cannot take part in generated equality"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::bad_record_member_for_positional_parameter))]
#[error("record member '{member}' must be a readable instance property or field of type '{ty}' to match positional parameter '{parameter}'")]
pub struct BadRecordMemberForPositionalParameterError {
    pub member: String,
    pub ty: String,
    pub parameter: String,
    #[label = "conflicts with positional parameter {parameter}"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::no_copy_constructor_in_base_type))]
#[error("no accessible copy constructor found in base type '{base}'")]
pub struct NoCopyConstructorInBaseTypeError {
    pub base: String,
    #[label = "{base} must declare exactly one accessible copy constructor"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::copy_constructor_wrong_accessibility))]
#[error("a copy constructor in a record must be public or protected because the record is not sealed")]
pub struct CopyConstructorWrongAccessibilityError {
    #[label = "declared with insufficient accessibility"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::inheriting_from_record_with_sealed_to_string))]
#[error("inheriting from a record with a sealed 'Object.ToString' is not supported")]
pub struct InheritingFromRecordWithSealedToStringError {
    pub base: String,
    #[label = "{base} seals ToString"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::sealed_to_string_not_available))]
#[error("a sealed ToString in a record is not available with the configured language features")]
pub struct SealedToStringNotAvailableError {
    #[label = "remove the sealed modifier"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::non_public_api_in_record))]
#[error("'{member}' must allow overriding because the containing record is not sealed, and be public")]
pub struct NonPublicApiInRecordError {
    pub member: String,
    #[label = "{member} must be public"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::non_protected_api_in_record))]
#[error("'{member}' must be protected because the containing record is not sealed")]
pub struct NonProtectedApiInRecordError {
    pub member: String,
    #[label = "{member} must be protected"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::non_private_api_in_record))]
#[error("'{member}' must be private")]
pub struct NonPrivateApiInRecordError {
    pub member: String,
    #[label = "{member} must be private"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::not_overridable_api_in_record))]
#[error("'{member}' must allow overriding because the containing record is not sealed")]
pub struct NotOverridableApiInRecordError {
    pub member: String,
    #[label = "declare {member} virtual or override"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::signature_mismatch_in_record))]
#[error("'{member}' must have a return type of '{expected}'")]
pub struct SignatureMismatchInRecordError {
    pub member: String,
    pub expected: String,
    #[label = "expected {expected}"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::static_api_in_record))]
#[error("'{member}' may not be static")]
pub struct StaticApiInRecordError {
    pub member: String,
    #[label = "remove the static modifier"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::equality_contract_requires_getter))]
#[error("record equality contract property '{member}' must have a get accessor")]
pub struct EqualityContractRequiresGetterError {
    pub member: String,
    #[label = "add a get accessor"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::duplicate_record_member))]
#[error("member '{member}' is always synthesized for '{record}' and may not be declared")]
pub struct DuplicateRecordMemberError {
    pub member: String,
    pub record: String,
    #[label = "conflicts with the synthesized {member}"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::clone_disallowed_in_record))]
#[error("members named 'Clone' are disallowed in records")]
pub struct CloneDisallowedInRecordError {
    #[label = "rename this member"]
    pub span: Span,
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::record_equals_without_get_hash_code), severity(Warning))]
#[error("'{member}' defines 'Equals' but not 'GetHashCode'")]
pub struct RecordEqualsWithoutGetHashCodeWarning {
    pub member: String,
    #[label = "GetHashCode is still synthesized from the fields"]
    pub span: Span,
}

declare_error_type! {
    /// Why a body builder could not produce a well-formed plan.
    #[error("body construction failed: {0}")]
    pub enum BodyError {
        MissingMember(MissingMemberError),
        Inconsistent(InconsistentBodyError),
    }
}

/// An earlier error left the member in a state its body cannot be built from.
#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(records::inconsistent_body))]
#[error("{reason}")]
pub struct InconsistentBodyError {
    pub reason: String,
}

impl BodyError {
    pub fn inconsistent(reason: impl Into<String>) -> Self {
        Self::Inconsistent(InconsistentBodyError {
            reason: reason.into(),
        })
    }
}

declare_error_type! {
    #[error("synthesis aborted: {0}")]
    pub enum SynthesisError {
        Cancelled(CancelledError),
    }
}

/// Ordered collection of the diagnostics of one record.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<RecordDiagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: impl Into<RecordDiagnostic>) {
        let diagnostic = diagnostic.into();
        tracing::debug!(code = ?diagnostic.code().map(|c| c.to_string()), "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(RecordDiagnostic::is_error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordDiagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<RecordDiagnostic> {
        self.diagnostics
    }
}
