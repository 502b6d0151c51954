//! Predefined types and members the synthesized bodies depend on.
//!
//! A compilation normally provides all of them. Declaration files may mark any of them missing,
//! in which case the lookups fail with [`MissingMemberError`] and the caller substitutes a
//! poisoned body.

use miette::Diagnostic;
use recsynth_span::Span;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownType {
    SystemType,
    StringBuilder,
    EqualityComparer,
    RuntimeHelpers,
    CompilerGeneratedAttribute,
    SetsRequiredMembersAttribute,
}

impl WellKnownType {
    pub fn metadata_name(&self) -> &'static str {
        match self {
            Self::SystemType => "System.Type",
            Self::StringBuilder => "System.Text.StringBuilder",
            Self::EqualityComparer => "System.Collections.Generic.EqualityComparer`1",
            Self::RuntimeHelpers => "System.Runtime.CompilerServices.RuntimeHelpers",
            Self::CompilerGeneratedAttribute => {
                "System.Runtime.CompilerServices.CompilerGeneratedAttribute"
            }
            Self::SetsRequiredMembersAttribute => {
                "System.Diagnostics.CodeAnalysis.SetsRequiredMembersAttribute"
            }
        }
    }

    /// Resolve a source-level spelling of the type, if it names one.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "Type" | "System.Type" => Self::SystemType,
            "StringBuilder" | "System.Text.StringBuilder" => Self::StringBuilder,
            _ => return None,
        };
        Some(ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownMember {
    TypeGetTypeFromHandle,
    TypeOpEquality,
    EqualityComparerGetDefault,
    EqualityComparerEquals,
    EqualityComparerGetHashCode,
    StringBuilderCtor,
    StringBuilderAppendString,
    StringBuilderAppendChar,
    StringBuilderAppendObject,
    StringBuilderToString,
    RuntimeHelpersEnsureSufficientExecutionStack,
    CompilerGeneratedAttributeCtor,
    SetsRequiredMembersAttributeCtor,
}

impl WellKnownMember {
    pub fn containing_type(&self) -> WellKnownType {
        match self {
            Self::TypeGetTypeFromHandle | Self::TypeOpEquality => WellKnownType::SystemType,
            Self::EqualityComparerGetDefault
            | Self::EqualityComparerEquals
            | Self::EqualityComparerGetHashCode => WellKnownType::EqualityComparer,
            Self::StringBuilderCtor
            | Self::StringBuilderAppendString
            | Self::StringBuilderAppendChar
            | Self::StringBuilderAppendObject
            | Self::StringBuilderToString => WellKnownType::StringBuilder,
            Self::RuntimeHelpersEnsureSufficientExecutionStack => WellKnownType::RuntimeHelpers,
            Self::CompilerGeneratedAttributeCtor => WellKnownType::CompilerGeneratedAttribute,
            Self::SetsRequiredMembersAttributeCtor => WellKnownType::SetsRequiredMembersAttribute,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeGetTypeFromHandle => "GetTypeFromHandle",
            Self::TypeOpEquality => "op_Equality",
            Self::EqualityComparerGetDefault => "get_Default",
            Self::EqualityComparerEquals => "Equals",
            Self::EqualityComparerGetHashCode => "GetHashCode",
            Self::StringBuilderCtor
            | Self::CompilerGeneratedAttributeCtor
            | Self::SetsRequiredMembersAttributeCtor => ".ctor",
            Self::StringBuilderAppendString
            | Self::StringBuilderAppendChar
            | Self::StringBuilderAppendObject => "Append",
            Self::StringBuilderToString => "ToString",
            Self::RuntimeHelpersEnsureSufficientExecutionStack => "EnsureSufficientExecutionStack",
        }
    }

    /// Fully qualified name used in diagnostics, e.g. `System.Type.op_Equality`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.containing_type().metadata_name(), self.name())
    }
}

#[derive(Error, Diagnostic, Debug, Clone)]
#[diagnostic(code(symbols::missing_predefined_member))]
#[error("missing compiler required member '{member}'")]
pub struct MissingMemberError {
    pub member: String,
    #[label = "{member} is required to synthesize this member"]
    pub span: Span,
}

/// Availability table for predefined types and members.
#[derive(Debug, Default, Clone)]
pub struct WellKnownMembers {
    missing_types: FxHashSet<WellKnownType>,
    missing_members: FxHashSet<WellKnownMember>,
}

impl WellKnownMembers {
    pub fn new(
        missing_types: impl IntoIterator<Item = WellKnownType>,
        missing_members: impl IntoIterator<Item = WellKnownMember>,
    ) -> Self {
        Self {
            missing_types: missing_types.into_iter().collect(),
            missing_members: missing_members.into_iter().collect(),
        }
    }

    pub fn ty(&self, ty: WellKnownType) -> Result<WellKnownType, MissingMemberError> {
        if self.missing_types.contains(&ty) {
            return Err(MissingMemberError {
                member: ty.metadata_name().to_owned(),
                span: Span::empty(),
            });
        }
        Ok(ty)
    }

    pub fn member(&self, member: WellKnownMember) -> Result<WellKnownMember, MissingMemberError> {
        self.ty(member.containing_type())?;
        if self.missing_members.contains(&member) {
            return Err(MissingMemberError {
                member: member.qualified_name(),
                span: Span::empty(),
            });
        }
        Ok(member)
    }

    pub fn is_available(&self, member: WellKnownMember) -> bool {
        self.member(member).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use crate::well_known::{WellKnownMember, WellKnownMembers, WellKnownType};
    use recsynth_macros::{assert_err, assert_ok};

    #[test]
    fn test_missing_type_hides_its_members() {
        let table = WellKnownMembers::new([WellKnownType::StringBuilder], []);
        let err = assert_err!(table.member(WellKnownMember::StringBuilderAppendChar));
        assert_eq!(err.member, "System.Text.StringBuilder");
        assert_ok!(table.member(WellKnownMember::TypeOpEquality));
    }

    #[test]
    fn test_missing_member() {
        let table = WellKnownMembers::new([], [WellKnownMember::TypeOpEquality]);
        let err = assert_err!(table.member(WellKnownMember::TypeOpEquality));
        assert_eq!(err.member, "System.Type.op_Equality");
        assert!(table.is_available(WellKnownMember::TypeGetTypeFromHandle));
    }
}
