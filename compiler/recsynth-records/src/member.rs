//! Descriptors of synthesized members.
//!
//! A descriptor is everything about a member except its body: kind, modifiers, signature,
//! attributes and sort key. Per-kind behaviour is attached through small capability traits
//! implemented on the tagged [`SynthesizedMemberKind`] instead of a type per member.

use crate::env::MemberRef;
use crate::plan::BodyPlan;
use recsynth_span::Span;
use recsynth_symbols::{
    Accessor, Compilation, DeclarationModifiers, FieldRef, ParameterSymbol, SpecialType, TypeId,
    TypeRef,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SynthesizedMemberKind {
    PrimaryConstructor,
    PositionalProperty { ordinal: u32 },
    Deconstruct,
    CopyConstructor,
    Clone,
    EqualityContract,
    EqualsTyped,
    BaseEquals,
    EqualsObject,
    GetHashCode,
    InequalityOperator,
    EqualityOperator,
    PrintMembers,
    ToString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MemberCategory {
    Field,
    Constructor,
    Property,
    Method,
    Operator,
}

impl SynthesizedMemberKind {
    pub fn category(&self) -> MemberCategory {
        match self {
            Self::PrimaryConstructor | Self::CopyConstructor => MemberCategory::Constructor,
            Self::PositionalProperty { .. } | Self::EqualityContract => MemberCategory::Property,
            Self::EqualityOperator | Self::InequalityOperator => MemberCategory::Operator,
            _ => MemberCategory::Method,
        }
    }

    /// The `System.Object` method this member overrides, if any.
    pub fn object_override(&self) -> Option<ObjectMethod> {
        match self {
            Self::EqualsObject => Some(ObjectMethod::Equals),
            Self::GetHashCode => Some(ObjectMethod::GetHashCode),
            Self::ToString => Some(ObjectMethod::ToString),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectMethod {
    Equals,
    GetHashCode,
    ToString,
}

/// Members that must end up overriding a virtual method of `System.Object`.
pub trait OverridesObjectMethod {
    fn method_name(&self) -> &'static str;
    fn return_type(&self) -> SpecialType;
    fn parameter_types(&self) -> Vec<TypeRef>;
}

impl OverridesObjectMethod for ObjectMethod {
    fn method_name(&self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::GetHashCode => "GetHashCode",
            Self::ToString => "ToString",
        }
    }

    fn return_type(&self) -> SpecialType {
        match self {
            Self::Equals => SpecialType::Boolean,
            Self::GetHashCode => SpecialType::Int32,
            Self::ToString => SpecialType::String,
        }
    }

    fn parameter_types(&self) -> Vec<TypeRef> {
        match self {
            Self::Equals => vec![TypeRef::object()],
            Self::GetHashCode | Self::ToString => vec![],
        }
    }
}

/// The enumerated modifier sets a member kind may legally end up with.
pub trait HasStandardModifierShape {
    fn legal_modifier_sets(&self) -> &'static [DeclarationModifiers];

    fn is_legal(&self, modifiers: DeclarationModifiers) -> bool {
        self.legal_modifier_sets().contains(&modifiers)
    }
}

const PUBLIC: DeclarationModifiers = DeclarationModifiers::PUBLIC;
const PROTECTED: DeclarationModifiers = DeclarationModifiers::PROTECTED;
const PRIVATE: DeclarationModifiers = DeclarationModifiers::PRIVATE;
const VIRTUAL: DeclarationModifiers = DeclarationModifiers::VIRTUAL;
const OVERRIDE: DeclarationModifiers = DeclarationModifiers::OVERRIDE;
const ABSTRACT: DeclarationModifiers = DeclarationModifiers::ABSTRACT;
const SEALED: DeclarationModifiers = DeclarationModifiers::SEALED;
const READONLY: DeclarationModifiers = DeclarationModifiers::READONLY;
const STATIC: DeclarationModifiers = DeclarationModifiers::STATIC;

const fn union(lhs: DeclarationModifiers, rhs: DeclarationModifiers) -> DeclarationModifiers {
    lhs.union(rhs)
}

const PRIMARY_CONSTRUCTOR_SETS: &[DeclarationModifiers] = &[PUBLIC, PROTECTED];
const POSITIONAL_PROPERTY_SETS: &[DeclarationModifiers] = &[PUBLIC, union(PUBLIC, OVERRIDE)];
const DECONSTRUCT_SETS: &[DeclarationModifiers] = &[PUBLIC, union(PUBLIC, READONLY)];
const COPY_CONSTRUCTOR_SETS: &[DeclarationModifiers] = &[PROTECTED, PRIVATE];
const CLONE_SETS: &[DeclarationModifiers] = &[
    PUBLIC,
    union(PUBLIC, VIRTUAL),
    union(PUBLIC, OVERRIDE),
    union(PUBLIC, ABSTRACT),
    union(union(PUBLIC, ABSTRACT), OVERRIDE),
];
const EQUALITY_CONTRACT_SETS: &[DeclarationModifiers] = &[
    PRIVATE,
    union(PROTECTED, VIRTUAL),
    union(PROTECTED, OVERRIDE),
];
const EQUALS_TYPED_SETS: &[DeclarationModifiers] =
    &[PUBLIC, union(PUBLIC, VIRTUAL), union(PUBLIC, READONLY)];
const BASE_EQUALS_SETS: &[DeclarationModifiers] = &[union(union(PUBLIC, OVERRIDE), SEALED)];
const OBJECT_OVERRIDE_SETS: &[DeclarationModifiers] =
    &[union(PUBLIC, OVERRIDE), union(union(PUBLIC, OVERRIDE), READONLY)];
const OPERATOR_SETS: &[DeclarationModifiers] = &[union(PUBLIC, STATIC)];
const PRINT_MEMBERS_SETS: &[DeclarationModifiers] = &[
    PRIVATE,
    union(PRIVATE, READONLY),
    union(PROTECTED, VIRTUAL),
    union(PROTECTED, OVERRIDE),
];

impl HasStandardModifierShape for SynthesizedMemberKind {
    fn legal_modifier_sets(&self) -> &'static [DeclarationModifiers] {
        match self {
            Self::PrimaryConstructor => PRIMARY_CONSTRUCTOR_SETS,
            Self::PositionalProperty { .. } => POSITIONAL_PROPERTY_SETS,
            Self::Deconstruct => DECONSTRUCT_SETS,
            Self::CopyConstructor => COPY_CONSTRUCTOR_SETS,
            Self::Clone => CLONE_SETS,
            Self::EqualityContract => EQUALITY_CONTRACT_SETS,
            Self::EqualsTyped => EQUALS_TYPED_SETS,
            Self::BaseEquals => BASE_EQUALS_SETS,
            Self::EqualsObject | Self::GetHashCode | Self::ToString => OBJECT_OVERRIDE_SETS,
            Self::EqualityOperator | Self::InequalityOperator => OPERATOR_SETS,
            Self::PrintMembers => PRINT_MEMBERS_SETS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SynthesizedAttribute {
    CompilerGenerated,
    SetsRequiredMembers,
}

impl SynthesizedAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompilerGenerated => "CompilerGenerated",
            Self::SetsRequiredMembers => "SetsRequiredMembers",
        }
    }
}

/// Stable position of a synthesized member in metadata order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LexicalSortKey(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Signature {
    pub return_type: TypeRef,
    pub parameters: Vec<ParameterSymbol>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyShape {
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
    pub backing_field: Option<FieldRef>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MemberDescriptor {
    pub kind: SynthesizedMemberKind,
    pub name: String,
    pub containing_type: TypeId,
    pub modifiers: DeclarationModifiers,
    pub signature: Signature,
    pub property: Option<PropertyShape>,
    pub attributes: Vec<SynthesizedAttribute>,
    /// The member this one overrides, resolved when the descriptor was created.
    pub overridden: Option<MemberRef>,
    pub has_body: bool,
    pub sort_key: LexicalSortKey,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub span: Span,
}

impl MemberDescriptor {
    /// Symbol display in the format of compiler test output, e.g.
    /// `System.Boolean Point.Equals(Point? other)`.
    pub fn display(&self, compilation: &Compilation) -> String {
        let owner = &compilation.ty(self.containing_type).name;
        let parameters = self
            .signature
            .parameters
            .iter()
            .map(|p| {
                let ty = p.ty.display(compilation);
                match p.ref_kind.keyword() {
                    Some(keyword) => format!("{} {} {}", keyword, ty, p.name),
                    None => format!("{} {}", ty, p.name),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        match self.kind.category() {
            MemberCategory::Constructor => format!("{}..ctor({})", owner, parameters),
            MemberCategory::Field => format!(
                "{} {}.{}",
                self.signature.return_type.display(compilation),
                owner,
                self.name
            ),
            MemberCategory::Property => {
                let mut accessors = String::new();
                if let Some(property) = &self.property {
                    if property.getter.is_some() {
                        accessors.push_str(" get;");
                    }
                    if let Some(setter) = &property.setter {
                        accessors.push_str(if setter.is_init_only { " init;" } else { " set;" });
                    }
                }
                format!(
                    "{} {}.{} {{{} }}",
                    self.signature.return_type.display(compilation),
                    owner,
                    self.name,
                    accessors
                )
            }
            MemberCategory::Method | MemberCategory::Operator => format!(
                "{} {}.{}({})",
                self.signature.return_type.display(compilation),
                owner,
                self.name,
                parameters
            ),
        }
    }
}

/// A synthesized member together with its generated body.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SynthesizedMember {
    pub descriptor: MemberDescriptor,
    pub body: BodyPlan,
}

impl SynthesizedMember {
    pub fn kind(&self) -> SynthesizedMemberKind {
        self.descriptor.kind
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self.body, BodyPlan::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use crate::member::{
        HasStandardModifierShape, ObjectMethod, OverridesObjectMethod, SynthesizedMemberKind,
    };
    use recsynth_symbols::{DeclarationModifiers, SpecialType};

    #[test]
    fn test_base_equals_has_a_single_legal_shape() {
        let kind = SynthesizedMemberKind::BaseEquals;
        assert_eq!(kind.legal_modifier_sets().len(), 1);
        assert!(kind.is_legal(
            DeclarationModifiers::PUBLIC
                | DeclarationModifiers::OVERRIDE
                | DeclarationModifiers::SEALED
        ));
        assert!(!kind.is_legal(DeclarationModifiers::PUBLIC | DeclarationModifiers::OVERRIDE));
    }

    #[test]
    fn test_object_overrides() {
        let method = SynthesizedMemberKind::GetHashCode.object_override();
        assert_eq!(method, Some(ObjectMethod::GetHashCode));
        assert_eq!(ObjectMethod::GetHashCode.return_type(), SpecialType::Int32);
        assert_eq!(ObjectMethod::Equals.parameter_types().len(), 1);
        assert_eq!(SynthesizedMemberKind::EqualsTyped.object_override(), None);
    }
}
