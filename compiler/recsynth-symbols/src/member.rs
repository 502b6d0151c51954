use crate::modifiers::DeclarationModifiers;
use crate::ty::{TypeId, TypeRef};
use recsynth_span::Span;
use serde::{Deserialize, Serialize};

/// Index handle of a member in a [`crate::Compilation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub u32);

impl MemberId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Accessibility {
    #[default]
    Private,
    ProtectedAndInternal,
    Protected,
    Internal,
    ProtectedOrInternal,
    Public,
}

impl Accessibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::ProtectedAndInternal => "private protected",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::ProtectedOrInternal => "protected internal",
            Self::Public => "public",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
}

impl RefKind {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Ref => Some("ref"),
            Self::Out => Some("out"),
            Self::In => Some("in"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSymbol {
    pub name: String,
    pub ty: TypeRef,
    pub ref_kind: RefKind,
}

impl ParameterSymbol {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            ref_kind: RefKind::None,
        }
    }

    pub fn out(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            ref_kind: RefKind::Out,
        }
    }
}

/// A property accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Accessor {
    pub accessibility: Accessibility,
    pub is_readonly: bool,
    pub is_init_only: bool,
}

/// What a member body refers to, as far as capture analysis is concerned.
///
/// The binder records every simple name a body references together with the locals it declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodySummary {
    pub references: Vec<String>,
    pub locals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Field {
        ty: TypeRef,
        is_readonly: bool,
        is_required: bool,
    },
    Property {
        ty: TypeRef,
        getter: Option<Accessor>,
        setter: Option<Accessor>,
        parameters: Vec<ParameterSymbol>,
        is_auto: bool,
        is_required: bool,
    },
    Method {
        return_type: TypeRef,
        parameters: Vec<ParameterSymbol>,
        arity: u32,
    },
    Constructor {
        parameters: Vec<ParameterSymbol>,
    },
    Operator {
        return_type: TypeRef,
        parameters: Vec<ParameterSymbol>,
    },
}

/// A member declared in source or imported from metadata.
#[derive(Debug, Clone)]
pub struct MemberSymbol {
    pub id: MemberId,
    pub name: String,
    pub containing_type: TypeId,
    pub modifiers: DeclarationModifiers,
    pub kind: MemberKind,
    pub body: Option<BodySummary>,
    pub span: Span,
}

impl MemberSymbol {
    pub fn accessibility(&self) -> Accessibility {
        self.modifiers.accessibility()
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    pub fn is_property(&self) -> bool {
        matches!(self.kind, MemberKind::Property { .. })
    }

    pub fn is_indexer(&self) -> bool {
        matches!(&self.kind, MemberKind::Property { parameters, .. } if !parameters.is_empty())
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, MemberKind::Constructor { .. })
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, MemberKind::Operator { .. })
    }

    pub fn parameters(&self) -> &[ParameterSymbol] {
        match &self.kind {
            MemberKind::Field { .. } => &[],
            MemberKind::Property { parameters, .. }
            | MemberKind::Method { parameters, .. }
            | MemberKind::Constructor { parameters }
            | MemberKind::Operator { parameters, .. } => parameters,
        }
    }

    /// The return type of a method or operator, or the type of a field or property.
    pub fn ty(&self) -> Option<&TypeRef> {
        match &self.kind {
            MemberKind::Field { ty, .. } | MemberKind::Property { ty, .. } => Some(ty),
            MemberKind::Method { return_type, .. } | MemberKind::Operator { return_type, .. } => {
                Some(return_type)
            }
            MemberKind::Constructor { .. } => None,
        }
    }

    pub fn arity(&self) -> u32 {
        match &self.kind {
            MemberKind::Method { arity, .. } => *arity,
            _ => 0,
        }
    }

    pub fn getter(&self) -> Option<&Accessor> {
        match &self.kind {
            MemberKind::Property { getter, .. } => getter.as_ref(),
            _ => None,
        }
    }

    pub fn setter(&self) -> Option<&Accessor> {
        match &self.kind {
            MemberKind::Property { setter, .. } => setter.as_ref(),
            _ => None,
        }
    }

    pub fn is_auto_property(&self) -> bool {
        matches!(self.kind, MemberKind::Property { is_auto: true, .. })
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self.kind,
            MemberKind::Field {
                is_required: true,
                ..
            } | MemberKind::Property {
                is_required: true,
                ..
            }
        )
    }

    /// Custom modifiers across the return type and every parameter.
    pub fn custom_modifier_count(&self) -> u32 {
        let returned = self.ty().map(|ty| ty.custom_modifiers).unwrap_or(0);
        returned
            + self
                .parameters()
                .iter()
                .map(|p| p.ty.custom_modifiers)
                .sum::<u32>()
    }
}
