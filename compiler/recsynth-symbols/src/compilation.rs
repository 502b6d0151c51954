use crate::member::{Accessibility, MemberId, MemberKind, MemberSymbol, ParameterSymbol};
use crate::ty::{SpecialType, TypeId, TypeKind, TypeRef};
use crate::well_known::WellKnownMembers;
use indexmap::IndexMap;
use once_cell::race::OnceBox;
use recsynth_diagnostics::ice;
use recsynth_span::Span;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDeclKind {
    Class,
    Struct,
    RecordClass,
    RecordStruct,
}

impl TypeDeclKind {
    pub fn is_record(&self) -> bool {
        matches!(self, Self::RecordClass | Self::RecordStruct)
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct | Self::RecordStruct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Origin {
    #[default]
    Source,
    Metadata,
}

/// Runtime and language version switches that change the synthesized shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageFeatures {
    /// The runtime accepts overrides with a more derived return type.
    pub covariant_returns: bool,
    /// A record may declare `sealed override string ToString()`.
    pub sealed_record_to_string: bool,
}

impl Default for LanguageFeatures {
    fn default() -> Self {
        Self {
            covariant_returns: true,
            sealed_record_to_string: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrimaryConstructor {
    pub parameters: Vec<ParameterSymbol>,
    /// Ordinals of the parameters forwarded to the base constructor, in argument order.
    pub base_arguments: Vec<u32>,
    pub span: Span,
}

/// A storage location of an instance of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldRef {
    /// A field declared by the user.
    Declared(MemberId),
    /// The hidden field of a user-declared auto-property.
    AutoPropertyBacking(MemberId),
    /// The field behind a synthesized positional property.
    PositionalBacking { owner: TypeId, ordinal: u32 },
    /// The field a captured primary constructor parameter is stored in.
    Captured { owner: TypeId, ordinal: u32 },
}

/// Primary constructor parameters of a non-record type that instance members capture.
///
/// Keyed by parameter ordinal, iterated in ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedParameters {
    fields: IndexMap<u32, FieldRef>,
}

impl CapturedParameters {
    pub fn new(mut fields: IndexMap<u32, FieldRef>) -> Self {
        fields.sort_keys();
        Self { fields }
    }

    pub fn get(&self, ordinal: u32) -> Option<FieldRef> {
        self.fields.get(&ordinal).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, FieldRef)> + '_ {
        self.fields.iter().map(|(ordinal, field)| (*ordinal, *field))
    }
}

pub struct TypeSymbol {
    pub id: TypeId,
    pub name: String,
    pub kind: TypeDeclKind,
    pub origin: Origin,
    pub assembly: String,
    pub accessibility: Accessibility,
    pub is_sealed: bool,
    pub is_abstract: bool,
    pub is_readonly: bool,
    /// `None` only for `System.Object`.
    pub base: Option<TypeId>,
    pub primary_constructor: Option<PrimaryConstructor>,
    pub members: Vec<MemberId>,
    /// Cheap pre-check for the clone method search. False means the type declares no `<Clone>$`.
    pub has_possible_well_known_clone_method: bool,
    pub span: Span,
    captured_parameters: OnceBox<CapturedParameters>,
}

impl TypeSymbol {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: TypeId,
        name: String,
        kind: TypeDeclKind,
        origin: Origin,
        assembly: String,
        accessibility: Accessibility,
        base: Option<TypeId>,
        span: Span,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            origin,
            assembly,
            accessibility,
            is_sealed: false,
            is_abstract: false,
            is_readonly: false,
            base,
            primary_constructor: None,
            members: Vec::new(),
            has_possible_well_known_clone_method: false,
            span,
            captured_parameters: OnceBox::new(),
        }
    }

    pub fn is_record(&self) -> bool {
        self.kind.is_record()
    }

    pub fn is_record_struct(&self) -> bool {
        self.kind == TypeDeclKind::RecordStruct
    }

    pub fn is_record_class(&self) -> bool {
        self.kind == TypeDeclKind::RecordClass
    }

    pub fn is_struct(&self) -> bool {
        self.kind.is_struct()
    }

    /// The single-assignment cell holding the captured parameter map.
    ///
    /// Filling it is the job of capture analysis. Concurrent initializers may both run, but only
    /// the first published value is ever observed.
    pub fn captured_parameters_cell(&self) -> &OnceBox<CapturedParameters> {
        &self.captured_parameters
    }
}

impl Debug for TypeSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeSymbol")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .field("base", &self.base)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

/// An immutable symbol table of one compilation.
#[derive(Debug)]
pub struct Compilation {
    pub assembly: String,
    pub features: LanguageFeatures,
    pub well_known: WellKnownMembers,
    types: Vec<TypeSymbol>,
    members: Vec<MemberSymbol>,
    types_by_name: FxHashMap<String, TypeId>,
    object: TypeId,
    value_type: TypeId,
}

impl Compilation {
    pub(crate) fn new(
        assembly: String,
        features: LanguageFeatures,
        well_known: WellKnownMembers,
        types: Vec<TypeSymbol>,
        members: Vec<MemberSymbol>,
        object: TypeId,
        value_type: TypeId,
    ) -> Self {
        let types_by_name = types.iter().map(|t| (t.name.clone(), t.id)).collect();
        Self {
            assembly,
            features,
            well_known,
            types,
            members,
            types_by_name,
            object,
            value_type,
        }
    }

    pub fn ty(&self, id: TypeId) -> &TypeSymbol {
        self.types
            .get(id.index())
            .unwrap_or_else(|| ice!(format!("type handle {:?} out of range", id)))
    }

    pub fn member(&self, id: MemberId) -> &MemberSymbol {
        self.members
            .get(id.index())
            .unwrap_or_else(|| ice!(format!("member handle {:?} out of range", id)))
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.types.iter()
    }

    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        self.types_by_name.get(name).copied()
    }

    pub fn object_type(&self) -> TypeId {
        self.object
    }

    pub fn value_type_type(&self) -> TypeId {
        self.value_type
    }

    pub fn is_object(&self, id: TypeId) -> bool {
        id == self.object
    }

    /// A type reference naming the given type. `System.Object` is spelled with its special type.
    pub fn type_ref(&self, id: TypeId) -> TypeRef {
        if self.is_object(id) {
            TypeRef::object()
        } else {
            TypeRef::named(id)
        }
    }

    /// The type a reference names, if it names a type of this compilation.
    pub fn resolve_named(&self, ty: &TypeRef) -> Option<TypeId> {
        match ty.kind {
            TypeKind::Named(id) => Some(id),
            TypeKind::Special(SpecialType::Object) => Some(self.object),
            _ => None,
        }
    }

    pub fn members_of(&self, ty: TypeId) -> impl Iterator<Item = &MemberSymbol> {
        self.ty(ty).members.iter().map(|id| self.member(*id))
    }

    pub fn members_named<'a>(
        &'a self,
        ty: TypeId,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MemberSymbol> + 'a {
        self.members_of(ty).filter(move |m| m.name == name)
    }

    pub fn instance_constructors(&self, ty: TypeId) -> impl Iterator<Item = &MemberSymbol> {
        self.members_of(ty)
            .filter(|m| m.is_constructor() && !m.is_static())
    }

    pub fn base_type(&self, ty: TypeId) -> Option<TypeId> {
        self.ty(ty).base
    }

    /// Every proper ancestor of the type, nearest first.
    pub fn ancestors(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(self.base_type(ty), move |t| self.base_type(*t))
    }

    pub fn is_derived_from(&self, ty: TypeId, ancestor: TypeId) -> bool {
        self.ancestors(ty).any(|t| t == ancestor)
    }

    pub fn is_derived_from_or_equal(&self, ty: TypeId, ancestor: TypeId) -> bool {
        ty == ancestor || self.is_derived_from(ty, ancestor)
    }

    pub fn is_value_type(&self, ty: &TypeRef) -> bool {
        match &ty.kind {
            TypeKind::Special(special) => special.is_value_type(),
            TypeKind::Named(id) => self.ty(*id).is_struct(),
            TypeKind::Tuple(_) => true,
            TypeKind::WellKnown(_) | TypeKind::Pointer(_) | TypeKind::FunctionPointer { .. } => {
                false
            }
        }
    }

    /// Whether the type or any of its ancestors declares a required member.
    pub fn has_required_members(&self, ty: TypeId) -> bool {
        std::iter::once(ty)
            .chain(self.ancestors(ty))
            .any(|t| self.members_of(t).any(|m| m.is_required()))
    }

    /// Accessibility check of a member of `containing` referenced from inside `within`.
    pub fn is_accessible(
        &self,
        accessibility: Accessibility,
        containing: TypeId,
        within: TypeId,
    ) -> bool {
        let same_assembly = self.ty(containing).assembly == self.ty(within).assembly;
        let derived = self.is_derived_from_or_equal(within, containing);
        match accessibility {
            Accessibility::Public => true,
            Accessibility::Internal => same_assembly,
            Accessibility::Protected => derived,
            Accessibility::ProtectedOrInternal => same_assembly || derived,
            Accessibility::ProtectedAndInternal => same_assembly && derived,
            Accessibility::Private => containing == within,
        }
    }

    pub fn is_member_accessible(&self, member: &MemberSymbol, within: TypeId) -> bool {
        self.is_accessible(member.accessibility(), member.containing_type, within)
    }

    pub fn field_owner(&self, field: FieldRef) -> TypeId {
        match field {
            FieldRef::Declared(id) | FieldRef::AutoPropertyBacking(id) => {
                self.member(id).containing_type
            }
            FieldRef::PositionalBacking { owner, .. } | FieldRef::Captured { owner, .. } => owner,
        }
    }

    pub fn field_type(&self, field: FieldRef) -> TypeRef {
        match field {
            FieldRef::Declared(id) | FieldRef::AutoPropertyBacking(id) => match &self.member(id).kind {
                MemberKind::Field { ty, .. } | MemberKind::Property { ty, .. } => ty.clone(),
                _ => ice!("field reference to a member that is neither field nor property"),
            },
            FieldRef::PositionalBacking { owner, ordinal } | FieldRef::Captured { owner, ordinal } => {
                self.primary_parameter(owner, ordinal).ty.clone()
            }
        }
    }

    /// Metadata name of the field, e.g. `<X>k__BackingField` for a positional property `X`.
    pub fn field_name(&self, field: FieldRef) -> String {
        match field {
            FieldRef::Declared(id) => self.member(id).name.clone(),
            FieldRef::AutoPropertyBacking(id) => {
                format!("<{}>k__BackingField", self.member(id).name)
            }
            FieldRef::PositionalBacking { owner, ordinal } => {
                format!("<{}>k__BackingField", self.primary_parameter(owner, ordinal).name)
            }
            FieldRef::Captured { owner, ordinal } => {
                format!("<{}>P", self.primary_parameter(owner, ordinal).name)
            }
        }
    }

    pub fn primary_parameter(&self, ty: TypeId, ordinal: u32) -> &ParameterSymbol {
        self.ty(ty)
            .primary_constructor
            .as_ref()
            .and_then(|ctor| ctor.parameters.get(ordinal as usize))
            .unwrap_or_else(|| {
                ice!(format!(
                    "no primary constructor parameter {} on {}",
                    ordinal,
                    self.ty(ty).name
                ))
            })
    }
}
