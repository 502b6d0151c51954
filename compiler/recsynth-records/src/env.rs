//! Symbol lookups over declared members and synthesized members alike.
//!
//! The synthesis of a record sees three sources of members: the declared members of every type in
//! the compilation, the published synthesis results of records in earlier layers (its ancestors),
//! and, while bodies are generated, the descriptors of its own synthesized members.

use crate::arena::{MemberHandle, SynthesizedMembers};
use crate::member::{MemberCategory, MemberDescriptor};
use crate::record::RecordSynthesis;
use recsynth_diagnostics::ice;
use recsynth_span::Span;
use recsynth_symbols::{
    Accessibility, Accessor, Compilation, DeclarationModifiers, MemberId, MemberKind,
    MemberSymbol, ParameterSymbol, TypeId, TypeRef,
};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MemberRef {
    Declared(MemberId),
    Synthesized(MemberHandle),
}

/// A borrowed view of either kind of member.
#[derive(Debug, Clone, Copy)]
pub enum MemberView<'a> {
    Declared(&'a MemberSymbol),
    Synthesized(&'a MemberDescriptor),
}

impl<'a> MemberView<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Declared(m) => &m.name,
            Self::Synthesized(d) => &d.name,
        }
    }

    pub fn containing_type(&self) -> TypeId {
        match self {
            Self::Declared(m) => m.containing_type,
            Self::Synthesized(d) => d.containing_type,
        }
    }

    pub fn modifiers(&self) -> DeclarationModifiers {
        match self {
            Self::Declared(m) => m.modifiers,
            Self::Synthesized(d) => d.modifiers,
        }
    }

    pub fn accessibility(&self) -> Accessibility {
        self.modifiers().accessibility()
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Declared(m) => m.span,
            Self::Synthesized(d) => d.span,
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers().is_static()
    }

    pub fn category(&self) -> MemberCategory {
        match self {
            Self::Declared(m) => match m.kind {
                MemberKind::Field { .. } => MemberCategory::Field,
                MemberKind::Property { .. } => MemberCategory::Property,
                MemberKind::Method { .. } => MemberCategory::Method,
                MemberKind::Constructor { .. } => MemberCategory::Constructor,
                MemberKind::Operator { .. } => MemberCategory::Operator,
            },
            Self::Synthesized(d) => d.kind.category(),
        }
    }

    pub fn parameters(&self) -> &'a [ParameterSymbol] {
        match self {
            Self::Declared(m) => m.parameters(),
            Self::Synthesized(d) => &d.signature.parameters,
        }
    }

    /// Return type of a method, or the type of a field or property.
    pub fn ty(&self) -> Option<&'a TypeRef> {
        match self {
            Self::Declared(m) => m.ty(),
            Self::Synthesized(d) => match d.kind.category() {
                MemberCategory::Constructor => None,
                _ => Some(&d.signature.return_type),
            },
        }
    }

    pub fn getter(&self) -> Option<&'a Accessor> {
        match self {
            Self::Declared(m) => m.getter(),
            Self::Synthesized(d) => d.property.as_ref().and_then(|p| p.getter.as_ref()),
        }
    }

    pub fn is_indexer(&self) -> bool {
        match self {
            Self::Declared(m) => m.is_indexer(),
            Self::Synthesized(_) => false,
        }
    }

    pub fn arity(&self) -> u32 {
        match self {
            Self::Declared(m) => m.arity(),
            Self::Synthesized(_) => 0,
        }
    }

    pub fn custom_modifier_count(&self) -> u32 {
        match self {
            Self::Declared(m) => m.custom_modifier_count(),
            Self::Synthesized(d) => {
                let returned = match d.kind.category() {
                    MemberCategory::Constructor => 0,
                    _ => d.signature.return_type.custom_modifiers,
                };
                returned
                    + d.signature
                        .parameters
                        .iter()
                        .map(|p| p.ty.custom_modifiers)
                        .sum::<u32>()
            }
        }
    }

    /// Whether the parameter types match, ignoring nullability, custom modifiers and tuple names.
    pub fn has_parameter_types(&self, parameters: &[TypeRef]) -> bool {
        let own = self.parameters();
        own.len() == parameters.len()
            && own
                .iter()
                .zip(parameters)
                .all(|(p, ty)| p.ty.equals_ignoring_options(ty))
    }
}

/// Synthesis results of the records processed in earlier layers.
#[derive(Debug, Default)]
pub struct PublishedRecords {
    records: FxHashMap<TypeId, RecordSynthesis>,
}

impl PublishedRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ty: TypeId) -> Option<&RecordSynthesis> {
        self.records.get(&ty)
    }

    pub fn publish(&mut self, record: RecordSynthesis) {
        if self.records.insert(record.ty, record).is_some() {
            ice!("record published twice");
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> FxHashMap<TypeId, RecordSynthesis> {
        self.records
    }
}

#[derive(Clone, Copy)]
pub struct SymbolEnvironment<'a> {
    pub compilation: &'a Compilation,
    published: &'a PublishedRecords,
    local: Option<&'a SynthesizedMembers>,
}

impl<'a> SymbolEnvironment<'a> {
    pub fn new(compilation: &'a Compilation, published: &'a PublishedRecords) -> Self {
        Self {
            compilation,
            published,
            local: None,
        }
    }

    /// An environment that additionally sees the record's own synthesized descriptors.
    pub fn with_local<'b>(&'b self, members: &'b SynthesizedMembers) -> SymbolEnvironment<'b> {
        SymbolEnvironment {
            compilation: self.compilation,
            published: self.published,
            local: Some(members),
        }
    }

    pub fn published(&self, ty: TypeId) -> Option<&'a RecordSynthesis> {
        self.published.get(ty)
    }

    fn synthesized_descriptors(&self, ty: TypeId) -> Vec<&'a MemberDescriptor> {
        if let Some(local) = self.local.filter(|l| l.owner() == ty) {
            return local.descriptors().iter().collect();
        }
        match self.published.get(ty) {
            Some(record) => record.members.iter().map(|m| &m.descriptor).collect(),
            None => Vec::new(),
        }
    }

    pub fn view(&self, member: MemberRef) -> MemberView<'a> {
        match member {
            MemberRef::Declared(id) => MemberView::Declared(self.compilation.member(id)),
            MemberRef::Synthesized(handle) => {
                if let Some(local) = self.local.filter(|l| l.owner() == handle.owner) {
                    return MemberView::Synthesized(local.descriptor(handle));
                }
                let record = self
                    .published
                    .get(handle.owner)
                    .unwrap_or_else(|| ice!("synthesized member of an unpublished record"));
                MemberView::Synthesized(&record.member(handle).descriptor)
            }
        }
    }

    /// Declared members first, then synthesized members in metadata order.
    pub fn members_of(&self, ty: TypeId) -> Vec<MemberRef> {
        let declared = self
            .compilation
            .ty(ty)
            .members
            .iter()
            .map(|id| MemberRef::Declared(*id));
        let synthesized = self
            .synthesized_descriptors(ty)
            .into_iter()
            .map(|d| {
                MemberRef::Synthesized(MemberHandle {
                    owner: ty,
                    index: d.sort_key.0,
                })
            });
        declared.chain(synthesized).collect()
    }

    pub fn members_named(&self, ty: TypeId, name: &str) -> Vec<MemberRef> {
        self.members_of(ty)
            .into_iter()
            .filter(|m| self.view(*m).name() == name)
            .collect()
    }

    pub fn instance_constructors(&self, ty: TypeId) -> Vec<MemberRef> {
        self.members_of(ty)
            .into_iter()
            .filter(|m| {
                let view = self.view(*m);
                view.category() == MemberCategory::Constructor && !view.is_static()
            })
            .collect()
    }

    pub fn is_accessible(&self, member: MemberRef, within: TypeId) -> bool {
        let view = self.view(member);
        self.compilation
            .is_accessible(view.accessibility(), view.containing_type(), within)
    }

    /// Search `start` and its ancestors for the member an override with this signature binds to.
    ///
    /// The nearest instance member with a matching name, category and parameter list is returned
    /// whether or not it can actually be overridden; callers check that separately.
    pub fn find_override_target(
        &self,
        start: TypeId,
        name: &str,
        category: MemberCategory,
        parameters: &[TypeRef],
    ) -> Option<MemberRef> {
        std::iter::once(start)
            .chain(self.compilation.ancestors(start))
            .find_map(|ty| {
                self.members_named(ty, name).into_iter().find(|m| {
                    let view = self.view(*m);
                    view.category() == category
                        && !view.is_static()
                        && !view.is_indexer()
                        && (category == MemberCategory::Property
                            || view.has_parameter_types(parameters))
                })
            })
    }

    /// The member an `override` member overrides.
    pub fn overridden_member(&self, member: MemberRef) -> Option<MemberRef> {
        let view = self.view(member);
        if !view.modifiers().is_override() {
            return None;
        }
        match view {
            MemberView::Synthesized(d) => d.overridden,
            MemberView::Declared(m) => {
                let base = self.compilation.base_type(m.containing_type)?;
                let parameters = m.parameters().iter().map(|p| p.ty.clone()).collect::<Vec<_>>();
                self.find_override_target(base, &m.name, view.category(), &parameters)
            }
        }
    }

    /// Follow the override chain to the member that introduced the slot.
    pub fn least_overridden(&self, member: MemberRef) -> MemberRef {
        let mut current = member;
        let mut steps = 0;
        while let Some(next) = self.overridden_member(current) {
            steps += 1;
            if next == current || steps > 1024 {
                ice!("override chain does not terminate");
            }
            current = next;
        }
        current
    }
}
