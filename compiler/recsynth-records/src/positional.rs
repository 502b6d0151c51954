//! Binding of primary constructor parameters to positional members.

use crate::env::{MemberRef, MemberView, SymbolEnvironment};
use crate::error::{BadRecordMemberForPositionalParameterError, DiagnosticBag};
use crate::member::MemberCategory;
use recsynth_diagnostics::ice;
use recsynth_symbols::{FieldRef, MemberId, TypeId, TypeRef};

/// What a positional member reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PositionalBinding {
    /// A synthesized property, overriding the inherited abstract property if there is one.
    Synthesized { overrides: Option<MemberRef> },
    /// An existing instance field of the same name and type.
    Field(MemberId),
    /// An existing readable instance property of the same name and type.
    Property(MemberRef),
}

/// One primary constructor parameter turned into a member.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PositionalMember {
    pub name: String,
    pub ty: TypeRef,
    pub ordinal: u32,
    /// Present only for synthesized properties.
    pub backing_field: Option<FieldRef>,
    pub is_readonly_getter: bool,
    pub binding: PositionalBinding,
}

impl PositionalMember {
    pub fn is_synthesized(&self) -> bool {
        matches!(self.binding, PositionalBinding::Synthesized { .. })
    }
}

/// Look up the member a parameter named `name` would bind to.
///
/// Own members are preferred. Record classes also see accessible inherited members, nearest
/// ancestor first.
fn find_existing_member(env: &SymbolEnvironment, ty: TypeId, name: &str) -> Option<MemberRef> {
    let compilation = env.compilation;
    let own = compilation
        .members_named(ty, name)
        .find(|m| !m.is_constructor())
        .map(|m| MemberRef::Declared(m.id));
    if own.is_some() || !compilation.ty(ty).is_record_class() {
        return own;
    }
    compilation.ancestors(ty).find_map(|ancestor| {
        env.members_named(ancestor, name).into_iter().find(|m| {
            env.view(*m).category() != MemberCategory::Constructor && env.is_accessible(*m, ty)
        })
    })
}

/// Bind every primary constructor parameter of a record to exactly one positional member.
///
/// A parameter whose name is taken by an incompatible member is reported and gets no positional
/// member, so the result can be shorter than the parameter list.
pub fn bind_positional_members(
    env: &SymbolEnvironment,
    ty: TypeId,
    diagnostics: &mut DiagnosticBag,
) -> Vec<PositionalMember> {
    let compilation = env.compilation;
    let symbol = compilation.ty(ty);
    let Some(ctor) = &symbol.primary_constructor else {
        return Vec::new();
    };
    let is_struct = symbol.is_struct();

    let mut positional = Vec::with_capacity(ctor.parameters.len());
    for (ordinal, parameter) in ctor.parameters.iter().enumerate() {
        let ordinal = u32::try_from(ordinal)
            .unwrap_or_else(|_| ice!("parameter ordinal exceeds u32"));
        let synthesized = |overrides: Option<MemberRef>| PositionalMember {
            name: parameter.name.clone(),
            ty: parameter.ty.clone(),
            ordinal,
            backing_field: Some(FieldRef::PositionalBacking { owner: ty, ordinal }),
            is_readonly_getter: is_struct,
            binding: PositionalBinding::Synthesized { overrides },
        };

        let Some(existing) = find_existing_member(env, ty, &parameter.name) else {
            positional.push(synthesized(None));
            continue;
        };
        let view = env.view(existing);
        let same_type = view
            .ty()
            .is_some_and(|member_ty| member_ty.equals_ignoring_options(&parameter.ty));
        let inherited = view.containing_type() != ty;
        let binding = match (view.category(), existing) {
            (MemberCategory::Field, MemberRef::Declared(id)) if !view.is_static() && same_type => {
                Some(PositionalMember {
                    name: parameter.name.clone(),
                    ty: parameter.ty.clone(),
                    ordinal,
                    backing_field: None,
                    is_readonly_getter: true,
                    binding: PositionalBinding::Field(id),
                })
            }
            (MemberCategory::Property, _)
                if !view.is_static() && !view.is_indexer() && same_type =>
            {
                match view.getter() {
                    Some(_) if inherited && view.modifiers().is_abstract() => {
                        Some(synthesized(Some(existing)))
                    }
                    Some(getter) => Some(PositionalMember {
                        name: parameter.name.clone(),
                        ty: parameter.ty.clone(),
                        ordinal,
                        backing_field: None,
                        is_readonly_getter: getter.is_readonly,
                        binding: PositionalBinding::Property(existing),
                    }),
                    None => None,
                }
            }
            _ => None,
        };
        match binding {
            Some(member) => positional.push(member),
            None => {
                let span = match view {
                    MemberView::Declared(m) if !inherited => m.span,
                    _ => ctor.span,
                };
                diagnostics.push(BadRecordMemberForPositionalParameterError {
                    member: parameter.name.clone(),
                    ty: parameter.ty.display(compilation),
                    parameter: parameter.name.clone(),
                    span,
                });
            }
        }
    }
    tracing::trace!(ty = %symbol.name, count = positional.len(), "bound positional members");
    positional
}
