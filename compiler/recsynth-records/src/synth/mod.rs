//! Body synthesis of record members.
//!
//! Bodies are generated after every descriptor of the record exists, so a body can reach any
//! sibling through the per-kind index of the record's [`SynthesizedMembers`]. Builders return a
//! [`BodyError`] when they cannot produce a well-formed plan. [`generate_method_body`] turns that
//! into a poisoned body uniformly.

mod clone;
mod constructor;
mod contract;
mod deconstruct;
mod equality;
mod hash;
mod printing;
mod property;

pub use hash::HASH_FACTOR;
pub use printing::{printable_members, PrintableMember};

use crate::arena::{MemberHandle, SynthesizedMembers};
use crate::env::{MemberRef, SymbolEnvironment};
use crate::error::{BodyError, DiagnosticBag, RecordDiagnostic};
use crate::explicit::ExplicitMembers;
use crate::member::{MemberDescriptor, ObjectMethod, OverridesObjectMethod, SynthesizedMemberKind};
use crate::modifiers::RecordShape;
use crate::plan::{BodyPlan, MethodRef, PlanExpr};
use crate::positional::{PositionalBinding, PositionalMember};
use recsynth_symbols::{Compilation, FieldRef, MemberKind, TypeId, TypeRef, WellKnownMember};

/// Everything a body builder may consult about the record being synthesized.
#[derive(Clone, Copy)]
pub struct RecordContext<'a> {
    /// Sees the record's own descriptors next to everything published earlier.
    pub env: SymbolEnvironment<'a>,
    pub shape: &'a RecordShape,
    pub positional: &'a [PositionalMember],
    pub members: &'a SynthesizedMembers,
    pub explicit: &'a ExplicitMembers,
}

impl<'a> RecordContext<'a> {
    pub fn compilation(&self) -> &'a Compilation {
        self.env.compilation
    }

    pub fn ty(&self) -> TypeId {
        self.shape.ty
    }

    pub fn type_ref(&self) -> TypeRef {
        self.compilation().type_ref(self.ty())
    }

    /// The member playing the role of `kind`: the synthesized one, or the declaration that
    /// replaced it.
    pub fn sibling(&self, kind: SynthesizedMemberKind) -> Option<MemberRef> {
        self.members
            .handle(kind)
            .map(MemberRef::Synthesized)
            .or_else(|| self.explicit.replacement(kind).map(MemberRef::Declared))
    }

    pub fn require_sibling(&self, kind: SynthesizedMemberKind) -> Result<MemberRef, BodyError> {
        self.sibling(kind)
            .ok_or_else(|| BodyError::inconsistent(format!("{:?} is missing", kind)))
    }

    pub fn well_known(&self, member: WellKnownMember) -> Result<MethodRef, BodyError> {
        Ok(MethodRef::well_known(self.compilation().well_known.member(member)?))
    }

    pub fn generic_well_known(
        &self,
        member: WellKnownMember,
        type_argument: TypeRef,
    ) -> Result<MethodRef, BodyError> {
        Ok(MethodRef::generic(
            self.compilation().well_known.member(member)?,
            type_argument,
        ))
    }

    /// The virtual method of `System.Object`.
    pub fn object_method(&self, method: ObjectMethod) -> Result<MemberRef, BodyError> {
        let compilation = self.compilation();
        let parameters = method.parameter_types();
        compilation
            .members_named(compilation.object_type(), method.method_name())
            .find(|m| {
                m.parameters().len() == parameters.len()
                    && m.parameters()
                        .iter()
                        .zip(&parameters)
                        .all(|(p, ty)| p.ty.equals_ignoring_options(ty))
            })
            .map(|m| MemberRef::Declared(m.id))
            .ok_or_else(|| {
                BodyError::inconsistent(format!("System.Object.{} is missing", method.method_name()))
            })
    }

    /// Instance fields of the record itself: positional backing fields in ordinal order, then
    /// declared fields and auto-property backing fields in declaration order.
    pub fn instance_fields(&self) -> Vec<FieldRef> {
        let compilation = self.compilation();
        let positional = self.positional.iter().filter_map(|p| p.backing_field);
        let declared = compilation.members_of(self.ty()).filter_map(|m| {
            if m.is_static() {
                return None;
            }
            match &m.kind {
                MemberKind::Field { .. } => Some(FieldRef::Declared(m.id)),
                MemberKind::Property { is_auto: true, .. } if !m.is_indexer() => {
                    Some(FieldRef::AutoPropertyBacking(m.id))
                }
                _ => None,
            }
        });
        positional.chain(declared).collect()
    }

    /// An expression reading the positional member from `receiver`.
    pub fn read_positional(
        &self,
        receiver: PlanExpr,
        member: &PositionalMember,
    ) -> Result<PlanExpr, BodyError> {
        match member.binding {
            PositionalBinding::Field(id) => Ok(PlanExpr::field(receiver, FieldRef::Declared(id))),
            PositionalBinding::Property(property) => Ok(PlanExpr::property(receiver, property)),
            PositionalBinding::Synthesized { .. } => {
                let property = self.require_sibling(SynthesizedMemberKind::PositionalProperty {
                    ordinal: member.ordinal,
                })?;
                Ok(PlanExpr::property(receiver, property))
            }
        }
    }

    /// `EqualityComparer<T>.Default`
    pub fn default_comparer(&self, ty: &TypeRef) -> Result<PlanExpr, BodyError> {
        let getter = self.generic_well_known(WellKnownMember::EqualityComparerGetDefault, ty.clone())?;
        Ok(PlanExpr::call_static(getter, vec![]))
    }
}

/// Build the body of one synthesized member.
pub fn build_body(
    ctx: &RecordContext,
    descriptor: &MemberDescriptor,
    diagnostics: &mut DiagnosticBag,
) -> Result<BodyPlan, BodyError> {
    if !descriptor.has_body {
        return Ok(BodyPlan::Abstract);
    }
    match descriptor.kind {
        SynthesizedMemberKind::PrimaryConstructor => constructor::primary_constructor_body(ctx),
        SynthesizedMemberKind::PositionalProperty { ordinal } => {
            property::positional_property_body(ctx, ordinal)
        }
        SynthesizedMemberKind::Deconstruct => deconstruct::deconstruct_body(ctx, descriptor),
        SynthesizedMemberKind::CopyConstructor => {
            constructor::copy_constructor_body(ctx, descriptor, diagnostics)
        }
        SynthesizedMemberKind::Clone => clone::clone_body(ctx),
        SynthesizedMemberKind::EqualityContract => contract::equality_contract_body(ctx),
        SynthesizedMemberKind::EqualsTyped => equality::equals_typed_body(ctx),
        SynthesizedMemberKind::BaseEquals => equality::base_equals_body(ctx),
        SynthesizedMemberKind::EqualsObject => equality::equals_object_body(ctx),
        SynthesizedMemberKind::GetHashCode => hash::get_hash_code_body(ctx, descriptor),
        SynthesizedMemberKind::EqualityOperator => equality::equality_operator_body(ctx),
        SynthesizedMemberKind::InequalityOperator => equality::inequality_operator_body(ctx),
        SynthesizedMemberKind::PrintMembers => printing::print_members_body(ctx, descriptor),
        SynthesizedMemberKind::ToString => printing::to_string_body(ctx),
    }
}

/// Generate the body of a synthesized member, substituting a poisoned body on failure.
///
/// A missing predefined member is reported; an inconsistent state was already reported when it
/// arose and is only logged.
pub fn generate_method_body(
    ctx: &RecordContext,
    handle: MemberHandle,
    diagnostics: &mut DiagnosticBag,
) -> BodyPlan {
    let descriptor = ctx.members.descriptor(handle);
    match build_body(ctx, descriptor, diagnostics) {
        Ok(plan) => plan,
        Err(BodyError::MissingMember(mut err)) => {
            tracing::debug!(member = %descriptor.name, missing = %err.member, "poisoned body");
            err.span = descriptor.span;
            diagnostics.push(RecordDiagnostic::MissingPredefinedMember(err));
            BodyPlan::Poisoned
        }
        Err(BodyError::Inconsistent(err)) => {
            tracing::debug!(member = %descriptor.name, reason = %err.reason, "poisoned body");
            BodyPlan::Poisoned
        }
    }
}
