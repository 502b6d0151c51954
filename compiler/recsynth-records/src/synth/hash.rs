use crate::error::BodyError;
use crate::member::{MemberDescriptor, SynthesizedMemberKind};
use crate::plan::{BodyPlan, MethodRef, PlanExpr, PlanStmt};
use crate::synth::RecordContext;
use recsynth_symbols::{TypeRef, WellKnownMember, WellKnownType};

/// Multiplier of the running hash.
pub const HASH_FACTOR: i32 = -1521134295;

fn comparer_hash(ctx: &RecordContext, ty: TypeRef, value: PlanExpr) -> Result<PlanExpr, BodyError> {
    let hash = ctx.generic_well_known(WellKnownMember::EqualityComparerGetHashCode, ty.clone())?;
    Ok(PlanExpr::call(ctx.default_comparer(&ty)?, hash, vec![value]))
}

/// Combine the equality contract (or the base hash) with the hash of every instance field.
///
/// Returns `0` when there is nothing to combine, which only happens for record structs without
/// fields.
pub(super) fn get_hash_code_body(
    ctx: &RecordContext,
    descriptor: &MemberDescriptor,
) -> Result<BodyPlan, BodyError> {
    let compilation = ctx.compilation();
    let mut hash = match (ctx.shape.is_struct, ctx.shape.base_type()) {
        (true, _) => None,
        (false, None) => {
            let contract = ctx.require_sibling(SynthesizedMemberKind::EqualityContract)?;
            Some(comparer_hash(
                ctx,
                TypeRef::well_known(WellKnownType::SystemType),
                PlanExpr::property(PlanExpr::This, contract),
            )?)
        }
        (false, Some(_)) => {
            let overridden = descriptor
                .overridden
                .ok_or_else(|| BodyError::inconsistent("no base GetHashCode to chain to"))?;
            Some(PlanExpr::call(
                PlanExpr::Base,
                MethodRef::Member(overridden),
                vec![],
            ))
        }
    };

    for field in ctx.instance_fields() {
        let ty = compilation.field_type(field);
        if ty.is_unsafe() {
            return Err(BodyError::inconsistent(format!(
                "field {} cannot be hashed",
                compilation.field_name(field)
            )));
        }
        let field_hash = comparer_hash(ctx, ty, PlanExpr::field(PlanExpr::This, field))?;
        hash = Some(match hash {
            None => field_hash,
            Some(current) => PlanExpr::IntAdd(
                Box::new(PlanExpr::IntMul(
                    Box::new(current),
                    Box::new(PlanExpr::Int(HASH_FACTOR)),
                )),
                Box::new(field_hash),
            ),
        });
    }
    Ok(BodyPlan::Block(vec![PlanStmt::Return(Some(
        hash.unwrap_or(PlanExpr::Int(0)),
    ))]))
}
