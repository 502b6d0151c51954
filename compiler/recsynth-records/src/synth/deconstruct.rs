use crate::error::BodyError;
use crate::member::MemberDescriptor;
use crate::plan::{BodyPlan, PlanExpr, PlanStmt};
use crate::synth::RecordContext;

/// Assign every `out` parameter from the positional member of the same ordinal.
///
/// A parameter list that does not line up with the positional members means a positional
/// parameter was rejected earlier.
pub(super) fn deconstruct_body(
    ctx: &RecordContext,
    descriptor: &MemberDescriptor,
) -> Result<BodyPlan, BodyError> {
    let parameters = &descriptor.signature.parameters;
    if parameters.len() != ctx.positional.len() {
        return Err(BodyError::inconsistent(
            "Deconstruct parameters do not match the positional members",
        ));
    }
    let mut block = Vec::with_capacity(parameters.len() + 1);
    for (index, (parameter, member)) in parameters.iter().zip(ctx.positional).enumerate() {
        if !parameter.ty.equals_ignoring_options(&member.ty) {
            return Err(BodyError::inconsistent(format!(
                "Deconstruct parameter {} does not match its positional member",
                parameter.name
            )));
        }
        block.push(PlanStmt::AssignOut {
            parameter: index as u32,
            value: ctx.read_positional(PlanExpr::This, member)?,
        });
    }
    block.push(PlanStmt::Return(None));
    Ok(BodyPlan::Block(block))
}
