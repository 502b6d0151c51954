use crate::error::BodyError;
use crate::plan::{BodyPlan, PlanExpr, PlanStmt};
use crate::synth::RecordContext;

/// The getter of a synthesized positional property reads its backing field.
pub(super) fn positional_property_body(
    ctx: &RecordContext,
    ordinal: u32,
) -> Result<BodyPlan, BodyError> {
    let field = ctx
        .positional
        .iter()
        .find(|p| p.ordinal == ordinal)
        .and_then(|p| p.backing_field)
        .ok_or_else(|| BodyError::inconsistent("positional property without a backing field"))?;
    Ok(BodyPlan::Block(vec![PlanStmt::Return(Some(PlanExpr::field(
        PlanExpr::This,
        field,
    )))]))
}
