use crate::error::BodyError;
use crate::plan::{BodyPlan, PlanExpr, PlanStmt};
use crate::synth::RecordContext;
use recsynth_symbols::WellKnownMember;

/// `return typeof(T);`
pub(super) fn equality_contract_body(ctx: &RecordContext) -> Result<BodyPlan, BodyError> {
    ctx.compilation()
        .well_known
        .member(WellKnownMember::TypeGetTypeFromHandle)?;
    Ok(BodyPlan::Block(vec![PlanStmt::Return(Some(PlanExpr::TypeOf(
        ctx.type_ref(),
    )))]))
}
