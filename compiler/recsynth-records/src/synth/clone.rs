use crate::error::BodyError;
use crate::locator::find_copy_constructor;
use crate::plan::{BodyPlan, MethodRef, PlanExpr, PlanStmt};
use crate::synth::RecordContext;
use recsynth_diagnostics::debug_ice;

/// `return new T(this);` through the copy constructor of the record.
pub(super) fn clone_body(ctx: &RecordContext) -> Result<BodyPlan, BodyError> {
    let Some(ctor) = find_copy_constructor(&ctx.env, ctx.ty(), ctx.ty()).found else {
        debug_ice!(format!(
            "{} has no copy constructor to clone with",
            ctx.compilation().ty(ctx.ty()).name
        ));
        return Err(BodyError::inconsistent("no copy constructor to clone with"));
    };
    Ok(BodyPlan::Block(vec![PlanStmt::Return(Some(PlanExpr::New {
        constructor: MethodRef::Member(ctor),
        ty: ctx.type_ref(),
        arguments: vec![PlanExpr::This],
    }))]))
}
