use crate::error::{BodyError, DiagnosticBag, NoCopyConstructorInBaseTypeError};
use crate::locator::find_copy_constructor;
use crate::member::MemberDescriptor;
use crate::plan::{BodyPlan, PlanExpr, PlanStmt};
use crate::synth::RecordContext;
use recsynth_symbols::TypeRef;

/// Base constructor call, then the synthesized positional backing fields from their parameters.
pub(super) fn primary_constructor_body(ctx: &RecordContext) -> Result<BodyPlan, BodyError> {
    let compilation = ctx.compilation();
    let ctor = compilation
        .ty(ctx.ty())
        .primary_constructor
        .as_ref()
        .ok_or_else(|| BodyError::inconsistent("record has no primary constructor"))?;

    let mut block = Vec::new();
    if !ctx.shape.is_struct {
        let base = compilation
            .base_type(ctx.ty())
            .ok_or_else(|| BodyError::inconsistent("record class without a base type"))?;
        let argument_types = ctor
            .base_arguments
            .iter()
            .map(|ordinal| {
                ctor.parameters
                    .get(*ordinal as usize)
                    .map(|p| p.ty.clone())
                    .ok_or_else(|| BodyError::inconsistent("base argument out of range"))
            })
            .collect::<Result<Vec<TypeRef>, _>>()?;
        let base_ctor = ctx
            .env
            .instance_constructors(base)
            .into_iter()
            .find(|c| {
                ctx.env.view(*c).has_parameter_types(&argument_types)
                    && ctx.env.is_accessible(*c, ctx.ty())
            })
            .ok_or_else(|| {
                BodyError::inconsistent("no base constructor matches the base initializer")
            })?;
        block.push(PlanStmt::BaseConstructorCall {
            constructor: base_ctor,
            arguments: ctor
                .base_arguments
                .iter()
                .map(|ordinal| PlanExpr::Parameter(*ordinal))
                .collect(),
        });
    }

    for member in ctx.positional {
        if let Some(field) = member.backing_field {
            block.push(PlanStmt::AssignField {
                receiver: PlanExpr::This,
                field,
                value: PlanExpr::Parameter(member.ordinal),
            });
        }
    }
    block.push(PlanStmt::Return(None));
    Ok(BodyPlan::Block(block))
}

/// Base copy constructor call, then every instance field from `original`.
pub(super) fn copy_constructor_body(
    ctx: &RecordContext,
    descriptor: &MemberDescriptor,
    diagnostics: &mut DiagnosticBag,
) -> Result<BodyPlan, BodyError> {
    let compilation = ctx.compilation();
    let mut block = Vec::new();
    match ctx.shape.base_type() {
        Some(base) => {
            let reference = find_copy_constructor(&ctx.env, base, ctx.ty());
            let Some(base_ctor) = reference.found else {
                diagnostics.push(NoCopyConstructorInBaseTypeError {
                    base: compilation.ty(base).name.clone(),
                    span: descriptor.span,
                });
                return Err(BodyError::inconsistent("base type has no usable copy constructor"));
            };
            block.push(PlanStmt::BaseConstructorCall {
                constructor: base_ctor,
                arguments: vec![PlanExpr::Parameter(0)],
            });
        }
        None => {
            let object = compilation.object_type();
            let object_ctor = ctx
                .env
                .instance_constructors(object)
                .into_iter()
                .find(|c| ctx.env.view(*c).parameters().is_empty())
                .ok_or_else(|| BodyError::inconsistent("System.Object has no constructor"))?;
            block.push(PlanStmt::BaseConstructorCall {
                constructor: object_ctor,
                arguments: vec![],
            });
        }
    }

    for field in ctx.instance_fields() {
        block.push(PlanStmt::AssignField {
            receiver: PlanExpr::This,
            field,
            value: PlanExpr::field(PlanExpr::Parameter(0), field),
        });
    }
    block.push(PlanStmt::Return(None));
    Ok(BodyPlan::Block(block))
}
