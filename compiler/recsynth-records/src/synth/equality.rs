//! Bodies of the equality members: `Equals(T)`, `Equals(Base)`, `Equals(object)` and the two
//! operators.

use crate::error::BodyError;
use crate::member::SynthesizedMemberKind;
use crate::plan::{BodyPlan, MethodRef, PlanExpr, PlanStmt};
use crate::synth::RecordContext;
use recsynth_symbols::{TypeRef, WellKnownMember};

fn returns(expr: PlanExpr) -> BodyPlan {
    BodyPlan::Block(vec![PlanStmt::Return(Some(expr))])
}

/// `EqualityComparer<F>.Default.Equals(this.f, other.f)` for every instance field.
fn field_comparisons(ctx: &RecordContext) -> Result<Vec<PlanExpr>, BodyError> {
    let compilation = ctx.compilation();
    let mut comparisons = Vec::new();
    for field in ctx.instance_fields() {
        let ty = compilation.field_type(field);
        if ty.is_unsafe() {
            return Err(BodyError::inconsistent(format!(
                "field {} cannot be compared",
                compilation.field_name(field)
            )));
        }
        let equals = ctx.generic_well_known(WellKnownMember::EqualityComparerEquals, ty.clone())?;
        comparisons.push(PlanExpr::call(
            ctx.default_comparer(&ty)?,
            equals,
            vec![
                PlanExpr::field(PlanExpr::This, field),
                PlanExpr::field(PlanExpr::Parameter(0), field),
            ],
        ));
    }
    Ok(comparisons)
}

/// The member-wise comparison.
///
/// Record classes first compare by reference, then either the equality contracts (root records)
/// or the base record's `Equals`. Record structs only compare fields.
pub(super) fn equals_typed_body(ctx: &RecordContext) -> Result<BodyPlan, BodyError> {
    let fields = field_comparisons(ctx)?;
    if ctx.shape.is_struct {
        return Ok(returns(
            PlanExpr::conjunction(fields).unwrap_or(PlanExpr::Bool(true)),
        ));
    }

    let compilation = ctx.compilation();
    let head = match ctx.shape.base_type() {
        None => {
            let contract = ctx.require_sibling(SynthesizedMemberKind::EqualityContract)?;
            PlanExpr::and(
                PlanExpr::object_not_equal(PlanExpr::Parameter(0), PlanExpr::Null),
                PlanExpr::call_static(
                    ctx.well_known(WellKnownMember::TypeOpEquality)?,
                    vec![
                        PlanExpr::property(PlanExpr::This, contract),
                        PlanExpr::property(PlanExpr::Parameter(0), contract),
                    ],
                ),
            )
        }
        Some(base) => {
            let overridden = ctx
                .members
                .get(SynthesizedMemberKind::BaseEquals)
                .and_then(|d| d.overridden)
                .ok_or_else(|| BodyError::inconsistent("no base Equals to chain to"))?;
            let view = ctx.env.view(overridden);
            let returns_bool = view
                .ty()
                .is_some_and(|ty| ty.equals_ignoring_options(&TypeRef::boolean()));
            if view.containing_type() != base || !returns_bool {
                return Err(BodyError::inconsistent(
                    "base Equals is not declared by the immediate base record",
                ));
            }
            PlanExpr::call(
                PlanExpr::Base,
                MethodRef::Member(overridden),
                vec![PlanExpr::convert(
                    PlanExpr::Parameter(0),
                    compilation.type_ref(base),
                )],
            )
        }
    };
    let compared = std::iter::once(head).chain(fields).reduce(PlanExpr::and);
    let compared = compared.unwrap_or(PlanExpr::Bool(true));
    Ok(returns(PlanExpr::or(
        PlanExpr::object_equal(PlanExpr::This, PlanExpr::Parameter(0)),
        compared,
    )))
}

/// `return Equals((object?)other);`
pub(super) fn base_equals_body(ctx: &RecordContext) -> Result<BodyPlan, BodyError> {
    let equals = ctx.require_sibling(SynthesizedMemberKind::EqualsObject)?;
    Ok(returns(PlanExpr::call(
        PlanExpr::This,
        MethodRef::Member(equals),
        vec![PlanExpr::convert(PlanExpr::Parameter(0), TypeRef::object())],
    )))
}

pub(super) fn equals_object_body(ctx: &RecordContext) -> Result<BodyPlan, BodyError> {
    let equals = MethodRef::Member(ctx.require_sibling(SynthesizedMemberKind::EqualsTyped)?);
    let ty = ctx.type_ref();
    let body = if ctx.shape.is_struct {
        PlanExpr::and(
            PlanExpr::Is {
                operand: Box::new(PlanExpr::Parameter(0)),
                ty: ty.clone(),
            },
            PlanExpr::call(
                PlanExpr::This,
                equals,
                vec![PlanExpr::convert(PlanExpr::Parameter(0), ty)],
            ),
        )
    } else {
        PlanExpr::call(
            PlanExpr::This,
            equals,
            vec![PlanExpr::As {
                operand: Box::new(PlanExpr::Parameter(0)),
                ty,
            }],
        )
    };
    Ok(returns(body))
}

pub(super) fn equality_operator_body(ctx: &RecordContext) -> Result<BodyPlan, BodyError> {
    let equals = MethodRef::Member(ctx.require_sibling(SynthesizedMemberKind::EqualsTyped)?);
    let call = PlanExpr::call(
        PlanExpr::Parameter(0),
        equals,
        vec![PlanExpr::Parameter(1)],
    );
    if ctx.shape.is_struct {
        return Ok(returns(call));
    }
    Ok(returns(PlanExpr::or(
        PlanExpr::object_equal(PlanExpr::Parameter(0), PlanExpr::Parameter(1)),
        PlanExpr::and(
            PlanExpr::object_not_equal(PlanExpr::Parameter(0), PlanExpr::Null),
            call,
        ),
    )))
}

/// `return !(left == right);`
pub(super) fn inequality_operator_body(ctx: &RecordContext) -> Result<BodyPlan, BodyError> {
    let equality = ctx.require_sibling(SynthesizedMemberKind::EqualityOperator)?;
    Ok(returns(PlanExpr::not(PlanExpr::call_static(
        MethodRef::Member(equality),
        vec![PlanExpr::Parameter(0), PlanExpr::Parameter(1)],
    ))))
}
