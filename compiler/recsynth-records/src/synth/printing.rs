//! `PrintMembers` and `ToString`.

use crate::env::MemberRef;
use crate::error::BodyError;
use crate::member::{MemberDescriptor, ObjectMethod, SynthesizedMemberKind};
use crate::plan::{BodyPlan, LocalId, MethodRef, PlanExpr, PlanStmt};
use crate::positional::{PositionalBinding, PositionalMember};
use crate::synth::RecordContext;
use recsynth_symbols::{
    Accessibility, Compilation, FieldRef, MemberKind, MemberSymbol, TypeId, TypeRef,
    WellKnownMember, WellKnownType,
};

/// A member `PrintMembers` prints.
#[derive(Debug, Clone, Copy)]
pub enum PrintableMember<'a> {
    /// A synthesized positional property.
    Positional(&'a PositionalMember),
    Declared(&'a MemberSymbol),
}

impl<'a> PrintableMember<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Positional(p) => &p.name,
            Self::Declared(m) => &m.name,
        }
    }

    pub fn ty(&self) -> Option<&'a TypeRef> {
        match self {
            Self::Positional(p) => Some(&p.ty),
            Self::Declared(m) => m.ty(),
        }
    }

    /// Fields never count against a readonly `PrintMembers`; properties need a readonly getter.
    pub fn has_readonly_read(&self) -> bool {
        match self {
            Self::Positional(p) => p.is_readonly_getter,
            Self::Declared(m) => m.getter().map_or(true, |getter| getter.is_readonly),
        }
    }
}

fn is_printable(member: &MemberSymbol) -> bool {
    if member.accessibility() != Accessibility::Public || member.is_static() {
        return false;
    }
    match &member.kind {
        MemberKind::Field { .. } => true,
        MemberKind::Property { getter, .. } => {
            !member.is_indexer() && !member.modifiers.is_override() && getter.is_some()
        }
        _ => false,
    }
}

/// Members printed by `PrintMembers` in print order: synthesized positional properties that do
/// not override anything, then the public instance fields and readable properties in declaration
/// order.
pub fn printable_members<'a>(
    compilation: &'a Compilation,
    ty: TypeId,
    positional: &'a [PositionalMember],
) -> Vec<PrintableMember<'a>> {
    let synthesized = positional
        .iter()
        .filter(|p| matches!(p.binding, PositionalBinding::Synthesized { overrides: None }))
        .map(PrintableMember::Positional);
    let declared = compilation
        .members_of(ty)
        .filter(|m| is_printable(m))
        .map(PrintableMember::Declared);
    synthesized.chain(declared).collect()
}

fn append(receiver: PlanExpr, method: &MethodRef, argument: PlanExpr) -> PlanStmt {
    PlanStmt::Expr(PlanExpr::call(receiver, method.clone(), vec![argument]))
}

fn read_member(ctx: &RecordContext, member: PrintableMember) -> Result<PlanExpr, BodyError> {
    if member.ty().is_some_and(TypeRef::is_unsafe) {
        return Err(BodyError::inconsistent(format!(
            "member {} cannot be printed",
            member.name()
        )));
    }
    match member {
        PrintableMember::Positional(p) => ctx.read_positional(PlanExpr::This, p),
        PrintableMember::Declared(m) if m.is_field() => {
            Ok(PlanExpr::field(PlanExpr::This, FieldRef::Declared(m.id)))
        }
        PrintableMember::Declared(m) => Ok(PlanExpr::property(
            PlanExpr::This,
            MemberRef::Declared(m.id),
        )),
    }
}

/// Print `Name = value` for every printable member into the builder parameter.
///
/// Returns whether anything was printed. A derived record without printable members of its own
/// returns the base result unchanged.
pub(super) fn print_members_body(
    ctx: &RecordContext,
    descriptor: &MemberDescriptor,
) -> Result<BodyPlan, BodyError> {
    let compilation = ctx.compilation();
    let printable = printable_members(compilation, ctx.ty(), ctx.positional);
    let builder = PlanExpr::Parameter(0);
    let append_string = ctx.well_known(WellKnownMember::StringBuilderAppendString)?;
    let mut block = Vec::new();

    if ctx.shape.is_derived() {
        let overridden = descriptor
            .overridden
            .filter(|m| {
                ctx.env
                    .view(*m)
                    .ty()
                    .is_some_and(|ty| ty.equals_ignoring_options(&TypeRef::boolean()))
            })
            .ok_or_else(|| BodyError::inconsistent("no base PrintMembers to chain to"))?;
        let base_call = PlanExpr::call(
            PlanExpr::Base,
            MethodRef::Member(overridden),
            vec![builder.clone()],
        );
        if printable.is_empty() {
            return Ok(BodyPlan::Block(vec![PlanStmt::Return(Some(base_call))]));
        }
        block.push(PlanStmt::If {
            condition: base_call,
            then: vec![append(
                builder.clone(),
                &append_string,
                PlanExpr::Str(", ".to_owned()),
            )],
        });
    } else {
        if printable.is_empty() {
            return Ok(BodyPlan::Block(vec![PlanStmt::Return(Some(
                PlanExpr::Bool(false),
            ))]));
        }
        let ensure_stack = WellKnownMember::RuntimeHelpersEnsureSufficientExecutionStack;
        if let Ok(ensure) = ctx.well_known(ensure_stack) {
            block.push(PlanStmt::Expr(PlanExpr::call_static(ensure, vec![])));
        }
    }

    let append_object = ctx.well_known(WellKnownMember::StringBuilderAppendObject)?;
    let object_to_string = ctx.object_method(ObjectMethod::ToString)?;
    for (index, member) in printable.iter().enumerate() {
        if index > 0 {
            block.push(append(
                builder.clone(),
                &append_string,
                PlanExpr::Str(", ".to_owned()),
            ));
        }
        block.push(append(
            builder.clone(),
            &append_string,
            PlanExpr::Str(format!("{} = ", member.name())),
        ));
        let value = read_member(ctx, *member)?;
        let is_value_type = member.ty().is_some_and(|ty| compilation.is_value_type(ty));
        if is_value_type {
            let text = PlanExpr::call(value, MethodRef::Member(object_to_string), vec![]);
            block.push(append(builder.clone(), &append_string, text));
        } else {
            block.push(append(
                builder.clone(),
                &append_object,
                PlanExpr::convert(value, TypeRef::object()),
            ));
        }
    }
    block.push(PlanStmt::Return(Some(PlanExpr::Bool(true))));
    Ok(BodyPlan::Block(block))
}

/// `Name { members }` through a fresh `StringBuilder` and `PrintMembers`.
pub(super) fn to_string_body(ctx: &RecordContext) -> Result<BodyPlan, BodyError> {
    let compilation = ctx.compilation();
    let ctor = ctx.well_known(WellKnownMember::StringBuilderCtor)?;
    let append_string = ctx.well_known(WellKnownMember::StringBuilderAppendString)?;
    let append_char = ctx.well_known(WellKnownMember::StringBuilderAppendChar)?;
    let to_string = ctx.well_known(WellKnownMember::StringBuilderToString)?;
    let print_members = ctx.require_sibling(SynthesizedMemberKind::PrintMembers)?;

    let local = LocalId(0);
    let builder = PlanExpr::Local(local);
    let name = compilation.ty(ctx.ty()).name.clone();
    Ok(BodyPlan::Block(vec![
        PlanStmt::Let {
            local,
            value: PlanExpr::New {
                constructor: ctor,
                ty: TypeRef::well_known(WellKnownType::StringBuilder),
                arguments: vec![],
            },
        },
        append(builder.clone(), &append_string, PlanExpr::Str(name)),
        append(builder.clone(), &append_string, PlanExpr::Str(" { ".to_owned())),
        PlanStmt::If {
            condition: PlanExpr::call(
                PlanExpr::This,
                MethodRef::Member(print_members),
                vec![builder.clone()],
            ),
            then: vec![append(builder.clone(), &append_char, PlanExpr::Char(' '))],
        },
        append(builder.clone(), &append_char, PlanExpr::Char('}')),
        PlanStmt::Return(Some(PlanExpr::call(builder, to_string, vec![]))),
    ]))
}
