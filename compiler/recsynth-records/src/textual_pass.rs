//! Textual formatting of synthesized records.
//!
//! A Wadler-style pretty printer for the synthesized members of a record and their body plans.
//! The format is meant to be read by humans next to the RON output. It borrows C# syntax where
//! it can and makes up syntax for the rest, such as `base::` calls and explicit conversions.

use crate::env::{MemberRef, SymbolEnvironment};
use crate::member::SynthesizedMember;
use crate::plan::{BodyPlan, MethodRef, PlanExpr, PlanStmt};
use crate::record::RecordSynthesis;
use recsynth_diagnostics::ice;
use recsynth_symbols::{FieldRef, TypeRef};
use pretty::{Arena, DocAllocator, DocBuilder};

pub struct RecordTextualPass<'a> {
    arena: Arena<'a>,
    env: SymbolEnvironment<'a>,
}

pub type Document<'a> = DocBuilder<'a, Arena<'a>>;

impl<'a> RecordTextualPass<'a> {
    /// `env` must see every record whose members are referenced by the printed bodies.
    pub fn new(env: SymbolEnvironment<'a>) -> Self {
        Self {
            arena: Arena::new(),
            env,
        }
    }

    pub fn format_doc_to_string(doc: DocBuilder<'a, Arena<'a>>) -> String {
        let mut w = Vec::new();
        doc.render(100, &mut w)
            .unwrap_or_else(|_| ice!("failed to render synthesized record"));
        String::from_utf8(w).unwrap_or_else(|_| ice!("rendered record is not utf-8"))
    }

    pub fn visit_record(&'a self, record: &'a RecordSynthesis) -> DocBuilder<'a, Arena<'a>> {
        let symbol = self.env.compilation.ty(record.ty);
        let keyword = if symbol.is_struct() {
            "record struct"
        } else {
            "record"
        };
        self.arena
            .text(keyword)
            .append(self.arena.space())
            .append(self.arena.text(symbol.name.as_str()))
            .append(self.arena.space())
            .append(self.arena.text("{"))
            .append(
                self.arena
                    .hardline()
                    .append(self.arena.intersperse(
                        record.members.iter().map(|m| self.visit_member(m)),
                        self.arena.hardline().append(self.arena.hardline()),
                    ))
                    .nest(2)
                    .group(),
            )
            .append(self.arena.hardline())
            .append(self.arena.text("}"))
    }

    /// The record header and one line per synthesized member signature, without bodies.
    pub fn visit_signatures(&'a self, record: &'a RecordSynthesis) -> DocBuilder<'a, Arena<'a>> {
        let symbol = self.env.compilation.ty(record.ty);
        self.arena
            .text(symbol.name.as_str())
            .append(self.arena.text(":"))
            .append(
                self.arena
                    .hardline()
                    .append(self.arena.intersperse(
                        record.members.iter().map(|m| self.visit_signature(m)),
                        self.arena.hardline(),
                    ))
                    .nest(2),
            )
    }

    pub fn visit_signature(&'a self, member: &'a SynthesizedMember) -> DocBuilder<'a, Arena<'a>> {
        let descriptor = &member.descriptor;
        let keywords = descriptor.modifiers.keywords();
        let header = if keywords.is_empty() {
            self.arena.nil()
        } else {
            self.arena.text(keywords).append(self.arena.space())
        };
        header.append(self.arena.text(descriptor.display(self.env.compilation)))
    }

    pub fn visit_member(&'a self, member: &'a SynthesizedMember) -> DocBuilder<'a, Arena<'a>> {
        let descriptor = &member.descriptor;
        let attributes = self.arena.concat(descriptor.attributes.iter().map(|a| {
            self.arena
                .text(format!("[{}]", a.name()))
                .append(self.arena.hardline())
        }));
        attributes
            .append(self.visit_signature(member))
            .append(self.visit_body(member))
    }

    pub fn visit_body(&'a self, member: &'a SynthesizedMember) -> DocBuilder<'a, Arena<'a>> {
        match &member.body {
            BodyPlan::Abstract => self.arena.text(";"),
            BodyPlan::Poisoned => self
                .arena
                .space()
                .append(self.arena.text("{ throw null; }")),
            BodyPlan::Block(stmts) => self
                .arena
                .space()
                .append(self.visit_block(member, stmts)),
        }
    }

    fn visit_block(
        &'a self,
        member: &'a SynthesizedMember,
        stmts: &'a [PlanStmt],
    ) -> DocBuilder<'a, Arena<'a>> {
        self.arena
            .text("{")
            .append(
                self.arena
                    .hardline()
                    .append(self.arena.intersperse(
                        stmts.iter().map(|s| self.visit_stmt(member, s)),
                        self.arena.hardline(),
                    ))
                    .nest(2)
                    .group(),
            )
            .append(self.arena.hardline())
            .append(self.arena.text("}"))
    }

    pub fn visit_stmt(
        &'a self,
        member: &'a SynthesizedMember,
        stmt: &'a PlanStmt,
    ) -> DocBuilder<'a, Arena<'a>> {
        match stmt {
            PlanStmt::Expr(expr) => self.visit_expr(member, expr).append(self.arena.text(";")),
            PlanStmt::Let { local, value } => self
                .arena
                .text("let")
                .append(self.arena.space())
                .append(self.arena.text(format!("local{}", local.0)))
                .append(self.arena.text(" = "))
                .append(self.visit_expr(member, value))
                .append(self.arena.text(";")),
            PlanStmt::Return(None) => self.arena.text("return;"),
            PlanStmt::Return(Some(expr)) => self
                .arena
                .text("return")
                .append(self.arena.space())
                .append(self.visit_expr(member, expr))
                .append(self.arena.text(";")),
            PlanStmt::If { condition, then } => self
                .arena
                .text("if")
                .append(self.arena.space())
                .append(self.arena.text("("))
                .append(self.visit_expr(member, condition))
                .append(self.arena.text(")"))
                .append(self.arena.space())
                .append(self.visit_block(member, then)),
            PlanStmt::AssignField {
                receiver,
                field,
                value,
            } => self
                .visit_expr(member, receiver)
                .append(self.arena.text("."))
                .append(self.visit_field(*field))
                .append(self.arena.text(" = "))
                .append(self.visit_expr(member, value))
                .append(self.arena.text(";")),
            PlanStmt::AssignOut { parameter, value } => self
                .visit_parameter(member, *parameter)
                .append(self.arena.text(" = "))
                .append(self.visit_expr(member, value))
                .append(self.arena.text(";")),
            PlanStmt::BaseConstructorCall {
                constructor,
                arguments,
            } => {
                let owner = self.env.view(*constructor).containing_type();
                self.arena
                    .text("base")
                    .append(self.arena.text("::"))
                    .append(self.arena.text(self.env.compilation.ty(owner).name.as_str()))
                    .append(self.visit_arguments(member, arguments))
                    .append(self.arena.text(";"))
            }
        }
    }

    fn visit_parameter(&'a self, member: &'a SynthesizedMember, index: u32) -> DocBuilder<'a, Arena<'a>> {
        match member.descriptor.signature.parameters.get(index as usize) {
            Some(parameter) => self.arena.text(parameter.name.as_str()),
            None => self.arena.text(format!("arg{}", index)),
        }
    }

    fn visit_field(&'a self, field: FieldRef) -> DocBuilder<'a, Arena<'a>> {
        self.arena.text(self.env.compilation.field_name(field))
    }

    fn visit_member_ref(&'a self, member: MemberRef) -> DocBuilder<'a, Arena<'a>> {
        let view = self.env.view(member);
        let owner = &self.env.compilation.ty(view.containing_type()).name;
        self.arena.text(format!("{}::{}", owner, view.name()))
    }

    fn visit_method_ref(&'a self, method: &'a MethodRef) -> DocBuilder<'a, Arena<'a>> {
        match method {
            MethodRef::Member(member) => self.visit_member_ref(*member),
            MethodRef::WellKnown {
                member,
                type_argument: None,
            } => self.arena.text(member.qualified_name()),
            MethodRef::WellKnown {
                member,
                type_argument: Some(argument),
            } => self
                .arena
                .text(member.qualified_name())
                .append(self.arena.text("<"))
                .append(self.visit_ty(argument))
                .append(self.arena.text(">")),
        }
    }

    fn visit_ty(&'a self, ty: &'a TypeRef) -> DocBuilder<'a, Arena<'a>> {
        self.arena.text(ty.display(self.env.compilation))
    }

    fn visit_arguments(
        &'a self,
        member: &'a SynthesizedMember,
        arguments: &'a [PlanExpr],
    ) -> DocBuilder<'a, Arena<'a>> {
        self.arena
            .text("(")
            .append(self.arena.intersperse(
                arguments.iter().map(|a| self.visit_expr(member, a)),
                self.arena.text(", "),
            ))
            .append(self.arena.text(")"))
    }

    fn visit_binary(
        &'a self,
        member: &'a SynthesizedMember,
        lhs: &'a PlanExpr,
        op: &'static str,
        rhs: &'a PlanExpr,
    ) -> DocBuilder<'a, Arena<'a>> {
        self.arena
            .text("(")
            .append(self.visit_expr(member, lhs))
            .append(self.arena.line())
            .append(self.arena.text(op))
            .append(self.arena.space())
            .append(self.visit_expr(member, rhs))
            .append(self.arena.text(")"))
            .group()
    }

    pub fn visit_expr(
        &'a self,
        member: &'a SynthesizedMember,
        expr: &'a PlanExpr,
    ) -> DocBuilder<'a, Arena<'a>> {
        match expr {
            PlanExpr::This => self.arena.text("this"),
            PlanExpr::Base => self.arena.text("base"),
            PlanExpr::Parameter(index) => self.visit_parameter(member, *index),
            PlanExpr::Local(local) => self.arena.text(format!("local{}", local.0)),
            PlanExpr::Null => self.arena.text("null"),
            PlanExpr::Bool(value) => self.arena.text(value.to_string()),
            PlanExpr::Int(value) => self.arena.text(value.to_string()),
            PlanExpr::Str(value) => self.arena.text(format!("{:?}", value)),
            PlanExpr::Char(value) => self.arena.text(format!("{:?}", value)),
            PlanExpr::TypeOf(ty) => self
                .arena
                .text("typeof(")
                .append(self.visit_ty(ty))
                .append(self.arena.text(")")),
            PlanExpr::Field { receiver, field } => self
                .visit_expr(member, receiver)
                .append(self.arena.text("."))
                .append(self.visit_field(*field)),
            PlanExpr::Property { receiver, property } => self
                .visit_expr(member, receiver)
                .append(self.arena.text("."))
                .append(self.arena.text(self.env.view(*property).name())),
            PlanExpr::Call {
                receiver,
                method,
                arguments,
            } => {
                let callee = match receiver {
                    Some(receiver) => self
                        .visit_expr(member, receiver)
                        .append(self.arena.text("."))
                        .append(self.visit_method_ref(method)),
                    None => self.visit_method_ref(method),
                };
                callee.append(self.visit_arguments(member, arguments))
            }
            PlanExpr::New {
                constructor: _,
                ty,
                arguments,
            } => self
                .arena
                .text("new")
                .append(self.arena.space())
                .append(self.visit_ty(ty))
                .append(self.visit_arguments(member, arguments)),
            PlanExpr::ObjectEqual(lhs, rhs) => self.visit_binary(member, lhs, "==", rhs),
            PlanExpr::ObjectNotEqual(lhs, rhs) => self.visit_binary(member, lhs, "!=", rhs),
            PlanExpr::And(lhs, rhs) => self.visit_binary(member, lhs, "&&", rhs),
            PlanExpr::Or(lhs, rhs) => self.visit_binary(member, lhs, "||", rhs),
            PlanExpr::IntAdd(lhs, rhs) => self.visit_binary(member, lhs, "+", rhs),
            PlanExpr::IntMul(lhs, rhs) => self.visit_binary(member, lhs, "*", rhs),
            PlanExpr::Not(operand) => self
                .arena
                .text("!")
                .append(self.visit_expr(member, operand)),
            PlanExpr::As { operand, ty } => self
                .arena
                .text("(")
                .append(self.visit_expr(member, operand))
                .append(self.arena.text(" as "))
                .append(self.visit_ty(ty))
                .append(self.arena.text(")")),
            PlanExpr::Is { operand, ty } => self
                .arena
                .text("(")
                .append(self.visit_expr(member, operand))
                .append(self.arena.text(" is "))
                .append(self.visit_ty(ty))
                .append(self.arena.text(")")),
            PlanExpr::Convert { operand, ty } => self
                .arena
                .text("((")
                .append(self.visit_ty(ty))
                .append(self.arena.text(")"))
                .append(self.visit_expr(member, operand))
                .append(self.arena.text(")")),
        }
    }
}
