//! Interpreter for body plans.
//!
//! Plans are executed directly against a [`Heap`]. Instance calls through any receiver other than
//! `base` dispatch virtually on the runtime type of the receiver, walking the override chains of
//! declared and synthesized members alike. Members of `System.Object` and `System.ValueType` and
//! the predefined library members the plans call are implemented natively in [`crate::builtins`].

use crate::error::{
    ArgumentCountError, EvalError, EvalResult, InvalidCastError, MissingBodyError,
    NullReferenceError, PoisonedBodyError, StackOverflowError, UnsupportedError,
};
use crate::heap::{Heap, HeapObject, Value};
use recsynth_diagnostics::ice;
use recsynth_records::arena::MemberHandle;
use recsynth_records::member::SynthesizedMemberKind;
use recsynth_records::plan::{BodyPlan, MethodRef, PlanExpr, PlanStmt};
use recsynth_records::{MemberRef, PublishedRecords, SymbolEnvironment};
use recsynth_span::Span;
use recsynth_symbols::{Compilation, FieldRef, SpecialType, TypeId, TypeRef, WellKnownMember};
use std::cell::Cell;

/// Nested invocations allowed before evaluation fails with a stack overflow.
pub const MAX_CALL_DEPTH: u32 = 512;

/// The result of one invocation.
#[derive(Debug, Clone)]
pub struct Invocation<'h> {
    pub value: Value<'h>,
    /// Values assigned to `out` parameters, by parameter index.
    pub outs: Vec<(u32, Value<'h>)>,
}

impl<'h> Invocation<'h> {
    fn value(value: Value<'h>) -> Self {
        Self {
            value,
            outs: Vec::new(),
        }
    }
}

struct Frame<'h> {
    this: Option<Value<'h>>,
    arguments: Vec<Value<'h>>,
    locals: Vec<Value<'h>>,
    outs: Vec<(u32, Value<'h>)>,
}

enum Flow<'h> {
    Continue,
    Return(Value<'h>),
}

/// Leaves one level of call depth when dropped.
struct DepthGuard<'i> {
    depth: &'i Cell<u32>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

pub struct Interpreter<'a, 'h> {
    pub(crate) compilation: &'a Compilation,
    pub(crate) env: SymbolEnvironment<'a>,
    pub(crate) heap: &'a Heap<'h>,
    depth: Cell<u32>,
}

impl<'a, 'h> Interpreter<'a, 'h> {
    pub fn new(
        compilation: &'a Compilation,
        published: &'a PublishedRecords,
        heap: &'a Heap<'h>,
    ) -> Self {
        Self {
            compilation,
            env: SymbolEnvironment::new(compilation, published),
            heap,
            depth: Cell::new(0),
        }
    }

    pub(crate) fn depth(&self) -> u32 {
        self.depth.get()
    }

    fn enter(&self, span: Span) -> EvalResult<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= MAX_CALL_DEPTH {
            return Err(StackOverflowError { depth, span }.into());
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }

    pub(crate) fn display_member(&self, member: MemberRef) -> String {
        let view = self.env.view(member);
        format!(
            "{}.{}",
            self.compilation.ty(view.containing_type()).name,
            view.name()
        )
    }

    /// The synthesized member of this kind on record `ty`.
    pub fn synthesized(&self, ty: TypeId, kind: SynthesizedMemberKind) -> EvalResult<MemberRef> {
        self.env
            .published(ty)
            .and_then(|record| record.handle(kind))
            .map(MemberRef::Synthesized)
            .ok_or_else(|| {
                let symbol = self.compilation.ty(ty);
                MissingBodyError {
                    member: format!("{}.{:?}", symbol.name, kind),
                    span: symbol.span,
                }
                .into()
            })
    }

    /// Allocate an instance of record `ty` through its primary constructor.
    pub fn construct(&self, ty: TypeId, arguments: Vec<Value<'h>>) -> EvalResult<Value<'h>> {
        let ctor = self.synthesized(ty, SynthesizedMemberKind::PrimaryConstructor)?;
        self.instantiate(ty, ctor, arguments)
    }

    pub(crate) fn instantiate(
        &self,
        ty: TypeId,
        ctor: MemberRef,
        arguments: Vec<Value<'h>>,
    ) -> EvalResult<Value<'h>> {
        let object = Value::Object(self.heap.alloc_object(ty));
        tracing::trace!(ty = %self.compilation.ty(ty).name, "allocated instance");
        self.invoke(Some(object), ctor, arguments, false)?;
        Ok(object)
    }

    /// The implementation of `method` that runs for an instance of `runtime`.
    pub fn dispatch(&self, runtime: TypeId, method: MemberRef) -> MemberRef {
        let view = self.env.view(method);
        let modifiers = view.modifiers();
        if !(modifiers.is_virtual() || modifiers.is_override() || modifiers.is_abstract()) {
            return method;
        }
        let slot = self.env.least_overridden(method);
        let declaring = view.containing_type();
        for ty in std::iter::once(runtime).chain(self.compilation.ancestors(runtime)) {
            if ty == declaring {
                break;
            }
            let implementation = self
                .env
                .members_named(ty, view.name())
                .into_iter()
                .find(|candidate| {
                    let candidate_view = self.env.view(*candidate);
                    candidate_view.modifiers().is_override()
                        && candidate_view.category() == view.category()
                        && self.env.least_overridden(*candidate) == slot
                });
            if let Some(implementation) = implementation {
                return implementation;
            }
        }
        method
    }

    /// Invoke a member, dispatching virtually on the receiver if `virtual_call` is set.
    pub fn invoke(
        &self,
        receiver: Option<Value<'h>>,
        member: MemberRef,
        arguments: Vec<Value<'h>>,
        virtual_call: bool,
    ) -> EvalResult<Invocation<'h>> {
        let view = self.env.view(member);
        if !view.is_static() && receiver.map_or(true, |r| r.is_null()) {
            return Err(NullReferenceError {
                member: self.display_member(member),
                span: view.span(),
            }
            .into());
        }
        if view.parameters().len() != arguments.len() {
            return Err(ArgumentCountError {
                member: self.display_member(member),
                expected: view.parameters().len(),
                actual: arguments.len(),
                span: view.span(),
            }
            .into());
        }
        let target = match receiver {
            Some(Value::Object(object)) if virtual_call => self.dispatch(object.ty, member),
            _ => member,
        };
        let _guard = self.enter(view.span())?;
        match target {
            MemberRef::Synthesized(handle) => self.run_synthesized(handle, receiver, arguments),
            MemberRef::Declared(_) => self.run_declared(target, receiver, arguments),
        }
    }

    fn run_synthesized(
        &self,
        handle: MemberHandle,
        receiver: Option<Value<'h>>,
        arguments: Vec<Value<'h>>,
    ) -> EvalResult<Invocation<'h>> {
        let record = self
            .env
            .published(handle.owner)
            .unwrap_or_else(|| ice!("synthesized member of an unpublished record"));
        let member = record.member(handle);
        let stmts = match &member.body {
            BodyPlan::Block(stmts) => stmts,
            BodyPlan::Poisoned => {
                return Err(PoisonedBodyError {
                    member: self.display_member(MemberRef::Synthesized(handle)),
                    span: member.descriptor.span,
                }
                .into())
            }
            BodyPlan::Abstract => {
                return Err(MissingBodyError {
                    member: self.display_member(MemberRef::Synthesized(handle)),
                    span: member.descriptor.span,
                }
                .into())
            }
        };
        let mut frame = Frame {
            this: receiver,
            arguments,
            locals: Vec::new(),
            outs: Vec::new(),
        };
        let value = match self.exec_block(&mut frame, stmts)? {
            Flow::Return(value) => value,
            Flow::Continue => Value::Null,
        };
        frame.outs.sort_by_key(|(index, _)| *index);
        Ok(Invocation {
            value,
            outs: frame.outs,
        })
    }

    fn run_declared(
        &self,
        member: MemberRef,
        receiver: Option<Value<'h>>,
        arguments: Vec<Value<'h>>,
    ) -> EvalResult<Invocation<'h>> {
        let MemberRef::Declared(id) = member else {
            ice!("run_declared called with a synthesized member");
        };
        let symbol = self.compilation.member(id);
        let owner = symbol.containing_type;
        if owner == self.compilation.object_type() || owner == self.compilation.value_type_type()
        {
            return self
                .object_method(&symbol.name, receiver, &arguments)
                .map(Invocation::value);
        }
        // Declared constructors carry no plan and leave every field at its default.
        if symbol.is_constructor() {
            return Ok(Invocation::value(Value::Null));
        }
        if symbol.is_auto_property() {
            let object = self.expect_object(receiver.unwrap_or(Value::Null), symbol.span)?;
            let value = self.read_field(object, FieldRef::AutoPropertyBacking(id));
            return Ok(Invocation::value(value));
        }
        Err(MissingBodyError {
            member: self.display_member(member),
            span: symbol.span,
        }
        .into())
    }

    fn exec_block(&self, frame: &mut Frame<'h>, stmts: &[PlanStmt]) -> EvalResult<Flow<'h>> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(frame, stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue)
    }

    fn exec_stmt(&self, frame: &mut Frame<'h>, stmt: &PlanStmt) -> EvalResult<Flow<'h>> {
        match stmt {
            PlanStmt::Expr(expr) => {
                self.eval(frame, expr)?;
            }
            PlanStmt::Let { local, value } => {
                let value = self.eval(frame, value)?;
                let index = local.0 as usize;
                if frame.locals.len() <= index {
                    frame.locals.resize(index + 1, Value::Null);
                }
                frame.locals[index] = value;
            }
            PlanStmt::Return(None) => return Ok(Flow::Return(Value::Null)),
            PlanStmt::Return(Some(expr)) => return Ok(Flow::Return(self.eval(frame, expr)?)),
            PlanStmt::If { condition, then } => {
                let condition = self.eval(frame, condition)?;
                if self.expect_bool(condition)? {
                    return self.exec_block(frame, then);
                }
            }
            PlanStmt::AssignField {
                receiver,
                field,
                value,
            } => {
                let receiver = self.eval(frame, receiver)?;
                let value = self.eval(frame, value)?;
                let object = self.expect_object(receiver, Span::empty())?;
                object.set(*field, value);
            }
            PlanStmt::AssignOut { parameter, value } => {
                let value = self.eval(frame, value)?;
                frame.outs.push((*parameter, value));
            }
            PlanStmt::BaseConstructorCall {
                constructor,
                arguments,
            } => {
                let arguments = self.eval_all(frame, arguments)?;
                self.invoke(frame.this, *constructor, arguments, false)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn eval_all(&self, frame: &mut Frame<'h>, exprs: &[PlanExpr]) -> EvalResult<Vec<Value<'h>>> {
        exprs.iter().map(|e| self.eval(frame, e)).collect()
    }

    fn eval(&self, frame: &mut Frame<'h>, expr: &PlanExpr) -> EvalResult<Value<'h>> {
        let value = match expr {
            PlanExpr::This | PlanExpr::Base => frame
                .this
                .unwrap_or_else(|| ice!("this referenced in a static member")),
            PlanExpr::Parameter(index) => *frame
                .arguments
                .get(*index as usize)
                .unwrap_or_else(|| ice!("parameter index out of range")),
            PlanExpr::Local(local) => *frame
                .locals
                .get(local.0 as usize)
                .unwrap_or_else(|| ice!("local read before assignment")),
            PlanExpr::Null => Value::Null,
            PlanExpr::Bool(value) => Value::Bool(*value),
            PlanExpr::Int(value) => Value::Int(*value),
            PlanExpr::Str(value) => Value::Str(self.heap.alloc_str(value)),
            PlanExpr::Char(value) => Value::Char(*value),
            PlanExpr::TypeOf(ty) => Value::Type(self.resolve(ty)?),
            PlanExpr::Field { receiver, field } => {
                let receiver = self.eval(frame, receiver)?;
                let object = self.expect_object(receiver, Span::empty())?;
                self.read_field(object, *field)
            }
            PlanExpr::Property { receiver, property } => {
                let virtual_call = !matches!(**receiver, PlanExpr::Base);
                let receiver = self.eval(frame, receiver)?;
                self.invoke(Some(receiver), *property, vec![], virtual_call)?
                    .value
            }
            PlanExpr::Call {
                receiver,
                method,
                arguments,
            } => {
                let (receiver, virtual_call) = match receiver {
                    Some(receiver) => {
                        let virtual_call = !matches!(**receiver, PlanExpr::Base);
                        (Some(self.eval(frame, receiver)?), virtual_call)
                    }
                    None => (None, false),
                };
                let arguments = self.eval_all(frame, arguments)?;
                match method {
                    MethodRef::Member(member) => {
                        self.invoke(receiver, *member, arguments, virtual_call)?
                            .value
                    }
                    MethodRef::WellKnown { member, .. } => {
                        self.call_well_known(*member, receiver, &arguments)?
                    }
                }
            }
            PlanExpr::New {
                constructor,
                ty,
                arguments,
            } => {
                let arguments = self.eval_all(frame, arguments)?;
                match constructor {
                    MethodRef::Member(ctor) => self.instantiate(self.resolve(ty)?, *ctor, arguments)?,
                    MethodRef::WellKnown {
                        member: WellKnownMember::StringBuilderCtor,
                        ..
                    } => Value::Builder(self.heap.alloc_builder()),
                    MethodRef::WellKnown { member, .. } => {
                        return Err(UnsupportedError {
                            what: format!("new {}", member.qualified_name()),
                            span: Span::empty(),
                        }
                        .into())
                    }
                }
            }
            PlanExpr::ObjectEqual(lhs, rhs) => {
                let lhs = self.eval(frame, lhs)?;
                let rhs = self.eval(frame, rhs)?;
                Value::Bool(reference_equals(lhs, rhs))
            }
            PlanExpr::ObjectNotEqual(lhs, rhs) => {
                let lhs = self.eval(frame, lhs)?;
                let rhs = self.eval(frame, rhs)?;
                Value::Bool(!reference_equals(lhs, rhs))
            }
            PlanExpr::And(lhs, rhs) => {
                let lhs = self.eval(frame, lhs)?;
                if self.expect_bool(lhs)? {
                    let rhs = self.eval(frame, rhs)?;
                    Value::Bool(self.expect_bool(rhs)?)
                } else {
                    Value::Bool(false)
                }
            }
            PlanExpr::Or(lhs, rhs) => {
                let lhs = self.eval(frame, lhs)?;
                if self.expect_bool(lhs)? {
                    Value::Bool(true)
                } else {
                    let rhs = self.eval(frame, rhs)?;
                    Value::Bool(self.expect_bool(rhs)?)
                }
            }
            PlanExpr::Not(operand) => {
                let operand = self.eval(frame, operand)?;
                Value::Bool(!self.expect_bool(operand)?)
            }
            PlanExpr::As { operand, ty } => {
                let operand = self.eval(frame, operand)?;
                if self.is_instance(operand, ty) {
                    operand
                } else {
                    Value::Null
                }
            }
            PlanExpr::Is { operand, ty } => {
                let operand = self.eval(frame, operand)?;
                Value::Bool(self.is_instance(operand, ty))
            }
            PlanExpr::Convert { operand, ty } => {
                let operand = self.eval(frame, operand)?;
                if !operand.is_null() && !self.is_instance(operand, ty) {
                    return Err(InvalidCastError {
                        from: self.type_name(operand),
                        to: ty.display(self.compilation),
                        span: Span::empty(),
                    }
                    .into());
                }
                operand
            }
            PlanExpr::IntAdd(lhs, rhs) => {
                let lhs = self.eval(frame, lhs)?;
                let rhs = self.eval(frame, rhs)?;
                Value::Int(self.expect_int(lhs)?.wrapping_add(self.expect_int(rhs)?))
            }
            PlanExpr::IntMul(lhs, rhs) => {
                let lhs = self.eval(frame, lhs)?;
                let rhs = self.eval(frame, rhs)?;
                Value::Int(self.expect_int(lhs)?.wrapping_mul(self.expect_int(rhs)?))
            }
        };
        Ok(value)
    }

    fn resolve(&self, ty: &TypeRef) -> EvalResult<TypeId> {
        self.compilation.resolve_named(ty).ok_or_else(|| {
            UnsupportedError {
                what: format!("an instance of {}", ty.display(self.compilation)),
                span: Span::empty(),
            }
            .into()
        })
    }

    /// Read a field, falling back to the default value of its type.
    pub fn read_field(&self, object: &HeapObject<'h>, field: FieldRef) -> Value<'h> {
        object.get(field).unwrap_or_else(|| {
            let ty = self.compilation.field_type(field);
            if ty.is_special(SpecialType::Int32) {
                Value::Int(0)
            } else if ty.is_special(SpecialType::Boolean) {
                Value::Bool(false)
            } else {
                Value::Null
            }
        })
    }

    pub(crate) fn type_name(&self, value: Value<'h>) -> String {
        match value {
            Value::Object(object) => self.compilation.ty(object.ty).name.clone(),
            other => other.kind_name().to_owned(),
        }
    }

    /// Whether `value` is a non-null instance of `ty`.
    pub fn is_instance(&self, value: Value<'h>, ty: &TypeRef) -> bool {
        if value.is_null() {
            return false;
        }
        if ty.is_special(SpecialType::Object) {
            return true;
        }
        match value {
            Value::Object(object) => self
                .compilation
                .resolve_named(ty)
                .is_some_and(|target| self.compilation.is_derived_from_or_equal(object.ty, target)),
            Value::Bool(_) => ty.is_special(SpecialType::Boolean),
            Value::Int(_) => ty.is_special(SpecialType::Int32),
            Value::Char(_) => ty.is_special(SpecialType::Char),
            Value::Str(_) => ty.is_special(SpecialType::String),
            _ => ty.display(self.compilation) == value.kind_name(),
        }
    }

    pub(crate) fn expect_bool(&self, value: Value<'h>) -> EvalResult<bool> {
        match value {
            Value::Bool(value) => Ok(value),
            other => Err(self.cast_error(other, "System.Boolean")),
        }
    }

    pub(crate) fn expect_int(&self, value: Value<'h>) -> EvalResult<i32> {
        match value {
            Value::Int(value) => Ok(value),
            other => Err(self.cast_error(other, "System.Int32")),
        }
    }

    pub(crate) fn expect_object(
        &self,
        value: Value<'h>,
        span: Span,
    ) -> EvalResult<&'h HeapObject<'h>> {
        match value {
            Value::Object(object) => Ok(object),
            Value::Null => Err(NullReferenceError {
                member: "field access".to_owned(),
                span,
            }
            .into()),
            other => Err(self.cast_error(other, "object")),
        }
    }

    pub(crate) fn cast_error(&self, value: Value<'h>, to: &str) -> EvalError {
        InvalidCastError {
            from: self.type_name(value),
            to: to.to_owned(),
            span: Span::empty(),
        }
        .into()
    }
}

pub(crate) fn reference_equals<'a>(lhs: Value<'a>, rhs: Value<'a>) -> bool {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Object(lhs), Value::Object(rhs)) => lhs.is(rhs),
        (Value::Builder(lhs), Value::Builder(rhs)) => std::ptr::eq(lhs, rhs),
        _ => false,
    }
}
