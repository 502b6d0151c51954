//! Native implementations of library members.

use crate::error::{EvalResult, StackOverflowError, UnsupportedError};
use crate::heap::Value;
use crate::interpreter::{reference_equals, Interpreter};
use recsynth_records::MemberRef;
use recsynth_span::Span;
use recsynth_symbols::WellKnownMember;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Calls deeper than this make `RuntimeHelpers.EnsureSufficientExecutionStack` throw.
pub const EXECUTION_STACK_LIMIT: u32 = 256;

fn string_hash(value: &str) -> i32 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish() as i32
}

impl<'a, 'h> Interpreter<'a, 'h> {
    /// The virtual `System.Object` method of this name.
    fn object_slot(&self, name: &str) -> EvalResult<MemberRef> {
        let object = self.compilation.object_type();
        self.env
            .members_named(object, name)
            .into_iter()
            .find(|m| !self.env.view(*m).is_static())
            .ok_or_else(|| {
                UnsupportedError {
                    what: format!("System.Object.{}", name),
                    span: Span::empty(),
                }
                .into()
            })
    }

    /// `System.Object` and `System.ValueType` members, for any receiver.
    pub(crate) fn object_method(
        &self,
        name: &str,
        receiver: Option<Value<'h>>,
        arguments: &[Value<'h>],
    ) -> EvalResult<Value<'h>> {
        let receiver = receiver.unwrap_or(Value::Null);
        match (name, arguments) {
            ("Equals", [other]) => Ok(Value::Bool(match receiver {
                Value::Object(_) => reference_equals(receiver, *other),
                _ => primitive_equals(receiver, *other),
            })),
            ("GetHashCode", []) => Ok(Value::Int(match receiver {
                Value::Object(object) => object.id as i32,
                _ => primitive_hash(receiver),
            })),
            ("ToString", []) => {
                let text = match receiver {
                    Value::Object(object) => self.compilation.ty(object.ty).name.clone(),
                    _ => self.primitive_display(receiver),
                };
                Ok(Value::Str(self.heap.alloc_str(&text)))
            }
            // The constructors of both types do nothing.
            (".ctor", []) => Ok(Value::Null),
            _ => Err(UnsupportedError {
                what: format!("System.Object.{}", name),
                span: Span::empty(),
            }
            .into()),
        }
    }

    pub(crate) fn call_well_known(
        &self,
        member: WellKnownMember,
        receiver: Option<Value<'h>>,
        arguments: &[Value<'h>],
    ) -> EvalResult<Value<'h>> {
        match (member, arguments) {
            (WellKnownMember::TypeGetTypeFromHandle, [handle]) => Ok(*handle),
            (WellKnownMember::TypeOpEquality, [lhs, rhs]) => Ok(Value::Bool(match (lhs, rhs) {
                (Value::Type(lhs), Value::Type(rhs)) => lhs == rhs,
                (Value::Null, Value::Null) => true,
                _ => false,
            })),
            (WellKnownMember::EqualityComparerGetDefault, []) => Ok(Value::Comparer),
            (WellKnownMember::EqualityComparerEquals, [lhs, rhs]) => {
                Ok(Value::Bool(self.values_equal(*lhs, *rhs)?))
            }
            (WellKnownMember::EqualityComparerGetHashCode, [value]) => {
                Ok(Value::Int(self.hash_code(*value)?))
            }
            (WellKnownMember::StringBuilderCtor, []) => {
                Ok(Value::Builder(self.heap.alloc_builder()))
            }
            (
                WellKnownMember::StringBuilderAppendString
                | WellKnownMember::StringBuilderAppendChar
                | WellKnownMember::StringBuilderAppendObject,
                [value],
            ) => {
                let builder = receiver.unwrap_or(Value::Null);
                let Value::Builder(cell) = builder else {
                    return Err(self.cast_error(builder, "System.Text.StringBuilder"));
                };
                let text = self.to_display_string(*value)?;
                cell.borrow_mut().push_str(&text);
                Ok(builder)
            }
            (WellKnownMember::StringBuilderToString, []) => {
                let builder = receiver.unwrap_or(Value::Null);
                let Value::Builder(cell) = builder else {
                    return Err(self.cast_error(builder, "System.Text.StringBuilder"));
                };
                let text = self.heap.alloc_str(cell.borrow().as_str());
                Ok(Value::Str(text))
            }
            (WellKnownMember::RuntimeHelpersEnsureSufficientExecutionStack, []) => {
                if self.depth() > EXECUTION_STACK_LIMIT {
                    return Err(StackOverflowError {
                        depth: self.depth(),
                        span: Span::empty(),
                    }
                    .into());
                }
                Ok(Value::Null)
            }
            _ => Err(UnsupportedError {
                what: member.qualified_name(),
                span: Span::empty(),
            }
            .into()),
        }
    }

    /// `EqualityComparer<T>.Default.Equals(lhs, rhs)`
    pub fn values_equal(&self, lhs: Value<'h>, rhs: Value<'h>) -> EvalResult<bool> {
        match (lhs, rhs) {
            (Value::Null, Value::Null) => Ok(true),
            (Value::Null, _) | (_, Value::Null) => Ok(false),
            (Value::Object(_), _) => {
                let equals = self.object_slot("Equals")?;
                let result = self.invoke(Some(lhs), equals, vec![rhs], true)?.value;
                self.expect_bool(result)
            }
            _ => Ok(primitive_equals(lhs, rhs)),
        }
    }

    /// `EqualityComparer<T>.Default.GetHashCode(value)`
    pub fn hash_code(&self, value: Value<'h>) -> EvalResult<i32> {
        match value {
            Value::Object(_) => {
                let hash = self.object_slot("GetHashCode")?;
                let result = self.invoke(Some(value), hash, vec![], true)?.value;
                self.expect_int(result)
            }
            other => Ok(primitive_hash(other)),
        }
    }

    /// The text `StringBuilder.Append` adds for a value; objects go through `ToString()`.
    pub fn to_display_string(&self, value: Value<'h>) -> EvalResult<String> {
        match value {
            Value::Object(_) => {
                let to_string = self.object_slot("ToString")?;
                match self.invoke(Some(value), to_string, vec![], true)?.value {
                    Value::Str(text) => Ok(text.to_owned()),
                    Value::Null => Ok(String::new()),
                    other => Err(self.cast_error(other, "System.String")),
                }
            }
            other => Ok(self.primitive_display(other)),
        }
    }

    fn primitive_display(&self, value: Value<'h>) -> String {
        match value {
            Value::Null => String::new(),
            Value::Bool(true) => "True".to_owned(),
            Value::Bool(false) => "False".to_owned(),
            Value::Int(value) => value.to_string(),
            Value::Char(value) => value.to_string(),
            Value::Str(value) => value.to_owned(),
            Value::Type(ty) => self.compilation.ty(ty).name.clone(),
            Value::Builder(cell) => cell.borrow().as_str().to_owned(),
            Value::Comparer | Value::Object(_) => value.kind_name().to_owned(),
        }
    }
}

fn primitive_equals<'a>(lhs: Value<'a>, rhs: Value<'a>) -> bool {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
        (Value::Int(lhs), Value::Int(rhs)) => lhs == rhs,
        (Value::Char(lhs), Value::Char(rhs)) => lhs == rhs,
        (Value::Str(lhs), Value::Str(rhs)) => lhs == rhs,
        (Value::Type(lhs), Value::Type(rhs)) => lhs == rhs,
        (Value::Comparer, Value::Comparer) => true,
        _ => reference_equals(lhs, rhs),
    }
}

fn primitive_hash(value: Value) -> i32 {
    match value {
        Value::Null | Value::Comparer | Value::Builder(_) => 0,
        Value::Bool(value) => value as i32,
        Value::Int(value) => value,
        Value::Char(value) => value as i32,
        Value::Str(value) => string_hash(value),
        Value::Type(ty) => ty.0 as i32,
        Value::Object(object) => object.id as i32,
    }
}

#[cfg(test)]
mod tests {
    use crate::builtins::{primitive_equals, primitive_hash};
    use crate::heap::{Heap, Value};
    use bumpalo::Bump;
    use recsynth_symbols::TypeId;

    #[test]
    fn test_strings_compare_by_content() {
        let owned = String::from("abc");
        assert!(primitive_equals(Value::Str("abc"), Value::Str(&owned)));
        assert_eq!(
            primitive_hash(Value::Str("abc")),
            primitive_hash(Value::Str(&owned))
        );
        assert!(!primitive_equals(Value::Int(1), Value::Bool(true)));
    }

    #[test]
    fn test_heap_values_compare_by_reference() {
        let bump = Bump::new();
        let heap = Heap::new(&bump);
        let a = heap.alloc_object(TypeId(0));
        let b = heap.alloc_object(TypeId(0));
        assert!(primitive_equals(Value::Object(a), Value::Object(a)));
        assert!(!primitive_equals(Value::Object(a), Value::Object(b)));
        let builder = heap.alloc_builder();
        assert!(primitive_equals(Value::Builder(builder), Value::Builder(builder)));
        assert!(!primitive_equals(Value::Builder(builder), Value::Builder(heap.alloc_builder())));
        assert!(!primitive_equals(Value::Object(a), Value::Null));
    }
}
