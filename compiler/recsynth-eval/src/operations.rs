//! The record operations user code performs, expressed as calls into synthesized members.

use crate::error::EvalResult;
use crate::heap::Value;
use crate::interpreter::Interpreter;
use recsynth_records::member::SynthesizedMemberKind;
use recsynth_symbols::TypeId;

impl<'a, 'h> Interpreter<'a, 'h> {
    fn call_synthesized(
        &self,
        ty: TypeId,
        kind: SynthesizedMemberKind,
        receiver: Option<Value<'h>>,
        arguments: Vec<Value<'h>>,
    ) -> EvalResult<Value<'h>> {
        let member = self.synthesized(ty, kind)?;
        Ok(self.invoke(receiver, member, arguments, true)?.value)
    }

    /// `((T)lhs).Equals((T)rhs)`
    pub fn equals(&self, ty: TypeId, lhs: Value<'h>, rhs: Value<'h>) -> EvalResult<bool> {
        let result =
            self.call_synthesized(ty, SynthesizedMemberKind::EqualsTyped, Some(lhs), vec![rhs])?;
        self.expect_bool(result)
    }

    /// `(T)lhs == (T)rhs`
    pub fn op_equality(&self, ty: TypeId, lhs: Value<'h>, rhs: Value<'h>) -> EvalResult<bool> {
        let result = self.call_synthesized(
            ty,
            SynthesizedMemberKind::EqualityOperator,
            None,
            vec![lhs, rhs],
        )?;
        self.expect_bool(result)
    }

    /// `(T)lhs != (T)rhs`
    pub fn op_inequality(&self, ty: TypeId, lhs: Value<'h>, rhs: Value<'h>) -> EvalResult<bool> {
        let result = self.call_synthesized(
            ty,
            SynthesizedMemberKind::InequalityOperator,
            None,
            vec![lhs, rhs],
        )?;
        self.expect_bool(result)
    }

    /// `((T)value).<Clone>$()`, dispatched on the runtime type.
    pub fn clone_record(&self, ty: TypeId, value: Value<'h>) -> EvalResult<Value<'h>> {
        self.call_synthesized(ty, SynthesizedMemberKind::Clone, Some(value), vec![])
    }

    /// The values `((T)value).Deconstruct(out ...)` produces, in parameter order.
    pub fn deconstruct(&self, ty: TypeId, value: Value<'h>) -> EvalResult<Vec<Value<'h>>> {
        let member = self.synthesized(ty, SynthesizedMemberKind::Deconstruct)?;
        let arity = self.env.view(member).parameters().len();
        let invocation = self.invoke(Some(value), member, vec![Value::Null; arity], true)?;
        Ok(invocation.outs.into_iter().map(|(_, value)| value).collect())
    }

    /// `value.ToString()` as a Rust string.
    pub fn record_to_string(&self, value: Value<'h>) -> EvalResult<String> {
        self.to_display_string(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::EvalError;
    use crate::heap::{Heap, Value};
    use crate::interpreter::Interpreter;
    use bumpalo::Bump;
    use recsynth_macros::{assert_err, assert_matches, assert_ok, assert_some};
    use recsynth_records::driver::{synthesize_compilation, SynthesisOptions};
    use recsynth_records::PublishedRecords;
    use recsynth_symbols::builder::CompilationBuilder;
    use recsynth_symbols::decl::CompilationDecl;
    use recsynth_symbols::{CancellationToken, Compilation};

    const SHAPES: &str = r#"#![enable(implicit_some)]
    (types: [
        (name: "R", kind: RecordClass, parameters: [(name: "I", type: "int")]),
        (name: "Empty", kind: RecordClass, parameters: []),
        (name: "A", kind: RecordClass, parameters: [(name: "X", type: "int")]),
        (name: "B", kind: RecordClass, base: "A", base_arguments: ["X"], parameters: [
            (name: "X", type: "int"),
            (name: "Y", type: "string"),
        ]),
        (name: "S", kind: RecordStruct, parameters: [(name: "V", type: "int")]),
    ])"#;

    fn load(source: &str) -> (Compilation, PublishedRecords) {
        let decl = assert_ok!(CompilationDecl::from_ron(source));
        let compilation = assert_ok!(CompilationBuilder::new(decl).build());
        let cancel = CancellationToken::new();
        let output = assert_ok!(synthesize_compilation(
            &compilation,
            SynthesisOptions { parallel: false },
            &cancel
        ));
        let published = output.published();
        (compilation, published)
    }

    #[test]
    fn test_to_string_formats() {
        let (compilation, published) = load(SHAPES);
        let bump = Bump::new();
        let heap = Heap::new(&bump);
        let eval = Interpreter::new(&compilation, &published, &heap);
        let r = assert_some!(compilation.lookup_type("R"));
        let empty = assert_some!(compilation.lookup_type("Empty"));
        let b = assert_some!(compilation.lookup_type("B"));

        let value = assert_ok!(eval.construct(r, vec![Value::Int(5)]));
        assert_eq!(assert_ok!(eval.record_to_string(value)), "R { I = 5 }");
        let value = assert_ok!(eval.construct(empty, vec![]));
        assert_eq!(assert_ok!(eval.record_to_string(value)), "Empty { }");
        let value = assert_ok!(eval.construct(b, vec![Value::Int(1), Value::Str("y")]));
        assert_eq!(assert_ok!(eval.record_to_string(value)), "B { X = 1, Y = y }");
    }

    #[test]
    fn test_equality_respects_contract() {
        let (compilation, published) = load(SHAPES);
        let bump = Bump::new();
        let heap = Heap::new(&bump);
        let eval = Interpreter::new(&compilation, &published, &heap);
        let a = assert_some!(compilation.lookup_type("A"));
        let b = assert_some!(compilation.lookup_type("B"));

        let b1 = assert_ok!(eval.construct(b, vec![Value::Int(1), Value::Str("y")]));
        let b2 = assert_ok!(eval.construct(b, vec![Value::Int(1), Value::Str("y")]));
        let b3 = assert_ok!(eval.construct(b, vec![Value::Int(1), Value::Str("z")]));
        let a1 = assert_ok!(eval.construct(a, vec![Value::Int(1)]));
        assert!(assert_ok!(eval.equals(b, b1, b2)));
        assert!(!assert_ok!(eval.equals(b, b1, b3)));
        assert!(!assert_ok!(eval.equals(a, a1, b1)));
        assert!(!assert_ok!(eval.equals(a, b1, a1)));
        assert_eq!(assert_ok!(eval.hash_code(b1)), assert_ok!(eval.hash_code(b2)));

        assert!(assert_ok!(eval.op_equality(b, b1, b2)));
        assert!(assert_ok!(eval.op_equality(b, Value::Null, Value::Null)));
        assert!(!assert_ok!(eval.op_equality(b, b1, Value::Null)));
        assert!(!assert_ok!(eval.op_equality(b, Value::Null, b1)));
        assert!(assert_ok!(eval.op_inequality(b, b1, b3)));
    }

    #[test]
    fn test_clone_and_deconstruct() {
        let (compilation, published) = load(SHAPES);
        let bump = Bump::new();
        let heap = Heap::new(&bump);
        let eval = Interpreter::new(&compilation, &published, &heap);
        let a = assert_some!(compilation.lookup_type("A"));
        let b = assert_some!(compilation.lookup_type("B"));

        let original = assert_ok!(eval.construct(b, vec![Value::Int(7), Value::Str("q")]));
        let copy = assert_ok!(eval.clone_record(a, original));
        let (lhs, rhs) =
            assert_matches!((original, copy), (Value::Object(l), Value::Object(r)) => (l, r));
        assert!(!lhs.is(rhs));
        assert_eq!(rhs.ty, b);
        assert!(assert_ok!(eval.equals(b, original, copy)));

        let parts = assert_ok!(eval.deconstruct(b, original));
        assert_eq!(parts.len(), 2);
        let rebuilt = assert_ok!(eval.construct(b, parts));
        assert!(assert_ok!(eval.equals(b, original, rebuilt)));
    }

    #[test]
    fn test_record_struct_equality() {
        let (compilation, published) = load(SHAPES);
        let bump = Bump::new();
        let heap = Heap::new(&bump);
        let eval = Interpreter::new(&compilation, &published, &heap);
        let s = assert_some!(compilation.lookup_type("S"));
        let lhs = assert_ok!(eval.construct(s, vec![Value::Int(3)]));
        let rhs = assert_ok!(eval.construct(s, vec![Value::Int(3)]));
        assert!(assert_ok!(eval.equals(s, lhs, rhs)));
        assert!(assert_ok!(eval.values_equal(lhs, rhs)));
        assert!(assert_ok!(eval.op_equality(s, lhs, rhs)));
        assert_eq!(assert_ok!(eval.record_to_string(lhs)), "S { V = 3 }");
    }

    #[test]
    fn test_poisoned_body_throws() {
        let (compilation, published) = load(
            r#"#![enable(implicit_some)]
            (
                missing: (types: [StringBuilder]),
                types: [(name: "R", kind: RecordClass, parameters: [(name: "I", type: "int")])],
            )"#,
        );
        let bump = Bump::new();
        let heap = Heap::new(&bump);
        let eval = Interpreter::new(&compilation, &published, &heap);
        let r = assert_some!(compilation.lookup_type("R"));
        let value = assert_ok!(eval.construct(r, vec![Value::Int(1)]));
        let err = assert_err!(eval.record_to_string(value));
        assert_matches!(err, EvalError::PoisonedBody(_) => ());
        assert!(assert_ok!(eval.equals(r, value, value)));
    }
}
