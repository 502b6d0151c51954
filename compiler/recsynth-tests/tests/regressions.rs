//! Regression tests for base member disambiguation seen through whole-compilation synthesis.

use recsynth_macros::{assert_any, assert_ok, assert_some};
use recsynth_records::member::SynthesizedMemberKind;
use recsynth_records::{synthesize_compilation, RecordDiagnostic, SynthesisOptions};
use recsynth_symbols::builder::CompilationBuilder;
use recsynth_symbols::decl::CompilationDecl;
use recsynth_symbols::CancellationToken;

/// Two copy constructor candidates tie on custom modifier count; neither may be picked.
#[test]
fn test_tied_base_copy_constructors_poison_only_the_copy_constructor() {
    let source = r#"#![enable(implicit_some)]
    (types: [
        (name: "B", kind: Class, origin: Metadata, assembly: "lib", members: [
            Constructor(accessibility: Protected, parameters: []),
            Constructor(accessibility: Protected, parameters: [(name: "a", type: "B", custom_modifiers: 1)]),
            Constructor(accessibility: Protected, parameters: [(name: "b", type: "B", custom_modifiers: 1)]),
        ]),
        (name: "R", kind: RecordClass, base: "B", parameters: [(name: "V", type: "int")]),
    ])"#;
    let decl = assert_ok!(CompilationDecl::from_ron(source));
    let compilation = assert_ok!(CompilationBuilder::new(decl).build());
    let output = assert_ok!(synthesize_compilation(
        &compilation,
        SynthesisOptions::default(),
        &CancellationToken::new()
    ));
    let r = assert_some!(compilation.lookup_type("R"));
    let record = assert_some!(output.record(r));

    assert_any!(record.diagnostics.iter(), RecordDiagnostic::NoCopyConstructorInBaseType(_));
    let copy = assert_some!(record.get(SynthesizedMemberKind::CopyConstructor));
    assert!(copy.is_poisoned());
    for kind in [
        SynthesizedMemberKind::PrimaryConstructor,
        SynthesizedMemberKind::Deconstruct,
        SynthesizedMemberKind::GetHashCode,
    ] {
        let member = assert_some!(record.get(kind));
        assert!(!member.is_poisoned(), "{:?} was poisoned", kind);
    }
}
