//! Concurrent first access to the captured parameter memo.

use rayon::prelude::*;
use recsynth_macros::{assert_ok, assert_some};
use recsynth_records::capture::{get_backing_fields, get_captured_parameters};
use recsynth_symbols::builder::CompilationBuilder;
use recsynth_symbols::decl::CompilationDecl;
use recsynth_symbols::{CancellationToken, Compilation, FieldRef};

fn canvas_types(count: usize) -> String {
    let types = (0..count)
        .map(|i| {
            format!(
                r#"(name: "Canvas{i}", kind: Class, parameters: [
                    (name: "width", type: "int"),
                    (name: "unused", type: "string"),
                    (name: "height", type: "int"),
                ], members: [
                    Method(name: "Area", returns: "int", accessibility: Public, body: (references: ["width", "height"])),
                ])"#
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("#![enable(implicit_some)]\n(types: [{}])", types)
}

fn build(source: &str) -> Compilation {
    let decl = assert_ok!(CompilationDecl::from_ron(source));
    assert_ok!(CompilationBuilder::new(decl).build())
}

#[test]
fn test_concurrent_first_access_publishes_one_map() {
    let compilation = build(&canvas_types(16));
    let cancel = CancellationToken::new();
    let ids = (0..16)
        .map(|i| assert_some!(compilation.lookup_type(&format!("Canvas{}", i))))
        .collect::<Vec<_>>();

    // Many callers per type, all racing for the first initialisation.
    let observed = (0..ids.len() * 32)
        .into_par_iter()
        .map(|i| {
            let ty = ids[i % ids.len()];
            let captured = assert_ok!(get_captured_parameters(&compilation, ty, &cancel));
            (ty, captured as *const _ as usize)
        })
        .collect::<Vec<_>>();

    for ty in &ids {
        let addresses = observed
            .iter()
            .filter(|(observed_ty, _)| observed_ty == ty)
            .map(|(_, address)| *address)
            .collect::<Vec<_>>();
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }

    let fields = assert_ok!(get_backing_fields(&compilation, ids[3], &cancel));
    assert_eq!(
        fields,
        vec![
            FieldRef::Captured {
                owner: ids[3],
                ordinal: 0
            },
            FieldRef::Captured {
                owner: ids[3],
                ordinal: 2
            },
        ]
    );
}

#[test]
fn test_cancelled_analysis_is_retried() {
    let compilation = build(&canvas_types(1));
    let ty = assert_some!(compilation.lookup_type("Canvas0"));
    let cancelled = CancellationToken::new();
    cancelled.cancel();
    assert!(get_captured_parameters(&compilation, ty, &cancelled).is_err());

    let captured = assert_ok!(get_captured_parameters(&compilation, ty, &CancellationToken::new()));
    assert_eq!(captured.len(), 2);
}
