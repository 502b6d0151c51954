//! Capture analysis of primary constructor parameters of non-record types.
//!
//! A parameter needs a backing field only when an instance member body refers to it. The result
//! is computed once per type and memoized in the type's single-assignment cell. Racing first
//! callers may each run the analysis, but only one map is ever published and every caller sees
//! that one.

use indexmap::IndexMap;
use recsynth_diagnostics::ice;
use recsynth_symbols::{
    CancellationToken, CancelledError, CapturedParameters, Compilation, FieldRef, MemberSymbol,
    TypeId,
};

/// Parameters captured by instance members of `ty`, keyed by ordinal.
///
/// Records always answer with an empty map. A cancelled analysis publishes nothing, so a later
/// call starts over.
pub fn get_captured_parameters<'c>(
    compilation: &'c Compilation,
    ty: TypeId,
    cancel: &CancellationToken,
) -> Result<&'c CapturedParameters, CancelledError> {
    compilation
        .ty(ty)
        .captured_parameters_cell()
        .get_or_try_init(|| analyze(compilation, ty, cancel).map(Box::new))
}

/// The captured parameter fields of `ty` in ordinal order.
pub fn get_backing_fields(
    compilation: &Compilation,
    ty: TypeId,
    cancel: &CancellationToken,
) -> Result<Vec<FieldRef>, CancelledError> {
    let captured = get_captured_parameters(compilation, ty, cancel)?;
    Ok(captured.iter().map(|(_, field)| field).collect())
}

fn captures(member: &MemberSymbol, name: &str) -> bool {
    if member.is_static() || !(member.is_method() || member.is_property()) {
        return false;
    }
    member.body.as_ref().is_some_and(|body| {
        body.references.iter().any(|r| r == name) && !body.locals.iter().any(|l| l == name)
    })
}

fn analyze(
    compilation: &Compilation,
    ty: TypeId,
    cancel: &CancellationToken,
) -> Result<CapturedParameters, CancelledError> {
    let symbol = compilation.ty(ty);
    let ctor = match &symbol.primary_constructor {
        Some(ctor) if !symbol.is_record() => ctor,
        _ => return Ok(CapturedParameters::default()),
    };
    let _span = tracing::debug_span!("capture_analysis", ty = %symbol.name).entered();

    let mut fields = IndexMap::new();
    for (ordinal, parameter) in ctor.parameters.iter().enumerate() {
        // Members of the type hide parameters of the same name inside member bodies.
        if compilation.members_named(ty, &parameter.name).next().is_some() {
            continue;
        }
        for member in compilation.members_of(ty) {
            cancel.check()?;
            if captures(member, &parameter.name) {
                let ordinal = u32::try_from(ordinal)
                    .unwrap_or_else(|_| ice!("parameter ordinal exceeds u32"));
                fields.insert(ordinal, FieldRef::Captured { owner: ty, ordinal });
                break;
            }
        }
    }
    tracing::trace!(captured = fields.len(), "capture analysis finished");
    Ok(CapturedParameters::new(fields))
}

#[cfg(test)]
mod tests {
    use crate::capture::{get_backing_fields, get_captured_parameters};
    use recsynth_macros::{assert_err, assert_ok, assert_some};
    use recsynth_symbols::builder::CompilationBuilder;
    use recsynth_symbols::decl::CompilationDecl;
    use recsynth_symbols::{CancellationToken, Compilation, FieldRef};

    const CAPTURING_CLASS: &str = r#"#![enable(implicit_some)]
    (types: [
        (name: "C", kind: Class, parameters: [
            (name: "a", type: "int"),
            (name: "b", type: "int"),
            (name: "c", type: "int"),
            (name: "d", type: "int"),
        ], members: [
            Method(name: "Sum", returns: "int", accessibility: Public,
                body: (references: ["c", "a"])),
            Method(name: "Shadowed", returns: "int", accessibility: Public,
                body: (references: ["b"], locals: ["b"])),
            Method(name: "Static", returns: "int", accessibility: Public, modifiers: [static],
                body: (references: ["d"])),
        ]),
        (name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")]),
    ])"#;

    fn build(source: &str) -> Compilation {
        let decl = assert_ok!(CompilationDecl::from_ron(source));
        assert_ok!(CompilationBuilder::new(decl).build())
    }

    #[test]
    fn test_only_referenced_parameters_are_captured() {
        let compilation = build(CAPTURING_CLASS);
        let cancel = CancellationToken::new();
        let c = assert_some!(compilation.lookup_type("C"));
        let captured = assert_ok!(get_captured_parameters(&compilation, c, &cancel));
        assert_eq!(captured.iter().map(|(o, _)| o).collect::<Vec<_>>(), vec![0, 2]);
        let fields = assert_ok!(get_backing_fields(&compilation, c, &cancel));
        assert_eq!(fields[1], FieldRef::Captured { owner: c, ordinal: 2 });
        assert_eq!(compilation.field_name(fields[0]), "<a>P");
    }

    #[test]
    fn test_records_capture_nothing() {
        let compilation = build(CAPTURING_CLASS);
        let cancel = CancellationToken::new();
        let r = assert_some!(compilation.lookup_type("R"));
        assert!(assert_ok!(get_captured_parameters(&compilation, r, &cancel)).is_empty());
    }

    #[test]
    fn test_cancelled_analysis_publishes_nothing() {
        let compilation = build(CAPTURING_CLASS);
        let c = assert_some!(compilation.lookup_type("C"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_err!(get_captured_parameters(&compilation, c, &cancel));
        assert!(compilation.ty(c).captured_parameters_cell().get().is_none());
        let fresh = CancellationToken::new();
        assert_eq!(assert_ok!(get_captured_parameters(&compilation, c, &fresh)).len(), 2);
    }

    #[test]
    fn test_memoized_value_is_shared() {
        let compilation = build(CAPTURING_CLASS);
        let cancel = CancellationToken::new();
        let c = assert_some!(compilation.lookup_type("C"));
        let first = assert_ok!(get_captured_parameters(&compilation, c, &cancel));
        let second = assert_ok!(get_captured_parameters(&compilation, c, &cancel));
        assert!(std::ptr::eq(first, second));
    }
}
