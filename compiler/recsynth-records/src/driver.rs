//! Synthesis of every record of a compilation.
//!
//! A record's synthesis looks at the synthesized members of its ancestors, so records are
//! scheduled in layers by the depth of their record base chain. Layer `n` only sees records of
//! layers below it, and every record of one layer is independent of the others.

use crate::capture::get_backing_fields;
use crate::env::{PublishedRecords, SymbolEnvironment};
use crate::error::{RecordDiagnostic, SynthesisError};
use crate::record::{synthesize_record, RecordSynthesis};
use rayon::prelude::*;
use recsynth_symbols::{CancellationToken, Compilation, FieldRef, TypeId};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Synthesize the records of one layer on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Captured primary constructor parameters of a non-record type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CapturedFields {
    pub ty: TypeId,
    pub fields: Vec<FieldRef>,
}

#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SynthesisOutput {
    /// In type declaration order.
    pub records: Vec<RecordSynthesis>,
    /// Non-record types with a primary constructor, in type declaration order.
    pub captured: Vec<CapturedFields>,
}

impl SynthesisOutput {
    pub fn record(&self, ty: TypeId) -> Option<&RecordSynthesis> {
        self.records.iter().find(|r| r.ty == ty)
    }

    /// Every diagnostic, ordered by type declaration and then by the order it was reported in.
    pub fn diagnostics(&self) -> impl Iterator<Item = &RecordDiagnostic> {
        self.records.iter().flat_map(|r| r.diagnostics.iter())
    }

    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|r| r.diagnostics.has_errors())
    }

    /// A view that resolves members of every synthesized record.
    pub fn published(&self) -> PublishedRecords {
        let mut published = PublishedRecords::new();
        for record in &self.records {
            published.publish(record.clone());
        }
        published
    }
}

/// Number of record ancestors declared in this compilation.
fn record_depth(
    compilation: &Compilation,
    ty: TypeId,
    memo: &mut FxHashMap<TypeId, usize>,
) -> usize {
    if let Some(depth) = memo.get(&ty) {
        return *depth;
    }
    let depth = match compilation.base_type(ty) {
        Some(base) if compilation.ty(base).is_record() => record_depth(compilation, base, memo) + 1,
        _ => 0,
    };
    memo.insert(ty, depth);
    depth
}

/// Group the records of the compilation into layers, each in declaration order.
pub fn schedule_layers(compilation: &Compilation) -> Vec<Vec<TypeId>> {
    let mut memo = FxHashMap::default();
    let mut layers: Vec<Vec<TypeId>> = Vec::new();
    for symbol in compilation.types().filter(|t| t.is_record()) {
        let depth = record_depth(compilation, symbol.id, &mut memo);
        if layers.len() <= depth {
            layers.resize_with(depth + 1, Vec::new);
        }
        layers[depth].push(symbol.id);
    }
    layers
}

fn synthesize_layer(
    env: &SymbolEnvironment,
    layer: &[TypeId],
    options: SynthesisOptions,
    cancel: &CancellationToken,
) -> Result<Vec<RecordSynthesis>, SynthesisError> {
    if options.parallel {
        layer
            .par_iter()
            .map(|ty| synthesize_record(env, *ty, cancel))
            .collect()
    } else {
        layer
            .iter()
            .map(|ty| synthesize_record(env, *ty, cancel))
            .collect()
    }
}

/// Synthesize the members of every record and the captured parameter fields of every other type
/// with a primary constructor.
///
/// A layer is published only once all of its records succeeded. On cancellation nothing is
/// returned and no partial layer was ever visible to other records.
pub fn synthesize_compilation(
    compilation: &Compilation,
    options: SynthesisOptions,
    cancel: &CancellationToken,
) -> Result<SynthesisOutput, SynthesisError> {
    let layers = schedule_layers(compilation);
    let mut published = PublishedRecords::new();
    for (depth, layer) in layers.iter().enumerate() {
        tracing::info!(depth, records = layer.len(), "synthesizing layer");
        let env = SymbolEnvironment::new(compilation, &published);
        let records = synthesize_layer(&env, layer, options, cancel)?;
        for record in records {
            published.publish(record);
        }
    }

    let plain = compilation
        .types()
        .filter(|t| !t.is_record() && t.primary_constructor.is_some())
        .map(|t| t.id)
        .collect::<Vec<_>>();
    let capture = |ty: &TypeId| {
        get_backing_fields(compilation, *ty, cancel).map(|fields| CapturedFields { ty: *ty, fields })
    };
    let captured = if options.parallel {
        plain.par_iter().map(capture).collect::<Result<Vec<_>, _>>()?
    } else {
        plain.iter().map(capture).collect::<Result<Vec<_>, _>>()?
    };

    let mut records = published.into_records();
    let records = compilation
        .types()
        .filter_map(|t| records.remove(&t.id))
        .collect::<Vec<_>>();
    tracing::info!(records = records.len(), captured = captured.len(), "synthesis finished");
    Ok(SynthesisOutput { records, captured })
}

#[cfg(test)]
mod tests {
    use crate::driver::{schedule_layers, synthesize_compilation, SynthesisOptions};
    use crate::error::SynthesisError;
    use recsynth_macros::{assert_err, assert_matches, assert_ok, assert_some};
    use recsynth_symbols::builder::CompilationBuilder;
    use recsynth_symbols::decl::CompilationDecl;
    use recsynth_symbols::{CancellationToken, Compilation};

    const HIERARCHY: &str = r#"#![enable(implicit_some)]
    (types: [
        (name: "C", kind: RecordClass, base: "B", base_arguments: ["X", "Y"], parameters: [
            (name: "X", type: "int"),
            (name: "Y", type: "int"),
            (name: "Z", type: "int"),
        ]),
        (name: "A", kind: RecordClass, parameters: [(name: "X", type: "int")]),
        (name: "P", kind: Class, parameters: [(name: "p", type: "int")], members: [
            Method(name: "Get", returns: "int", accessibility: Public, body: (references: ["p"])),
        ]),
        (name: "B", kind: RecordClass, base: "A", base_arguments: ["X"], parameters: [
            (name: "X", type: "int"),
            (name: "Y", type: "int"),
        ]),
        (name: "S", kind: RecordStruct, parameters: [(name: "V", type: "string")]),
    ])"#;

    fn build(source: &str) -> Compilation {
        let decl = assert_ok!(CompilationDecl::from_ron(source));
        assert_ok!(CompilationBuilder::new(decl).build())
    }

    #[test]
    fn test_layers_follow_record_depth() {
        let compilation = build(HIERARCHY);
        let layers = schedule_layers(&compilation);
        let names = layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|ty| compilation.ty(*ty).name.as_str())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        assert_eq!(names, vec![vec!["A", "S"], vec!["B"], vec!["C"]]);
    }

    #[test]
    fn test_output_is_in_declaration_order() {
        let compilation = build(HIERARCHY);
        let cancel = CancellationToken::new();
        let output = assert_ok!(synthesize_compilation(
            &compilation,
            SynthesisOptions::default(),
            &cancel
        ));
        let names = output
            .records
            .iter()
            .map(|r| compilation.ty(r.ty).name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["C", "A", "B", "S"]);
        assert_eq!(output.captured.len(), 1);
        assert_eq!(output.captured[0].fields.len(), 1);
        assert!(!output.has_errors());
        assert!(output.records.iter().all(|r| !r.is_poisoned()));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let compilation = build(HIERARCHY);
        let cancel = CancellationToken::new();
        let parallel = assert_ok!(synthesize_compilation(
            &compilation,
            SynthesisOptions { parallel: true },
            &cancel
        ));
        let sequential = assert_ok!(synthesize_compilation(
            &compilation,
            SynthesisOptions { parallel: false },
            &cancel
        ));
        for (lhs, rhs) in parallel.records.iter().zip(&sequential.records) {
            let lhs = lhs.members.iter().map(|m| &m.body).collect::<Vec<_>>();
            let rhs = rhs.members.iter().map(|m| &m.body).collect::<Vec<_>>();
            assert_eq!(lhs, rhs);
        }
    }

    #[test]
    fn test_cancelled_run_returns_nothing() {
        let compilation = build(HIERARCHY);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = assert_err!(synthesize_compilation(
            &compilation,
            SynthesisOptions::default(),
            &cancel
        ));
        assert_matches!(err, SynthesisError::Cancelled(_) => ());
        let c = assert_some!(compilation.lookup_type("P"));
        assert!(compilation.ty(c).captured_parameters_cell().get().is_none());
    }
}
