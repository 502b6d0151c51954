use crate::operations::emit_members::MembersEmitOperation;
use crate::operations::emit_plans::PlansEmitOperation;
use crate::operations::emit_ron::RonEmitOperation;
use crate::operations::load::LoadOperation;
use crate::operations::synthesize::SynthesizeOperation;
use crate::query::{EmitQuery, QueryError};
use miette::Diagnostic;
use recsynth_records::{PublishedRecords, RecordDiagnostic, SynthesisError, SynthesisOutput};
use recsynth_symbols::{CancellationToken, Compilation, SymbolError};
use std::cell::RefCell;
use thiserror::Error;

/// Execute the entire synthesis pipeline.
///
/// Record diagnostics do not fail the pipeline; they are handed back in the output so the caller
/// can print the emitted documents before reporting them.
pub fn execute_synthesis_pipeline(
    opts: PipelineOptions,
    input: &str,
) -> Result<PipelineOutput, PipelineError> {
    let pipeline = Pipeline::new(opts)?;
    let compilation = LoadOperation::execute(&pipeline, input)?;
    let output = SynthesizeOperation::execute(&pipeline, &compilation)?;
    let published = output.published();
    let unit = SynthesisUnit {
        compilation: &compilation,
        output: &output,
        published: &published,
    };
    MembersEmitOperation::execute(&pipeline, unit)?;
    PlansEmitOperation::execute(&pipeline, unit)?;
    RonEmitOperation::execute(&pipeline, unit)?;
    Ok(PipelineOutput {
        documents: pipeline.documents.take(),
        diagnostics: output.diagnostics().cloned().collect(),
    })
}

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    SymbolError(#[from] SymbolError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    SynthesisError(#[from] SynthesisError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    QueryError(#[from] QueryError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    EmitError(#[from] EmitError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    ThreadPoolError(#[from] ThreadPoolError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    RecordErrors(#[from] RecordErrors),
}

#[derive(Debug, Error, Diagnostic)]
#[diagnostic(code(driver::emit))]
#[error("failed to emit {what}: {message}")]
pub struct EmitError {
    pub what: &'static str,
    pub message: String,
}

#[derive(Debug, Error, Diagnostic)]
#[diagnostic(code(driver::thread_pool))]
#[error("failed to start a thread pool with {threads} threads: {message}")]
pub struct ThreadPoolError {
    pub threads: usize,
    pub message: String,
}

#[derive(Debug, Error, Diagnostic)]
#[diagnostic(code(driver::record_errors))]
#[error("record synthesis reported {} error(s)", .diagnostics.len())]
pub struct RecordErrors {
    #[related]
    pub diagnostics: Vec<RecordDiagnostic>,
}

/// Options for the synthesis pipeline.
///
/// Most of these are derived from the command line arguments.
#[derive(Debug, Default, Clone)]
pub struct PipelineOptions {
    pub emit_members: bool,
    pub emit_plans: bool,
    pub emit_ron: bool,
    /// Unparsed emit queries; parsed when the pipeline is created.
    pub queries: Vec<String>,
    /// Size of the rayon pool records are synthesized on. `None` uses the global pool.
    pub threads: Option<usize>,
    pub sequential: bool,
}

/// What a pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Emitted documents, in emission order.
    pub documents: Vec<String>,
    /// Every record diagnostic, in type declaration order.
    pub diagnostics: Vec<RecordDiagnostic>,
}

impl PipelineOutput {
    pub fn warnings(&self) -> impl Iterator<Item = &RecordDiagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Fail if any diagnostic is an error.
    pub fn check(&self) -> Result<(), RecordErrors> {
        let errors = self
            .diagnostics
            .iter()
            .filter(|d| d.is_error())
            .cloned()
            .collect::<Vec<_>>();
        if errors.is_empty() {
            return Ok(());
        }
        Err(RecordErrors {
            diagnostics: errors,
        })
    }
}

/// A synthesis pipeline.
pub struct Pipeline {
    pub(crate) opts: PipelineOptions,
    pub(crate) queries: Vec<EmitQuery>,
    cancel: CancellationToken,
    documents: RefCell<Vec<String>>,
}

impl Pipeline {
    pub fn new(opts: PipelineOptions) -> Result<Self, PipelineError> {
        let queries = EmitQuery::from_queries(&opts.queries)?;
        Ok(Self {
            opts,
            queries,
            cancel: CancellationToken::new(),
            documents: RefCell::new(Vec::new()),
        })
    }

    /// Token observed by the synthesis operation.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn emit(&self, document: String) {
        self.documents.borrow_mut().push(document);
    }
}

/// The loaded compilation together with its synthesized records.
#[derive(Clone, Copy)]
pub struct SynthesisUnit<'c> {
    pub compilation: &'c Compilation,
    pub output: &'c SynthesisOutput,
    pub published: &'c PublishedRecords,
}

pub trait PipelineOperation<'c, I, O> {
    fn execute(pipeline: &'c Pipeline, input: I) -> Result<O, PipelineError>;
}

#[cfg(test)]
mod tests {
    use crate::pipeline::{execute_synthesis_pipeline, PipelineError, PipelineOptions};
    use crate::query::QueryError;
    use recsynth_macros::{assert_err, assert_matches, assert_ok};

    const POINT: &str = r#"#![enable(implicit_some)]
    (types: [
        (name: "Point", kind: RecordClass, parameters: [
            (name: "X", type: "int"),
            (name: "Y", type: "int"),
        ]),
        (name: "Tag", kind: RecordStruct, parameters: [(name: "Name", type: "string")]),
    ])"#;

    #[test]
    fn test_nothing_is_emitted_by_default() {
        let output = assert_ok!(execute_synthesis_pipeline(PipelineOptions::default(), POINT));
        assert!(output.documents.is_empty());
        assert!(output.diagnostics.is_empty());
        assert_ok!(output.check());
    }

    #[test]
    fn test_emit_members_of_every_record() {
        let opts = PipelineOptions {
            emit_members: true,
            sequential: true,
            ..Default::default()
        };
        let output = assert_ok!(execute_synthesis_pipeline(opts, POINT));
        assert_eq!(output.documents.len(), 2);
        assert!(output.documents[0].starts_with("Point:\n"));
        assert!(output.documents[0].contains("public virtual Point Point.<Clone>$()"));
        assert!(output.documents[1].starts_with("Tag:\n"));
    }

    #[test]
    fn test_member_query_selects_overloads() {
        let opts = PipelineOptions {
            emit_plans: true,
            queries: vec!["member.Point.Equals".to_owned()],
            ..Default::default()
        };
        let output = assert_ok!(execute_synthesis_pipeline(opts, POINT));
        assert_eq!(output.documents.len(), 2);
        assert!(output.documents[0].contains("Point.Equals(Point? other)"));
        assert!(output.documents[1].contains("Point.Equals(System.Object? obj)"));
    }

    #[test]
    fn test_query_for_unknown_record() {
        let opts = PipelineOptions {
            emit_plans: true,
            queries: vec!["record.Line".to_owned()],
            ..Default::default()
        };
        let err = assert_err!(execute_synthesis_pipeline(opts, POINT));
        assert_matches!(err, PipelineError::QueryError(QueryError::UnknownRecord { name }) => {
            assert_eq!(name, "Line")
        });
    }

    #[test]
    fn test_record_errors_are_reported_after_emission() {
        let source = r#"#![enable(implicit_some)]
        (types: [(name: "R", kind: RecordClass, parameters: [(name: "I", type: "int")], members: [
            Method(name: "Clone", returns: "R", accessibility: Public),
        ])])"#;
        let opts = PipelineOptions {
            emit_ron: true,
            ..Default::default()
        };
        let output = assert_ok!(execute_synthesis_pipeline(opts, source));
        assert_eq!(output.documents.len(), 1);
        let errors = assert_err!(output.check());
        assert!(!errors.diagnostics.is_empty());
    }
}
