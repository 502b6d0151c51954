use crate::pipeline::{Pipeline, PipelineError, PipelineOperation};
use recsynth_symbols::builder::CompilationBuilder;
use recsynth_symbols::decl::CompilationDecl;
use recsynth_symbols::Compilation;

/// Operation for loading a RON declaration file into a compilation.
pub struct LoadOperation;

impl<'c, T: AsRef<str>> PipelineOperation<'c, T, Compilation> for LoadOperation {
    fn execute(_: &'c Pipeline, input: T) -> Result<Compilation, PipelineError> {
        let source = input.as_ref();
        let decl = CompilationDecl::from_ron(source)?;
        let compilation = CompilationBuilder::new(decl).with_source(source).build()?;
        tracing::info!(types = compilation.types().count(), "loaded declarations");
        Ok(compilation)
    }
}
