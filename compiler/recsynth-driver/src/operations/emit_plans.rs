use crate::operations::select::{select, Selection};
use crate::pipeline::{Pipeline, PipelineError, PipelineOperation, SynthesisUnit};
use recsynth_records::textual_pass::RecordTextualPass;
use recsynth_records::SymbolEnvironment;

/// Operation for emitting synthesized members together with their body plans.
pub struct PlansEmitOperation;

impl<'c> PipelineOperation<'c, SynthesisUnit<'c>, ()> for PlansEmitOperation {
    fn execute(pipeline: &'c Pipeline, input: SynthesisUnit<'c>) -> Result<(), PipelineError> {
        if !pipeline.opts.emit_plans {
            return Ok(());
        }
        let textual_pass =
            RecordTextualPass::new(SymbolEnvironment::new(input.compilation, input.published));
        // Without queries this is every record of the compilation.
        for selection in select(pipeline, input)? {
            match selection {
                Selection::Record(record) => {
                    let doc = textual_pass.visit_record(record);
                    pipeline.emit(RecordTextualPass::format_doc_to_string(doc));
                }
                Selection::Members(members) => {
                    for member in members {
                        let doc = textual_pass.visit_member(member);
                        pipeline.emit(RecordTextualPass::format_doc_to_string(doc));
                    }
                }
            }
        }
        Ok(())
    }
}
