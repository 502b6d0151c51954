use crate::operations::select::{select, Selection};
use crate::pipeline::{Pipeline, PipelineError, PipelineOperation, SynthesisUnit};
use recsynth_records::textual_pass::RecordTextualPass;
use recsynth_records::SymbolEnvironment;

/// Operation for emitting the signatures of the synthesized members.
pub struct MembersEmitOperation;

impl<'c> PipelineOperation<'c, SynthesisUnit<'c>, ()> for MembersEmitOperation {
    fn execute(pipeline: &'c Pipeline, input: SynthesisUnit<'c>) -> Result<(), PipelineError> {
        if !pipeline.opts.emit_members {
            return Ok(());
        }
        let textual_pass =
            RecordTextualPass::new(SymbolEnvironment::new(input.compilation, input.published));
        for selection in select(pipeline, input)? {
            match selection {
                Selection::Record(record) => {
                    let doc = textual_pass.visit_signatures(record);
                    pipeline.emit(RecordTextualPass::format_doc_to_string(doc));
                }
                Selection::Members(members) => {
                    for member in members {
                        let doc = textual_pass.visit_signature(member);
                        pipeline.emit(RecordTextualPass::format_doc_to_string(doc));
                    }
                }
            }
        }
        Ok(())
    }
}
