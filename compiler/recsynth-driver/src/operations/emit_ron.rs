use crate::operations::select::{select, Selection};
use crate::pipeline::{EmitError, Pipeline, PipelineError, PipelineOperation, SynthesisUnit};
use ron::ser::PrettyConfig;
use serde::Serialize;

/// Operation for emitting the synthesis output as RON.
pub struct RonEmitOperation;

impl RonEmitOperation {
    fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<String, EmitError> {
        ron::ser::to_string_pretty(value, PrettyConfig::default()).map_err(|e| EmitError {
            what: "ron",
            message: e.to_string(),
        })
    }
}

impl<'c> PipelineOperation<'c, SynthesisUnit<'c>, ()> for RonEmitOperation {
    fn execute(pipeline: &'c Pipeline, input: SynthesisUnit<'c>) -> Result<(), PipelineError> {
        if !pipeline.opts.emit_ron {
            return Ok(());
        }
        if pipeline.queries.is_empty() {
            pipeline.emit(Self::serialize(input.output)?);
            return Ok(());
        }
        for selection in select(pipeline, input)? {
            let document = match selection {
                Selection::Record(record) => Self::serialize(record)?,
                Selection::Members(members) => Self::serialize(&members)?,
            };
            pipeline.emit(document);
        }
        Ok(())
    }
}
