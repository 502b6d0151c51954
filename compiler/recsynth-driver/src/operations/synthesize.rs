use crate::pipeline::{Pipeline, PipelineError, PipelineOperation, ThreadPoolError};
use recsynth_records::{synthesize_compilation, SynthesisOptions, SynthesisOutput};
use recsynth_symbols::Compilation;

/// Operation for synthesizing the members of every record.
///
/// With `--threads` the records are synthesized on a dedicated pool of that size instead of the
/// global rayon pool.
pub struct SynthesizeOperation;

impl<'c> PipelineOperation<'c, &'c Compilation, SynthesisOutput> for SynthesizeOperation {
    fn execute(
        pipeline: &'c Pipeline,
        input: &'c Compilation,
    ) -> Result<SynthesisOutput, PipelineError> {
        let options = SynthesisOptions {
            parallel: !pipeline.opts.sequential,
        };
        let cancel = pipeline.cancellation_token();
        let output = match pipeline.opts.threads {
            Some(threads) if options.parallel => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| ThreadPoolError {
                        threads,
                        message: e.to_string(),
                    })?;
                pool.install(|| synthesize_compilation(input, options, cancel))?
            }
            _ => synthesize_compilation(input, options, cancel)?,
        };
        Ok(output)
    }
}
