use clap::Parser;
use miette::{IntoDiagnostic, NamedSource, Report, WrapErr};
use recsynth_driver::pipeline::{execute_synthesis_pipeline, PipelineError, PipelineOptions};
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[command(version, about, long_about = None)]
struct AppArgs {
    /// The RON declaration file. If this is `-`, the input is read from stdin.
    input: String,

    /// Should the signatures of the synthesized members be emitted?
    #[arg(long, default_value = "false")]
    emit_members: bool,

    /// Should the synthesized members be emitted together with their body plans?
    #[arg(long, default_value = "false")]
    emit_plans: bool,

    /// Should the synthesis output be emitted as RON?
    #[arg(long, default_value = "false")]
    emit_ron: bool,

    /// Emission queries narrowing what is emitted, e.g. `record.Point` or `member.Point.Equals`.
    #[arg(long)]
    emit_query: Vec<String>,

    /// Number of threads records are synthesized on.
    #[arg(long)]
    threads: Option<usize>,

    /// Synthesize the records one after another on the calling thread.
    #[arg(long, default_value = "false")]
    sequential: bool,
}

impl From<AppArgs> for PipelineOptions {
    fn from(args: AppArgs) -> Self {
        Self {
            emit_members: args.emit_members,
            emit_plans: args.emit_plans,
            emit_ron: args.emit_ron,
            queries: args.emit_query,
            threads: args.threads,
            sequential: args.sequential,
        }
    }
}

fn main() -> miette::Result<()> {
    let filter = EnvFilter::try_from_env("RECSYNTH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = AppArgs::parse();
    let source = match args.input.as_str() {
        "-" => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .into_diagnostic()
                .wrap_err("failed to read from stdin")?;
            source
        }
        path => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read input file {}", path))?,
    };
    let name = args.input.clone();
    let source_code = || NamedSource::new(&name, source.clone());
    let options = PipelineOptions::from(args);

    let output = execute_synthesis_pipeline(options, &source)
        .map_err(|e| Report::new(e).with_source_code(source_code()))?;
    for document in &output.documents {
        println!("{}", document);
    }
    for warning in output.warnings() {
        eprintln!("{:?}", Report::new(warning.clone()).with_source_code(source_code()));
    }
    output
        .check()
        .map_err(|e| Report::new(PipelineError::from(e)).with_source_code(source_code()))?;
    Ok(())
}
