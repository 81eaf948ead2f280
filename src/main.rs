//! ppgen CLI
//!
//! Entry point for the `ppgen` command-line tool.

use clap::Parser;
use ppgen::{PipelineError, PipelineOptions};
use std::error::Error;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ppgen")]
#[command(about = "Generate source files from templates and layered configuration", version)]
struct Cli {
    /// Config source: a file, or a directory scanned for *.config.json / *.config.lua
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Vec<PathBuf>,

    /// Schema source: a file, or a directory scanned for *.schema.json / *.schema.lua
    #[arg(long, short = 's', value_name = "PATH")]
    schema: Vec<PathBuf>,

    /// Output file (only with a single input; default strips the .in suffix)
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Write a JSON report of merged sources (with digests) and outputs
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Debug logging and full error chains
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Template files to process
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = PipelineOptions {
        config: cli.config,
        schemas: cli.schema,
        inputs: cli.inputs,
        output: cli.output,
        report: cli.report,
    };

    match ppgen::run(&options) {
        Ok(report) => {
            tracing::debug!(
                outputs = report.outputs.len(),
                schemas = report.schemas_checked,
                "run complete"
            );
        }
        Err(e) => {
            report_error(&e, cli.verbose);
            process::exit(e.exit_code());
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "ppgen=debug"
    } else {
        "ppgen=warn,ppgen::script=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn report_error(error: &PipelineError, verbose: bool) {
    if !verbose {
        let message = error.to_string();
        eprintln!("error: {}", message.lines().next().unwrap_or_default());
        return;
    }

    eprintln!("error [{}]: {}", error.kind(), error);
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}
