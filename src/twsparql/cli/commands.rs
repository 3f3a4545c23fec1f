use super::print::{print_usage, report_error};
use super::setup::Cli;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use tracing::debug;
use twsparql::engine::MarkerEngine;
use twsparql::logging::init_logging;
use twsparql::{dispatch, resolver, Options, Result, TwsError};

const DEFAULT_PROGRAM: &str = "twsparql";

/// Runs one invocation from raw arguments (program name first) and returns the exit code.
pub fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let program = program_name(&args);

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            let _ = e.print();
            return 0;
        }
        Err(e) => {
            let err = TwsError::InvalidOptions(parse_failure_reason(&e));
            return report_error(&program, &err);
        }
    };

    if cli.help {
        print_usage(&program, None);
        return 0;
    }

    let options = Options::from(cli);
    init_logging(options.enable_debug);

    match execute(&options) {
        Ok(()) => 0,
        Err(err) => {
            debug!(error = %err, class = ?err.class(), "run failed");
            report_error(&program, &err)
        }
    }
}

fn execute(options: &Options) -> Result<()> {
    let invocation = resolver::resolve(options)?;
    let mut engine = MarkerEngine::new();
    dispatch::run(&mut engine, &invocation)
}

fn program_name(args: &[OsString]) -> String {
    args.first()
        .map(|arg| arg.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string())
}

/// First line of clap's message, without its `error: ` prefix.
fn parse_failure_reason(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}
