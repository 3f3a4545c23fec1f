use colored::Colorize;
use std::io::{self, Write};
use twsparql::logging::LOG_FILE;
use twsparql::TwsError;

const OPTIONS: &[(&str, &str)] = &[
    ("--config=<config_file>", "contains variable definitions"),
    ("--input=<input_file>", "input file containing sparql tags"),
    ("--output=<output_file>", "file to write xhtml output to"),
    ("--query=<query_uri>", "URI of query file"),
    ("--xslt=<xslt_uri>", "URI of xslt file"),
    ("--uri=<instance_uri>", "instance or schema URI"),
    (
        "--endpoint=<endpoint_uri>",
        "SPARQL endpoint, overrides the configuration file",
    ),
];

const NOTES: &[&str] = &[
    "can specify more than one query, uri, and xslt - first query goes with first uri goes with first xslt",
    "specify an input file instead of query, xslt, and uri",
    "if no output file is specified, output written to STDOUT",
];

/// Builds the usage text. `error`, when given, is shown right under the program name.
pub(super) fn usage_text(program: &str, error: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(program);
    out.push('\n');
    if let Some(error) = error {
        out.push_str(&format!("  {}\n", error.trim_end()));
    }
    out.push('\n');

    out.push_str("OPTIONS:\n");
    for (flag, about) in OPTIONS {
        out.push_str(&format!("  {flag} - {about}\n"));
    }
    out.push_str(&format!(
        "  --enable-debug - status and warning written to ./{LOG_FILE}\n"
    ));

    out.push('\n');
    out.push_str("NOTES:\n");
    for note in NOTES {
        out.push_str(&format!("  {note}\n"));
    }
    out
}

/// Usage goes to stdout, also on failure.
pub(super) fn print_usage(program: &str, error: Option<&str>) {
    let mut stdout = io::stdout().lock();
    let _ = stdout.write_all(usage_text(program, error).as_bytes());
    let _ = stdout.flush();
}

/// Reports `err` in the format its class calls for and returns the exit code.
pub(super) fn report_error(program: &str, err: &TwsError) -> i32 {
    if err.shows_usage() {
        print_usage(program, Some(&err.to_string()));
    } else {
        eprintln!("{} {}", "Error:".red().bold(), err);
    }
    err.exit_code()
}
