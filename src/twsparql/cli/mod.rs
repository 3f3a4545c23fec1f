//! # CLI Layer
//!
//! The command-line client around the twsparql library. This is the only place that:
//! - parses shell arguments (clap)
//! - prints the usage text
//! - decides exit codes
//!
//! ## Reporting
//!
//! Validation failures (bad options, configuration problems, an output file that cannot
//! be created, a missing input file) print the usage text to **stdout**, preceded by the
//! error line, and exit with 1. Engine and write failures print `Error: ...` to stderr and
//! exit with 1. Success exits with 0.
//!
//! ## Structure
//!
//! - `setup`: clap definition and conversion into [`twsparql::Options`]
//! - `commands`: `run()`, the whole invocation from argv to exit code
//! - `print`: usage text and error reporting

mod commands;
mod print;
mod setup;

pub use commands::run;
