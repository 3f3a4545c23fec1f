//! Diagnostics setup.
//!
//! Warnings always go to stderr (filter overridable through `TWSPARQL_LOG`). With
//! `--enable-debug`, a second layer appends debug events from the front end and the engine
//! to `./twsparql.log`. Stdout is never written to, it may be the output sink.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Debug log file, relative to the working directory.
pub const LOG_FILE: &str = "twsparql.log";

/// Environment variable holding the stderr filter directive.
pub const LOG_ENV: &str = "TWSPARQL_LOG";

const DEFAULT_CONSOLE_FILTER: &str = "warn";
const DEBUG_FILE_FILTER: &str = "twsparql=debug,twsparql_engine=debug";

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init_logging(debug: bool) {
    let console_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let mut file_error = None;
    let file_layer = if debug {
        match open_log_file(Path::new(LOG_FILE)) {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(EnvFilter::new(DEBUG_FILE_FILTER)),
            ),
            Err(e) => {
                file_error = Some(e);
                None
            }
        }
    } else {
        None
    };

    let installed = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .is_ok();

    if let Some(e) = file_error {
        warn!("could not open {LOG_FILE}: {e}; debug output disabled");
    }
    if installed && debug {
        tracing::debug!("debug logging enabled");
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
