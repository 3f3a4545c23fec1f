//! # Option Resolver
//!
//! Turns a raw [`Options`] set into an [`Invocation`]: the resolved configuration plus the
//! selected [`RunMode`]. Every check is a hard gate and the first failure wins:
//!
//! 1. either `--input`, or both `--query` and `--xslt`, must be given
//! 2. `--config` must be given and name an existing file
//! 3. the file must define every required key (missing keys reported together)
//! 4. `--endpoint` overrides the file's endpoint
//!
//! Opening `--output` is the next gate, handled by [`crate::sink::OutputSink::open`] once
//! resolution has succeeded. The resolver itself never touches the output path.
//!
//! `--uri` is deliberately not part of gate 1. A missing `--uri` renders an empty `uri`
//! attribute, which keeps command lines written for earlier releases working.

use crate::config::{ConfigFile, ResolvedConfig};
use crate::error::{Result, TwsError};
use crate::options::Options;
use std::path::PathBuf;
use tracing::{debug, warn};

/// How the render payload is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// The payload is the literal content of a document with embedded markers.
    FileInput { path: PathBuf },
    /// The payload is a single marker synthesized from the command line.
    InlineQuery {
        query: String,
        xslt_uri: String,
        instance_uri: String,
    },
}

/// Everything the dispatcher needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config: ResolvedConfig,
    pub mode: RunMode,
    pub output: Option<PathBuf>,
}

/// Picks the run mode. `--input` always wins over the inline triple.
pub fn select_mode(opts: &Options) -> Result<RunMode> {
    if let Some(path) = &opts.input {
        return Ok(RunMode::FileInput { path: path.clone() });
    }

    match (&opts.query, &opts.xslt) {
        (Some(query), Some(xslt)) => {
            if opts.uri.is_none() {
                warn!("no --uri given; rendering with an empty instance uri");
            }
            Ok(RunMode::InlineQuery {
                query: query.clone(),
                xslt_uri: xslt.clone(),
                instance_uri: opts.uri.clone().unwrap_or_default(),
            })
        }
        _ => Err(TwsError::MissingQueryOrXslt),
    }
}

/// Runs the validation sequence and merges configuration with overrides.
pub fn resolve(opts: &Options) -> Result<Invocation> {
    let mode = select_mode(opts)?;

    let config_path = opts.config.as_ref().ok_or(TwsError::MissingConfig)?;
    let file = ConfigFile::load(config_path)?;
    let config = file.resolve(opts.endpoint.as_deref(), opts.enable_debug)?;

    debug!(
        config = %config_path.display(),
        endpoint = %config.endpoint,
        ?mode,
        "options resolved"
    );

    Ok(Invocation {
        config,
        mode,
        output: opts.output.clone(),
    })
}
