//! # Execution Dispatcher
//!
//! Given an [`Invocation`], configures the engine, builds the render payload for the
//! selected [`RunMode`], renders it once and writes the result to the output sink.
//!
//! - `FileInput`: the payload is the file content, byte for byte, in whatever encoding
//!   the document uses
//! - `InlineQuery`: the payload is one `<sparql query=".." xslt=".." uri=".."/>` element
//!
//! There is no retry and no partial-write recovery. Whatever happens after the sink has
//! been opened, it is released exactly once before the result is returned.

use crate::config::ResolvedConfig;
use crate::error::{Result, TwsError};
use crate::resolver::{Invocation, RunMode};
use crate::sink::OutputSink;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use twsparql_engine::Engine;

/// Pushes the resolved configuration into the engine. Debug goes first so the engine's
/// diagnostics cover the remaining setup.
pub fn prepare_engine<E: Engine + ?Sized>(engine: &mut E, config: &ResolvedConfig) {
    engine.enable_debug(config.debug_enabled);
    engine.set_ibase(&config.engine_base);
    engine.set_sbase(&config.schema_base);
    engine.set_xslt_path(&config.xslt_path);
    engine.set_query_path(&config.query_path);
    engine.set_endpoint(&config.endpoint);
}

/// Synthesizes the single marker element for an inline query.
///
/// Values are inserted verbatim; a value containing `"` yields a broken marker.
pub fn marker_payload(query: &str, xslt_uri: &str, instance_uri: &str) -> String {
    format!(r#"<sparql query="{query}" xslt="{xslt_uri}" uri="{instance_uri}"/>"#)
}

/// Builds the render payload for `mode`.
pub fn build_payload(mode: &RunMode) -> Result<Vec<u8>> {
    match mode {
        RunMode::FileInput { path } => read_input(path),
        RunMode::InlineQuery {
            query,
            xslt_uri,
            instance_uri,
        } => Ok(marker_payload(query, xslt_uri, instance_uri).into_bytes()),
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(TwsError::InputNotFound(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| TwsError::InputUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders `mode` and writes the output to `sink`, then releases the sink.
///
/// The sink is consumed: it is closed on success and on every failure.
pub fn dispatch<E, W>(engine: &E, mode: &RunMode, mut sink: OutputSink<W>) -> Result<()>
where
    E: Engine + ?Sized,
    W: Write,
{
    let written = render_into(engine, mode, &mut sink);
    let closed = sink.close();
    written?;
    closed.map_err(TwsError::from)
}

fn render_into<E, W>(engine: &E, mode: &RunMode, sink: &mut OutputSink<W>) -> Result<()>
where
    E: Engine + ?Sized,
    W: Write,
{
    let payload = build_payload(mode)?;
    debug!(bytes = payload.len(), "payload built");

    let rendered = engine.render(None, &payload)?;
    sink.write_output(&rendered)?;
    debug!(bytes = rendered.len(), "output written");
    Ok(())
}

/// Runs a resolved invocation end to end: engine setup, sink acquisition, dispatch.
pub fn run<E: Engine + ?Sized>(engine: &mut E, invocation: &Invocation) -> Result<()> {
    prepare_engine(engine, &invocation.config);
    let sink = OutputSink::open(invocation.output.as_deref())?;
    dispatch(&*engine, &invocation.mode, sink)
}
