//! # twsparql-engine - Marker Rendering Collaborator
//!
//! The rendering side of twsparql. The command-line front end decides *what* to render;
//! this crate owns *how* a payload becomes output.
//!
//! ## The Problem
//!
//! Documents carry embedded rendering requests written as self-closing marker elements:
//!
//! ```text
//! <p>Recent publications:</p>
//! <sparql query="publications.rq" xslt="publications.xsl" uri="person/42"/>
//! ```
//!
//! Each marker names a query resource, a transform resource and an instance (or schema)
//! URI. All three are usually relative: they only become meaningful once combined with
//! the base paths and the query endpoint from the run configuration.
//!
//! ## The Solution
//!
//! The [`Engine`] trait is the seam between the front end and any rendering backend:
//!
//! - **Configuration** is pushed in through setters (`set_ibase`, `set_endpoint`, ...)
//!   once per run, with `enable_debug` applied before anything else
//! - **Rendering** is a single call, [`Engine::render`], taking an optional
//!   [`RenderContext`] and the raw payload bytes, returning the complete output
//!
//! [`MarkerEngine`] is the implementation shipped with the binary. It is resolution-only:
//! it executes no queries and applies no transforms. Text outside markers passes through
//! untouched, and every marker is rewritten into a fully resolved request element:
//!
//! ```text
//! <sparql-request endpoint="http://localhost:8890/sparql"
//!                 query="/srv/queries/publications.rq"
//!                 xslt="/srv/xslt/publications.xsl"
//!                 uri="http://example.org/instances/person/42"/>
//! ```
//!
//! ## Quick Example
//!
//! ```rust
//! use twsparql_engine::{Engine, MarkerEngine};
//!
//! let mut engine = MarkerEngine::new();
//! engine.set_ibase("http://example.org/instances/");
//! engine.set_sbase("http://example.org/schema#");
//! engine.set_query_path("/srv/queries");
//! engine.set_xslt_path("/srv/xslt");
//! engine.set_endpoint("http://localhost:8890/sparql");
//!
//! let output = engine
//!     .render(None, br#"<sparql query="q.rq" xslt="t.xsl" uri="p1"/>"#)
//!     .unwrap();
//! let output = String::from_utf8(output).unwrap();
//! assert!(output.contains(r#"query="/srv/queries/q.rq""#));
//! assert!(output.contains(r#"uri="http://example.org/instances/p1""#));
//! ```
//!
//! ## Reference Resolution
//!
//! - `query` / `xslt`: joined onto the query / xslt base path, unless already absolute
//!   (`/...`) or carrying a scheme (`...://...`)
//! - `uri`: `schema:<name>` is joined onto the schema base, other relative values onto the
//!   instance base, values with a scheme are kept. An absent or empty `uri` falls back to
//!   [`RenderContext::instance_uri`]
//!
//! Payloads are bytes, not text: documents in any ASCII-compatible encoding pass through
//! unchanged. Attribute values are copied verbatim. Nothing is escaped, so values
//! containing quote characters produce broken output.

use thiserror::Error;
use tracing::debug;

/// Element name of an embedded rendering request.
pub const MARKER_TAG: &str = "sparql";

/// Element name emitted for every resolved marker.
pub const REQUEST_TAG: &str = "sparql-request";

/// Prefix selecting the schema base instead of the instance base.
pub const SCHEMA_PREFIX: &str = "schema:";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("<sparql> marker at byte {0} is not closed with '/>'")]
    UnclosedMarker(usize),

    #[error("<sparql> marker at byte {offset} has no {attribute} attribute")]
    MissingAttribute {
        offset: usize,
        attribute: &'static str,
    },

    #[error("malformed attribute in <sparql> marker at byte {0}")]
    MalformedAttribute(usize),

    #[error("no query endpoint configured")]
    NoEndpoint,
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Optional per-render context.
///
/// The command-line front end always renders without one; library callers embedding the
/// engine can use it to supply a default instance for markers that omit `uri`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub instance_uri: Option<String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instance used by markers without a `uri` attribute.
    pub fn with_instance_uri(mut self, uri: impl Into<String>) -> Self {
        self.instance_uri = Some(uri.into());
        self
    }
}

/// A rendering backend.
///
/// Implementations are configured once per run and then asked to render exactly one
/// payload. Callers are expected to call `enable_debug` before the other setters so
/// that diagnostics cover configuration as well.
pub trait Engine {
    fn enable_debug(&mut self, enabled: bool);
    fn set_ibase(&mut self, ibase: &str);
    fn set_sbase(&mut self, sbase: &str);
    fn set_xslt_path(&mut self, xslt_path: &str);
    fn set_query_path(&mut self, query_path: &str);
    fn set_endpoint(&mut self, endpoint: &str);

    /// Renders `payload`, returning the complete output.
    fn render(&self, context: Option<&RenderContext>, payload: &[u8]) -> Result<Vec<u8>>;
}

/// Resolution-only engine: rewrites `<sparql/>` markers into resolved request elements.
#[derive(Debug, Clone, Default)]
pub struct MarkerEngine {
    debug: bool,
    ibase: String,
    sbase: String,
    xslt_path: String,
    query_path: String,
    endpoint: String,
}

impl MarkerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn resolve(
        &self,
        marker: &Marker<'_>,
        context: Option<&RenderContext>,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let query = marker.query.ok_or(EngineError::MissingAttribute {
            offset: marker.offset,
            attribute: "query",
        })?;
        let xslt = marker.xslt.ok_or(EngineError::MissingAttribute {
            offset: marker.offset,
            attribute: "xslt",
        })?;
        let instance = marker
            .uri
            .filter(|uri| !uri.is_empty())
            .or_else(|| context.and_then(|c| c.instance_uri.as_deref()).map(str::as_bytes))
            .unwrap_or_default();

        let query = join_base(&self.query_path, query);
        let xslt = join_base(&self.xslt_path, xslt);
        let uri = self.resolve_instance(instance);

        if self.debug {
            debug!(
                offset = marker.offset,
                query = %String::from_utf8_lossy(&query),
                xslt = %String::from_utf8_lossy(&xslt),
                uri = %String::from_utf8_lossy(&uri),
                "resolved marker"
            );
        }

        out.extend_from_slice(b"<");
        out.extend_from_slice(REQUEST_TAG.as_bytes());
        push_attribute(out, "endpoint", self.endpoint.as_bytes());
        push_attribute(out, "query", &query);
        push_attribute(out, "xslt", &xslt);
        push_attribute(out, "uri", &uri);
        out.extend_from_slice(b"/>");
        Ok(())
    }

    fn resolve_instance(&self, uri: &[u8]) -> Vec<u8> {
        if uri.is_empty() || has_scheme(uri) {
            return uri.to_vec();
        }
        match uri.strip_prefix(SCHEMA_PREFIX.as_bytes()) {
            Some(name) => join_base(&self.sbase, name),
            None => join_base(&self.ibase, uri),
        }
    }
}

impl Engine for MarkerEngine {
    fn enable_debug(&mut self, enabled: bool) {
        self.debug = enabled;
        if enabled {
            debug!("engine debug output enabled");
        }
    }

    fn set_ibase(&mut self, ibase: &str) {
        self.ibase = ibase.to_string();
    }

    fn set_sbase(&mut self, sbase: &str) {
        self.sbase = sbase.to_string();
    }

    fn set_xslt_path(&mut self, xslt_path: &str) {
        self.xslt_path = xslt_path.to_string();
    }

    fn set_query_path(&mut self, query_path: &str) {
        self.query_path = query_path.to_string();
    }

    fn set_endpoint(&mut self, endpoint: &str) {
        self.endpoint = endpoint.to_string();
    }

    fn render(&self, context: Option<&RenderContext>, payload: &[u8]) -> Result<Vec<u8>> {
        if self.endpoint.is_empty() {
            return Err(EngineError::NoEndpoint);
        }
        if self.debug {
            debug!(bytes = payload.len(), endpoint = %self.endpoint, "rendering payload");
        }

        let mut output = Vec::with_capacity(payload.len());
        let mut cursor = 0;
        let mut markers = 0usize;

        while let Some(start) = find_marker(payload, cursor) {
            output.extend_from_slice(&payload[cursor..start]);
            let (marker, end) = parse_marker(payload, start)?;
            self.resolve(&marker, context, &mut output)?;
            cursor = end;
            markers += 1;
        }
        output.extend_from_slice(&payload[cursor..]);

        if self.debug {
            debug!(markers, "render complete");
        }
        Ok(output)
    }
}

/// Attributes of one parsed marker. Unknown attributes are dropped.
#[derive(Debug, Default)]
struct Marker<'a> {
    offset: usize,
    query: Option<&'a [u8]>,
    xslt: Option<&'a [u8]>,
    uri: Option<&'a [u8]>,
}

/// Finds the next `<sparql` opening tag at or after `from`.
///
/// The tag name must be followed by whitespace or `/`, so `<sparql-request` and similar
/// names are not treated as markers.
fn find_marker(payload: &[u8], from: usize) -> Option<usize> {
    let open = [b"<", MARKER_TAG.as_bytes()].concat();
    let mut pos = from;
    while let Some(idx) = payload[pos..]
        .windows(open.len())
        .position(|window| window == open.as_slice())
    {
        let start = pos + idx;
        if matches!(
            payload.get(start + open.len()),
            Some(b) if b.is_ascii_whitespace() || *b == b'/'
        ) {
            return Some(start);
        }
        pos = start + 1;
    }
    None
}

/// Parses the marker starting at `start`, returning it with the byte offset just past
/// its closing `/>`.
fn parse_marker(bytes: &[u8], start: usize) -> Result<(Marker<'_>, usize)> {
    let mut marker = Marker {
        offset: start,
        ..Marker::default()
    };
    let mut pos = start + MARKER_TAG.len() + 1;

    loop {
        pos = skip_whitespace(bytes, pos);
        match bytes.get(pos) {
            None | Some(b'>') => return Err(EngineError::UnclosedMarker(start)),
            Some(b'/') => {
                return if bytes.get(pos + 1) == Some(&b'>') {
                    Ok((marker, pos + 2))
                } else {
                    Err(EngineError::UnclosedMarker(start))
                };
            }
            Some(_) => {}
        }

        let name_start = pos;
        while let Some(b) = bytes.get(pos) {
            if b.is_ascii_whitespace() || matches!(b, b'=' | b'/' | b'>') {
                break;
            }
            pos += 1;
        }
        let name = &bytes[name_start..pos];

        pos = skip_whitespace(bytes, pos);
        if bytes.get(pos) != Some(&b'=') {
            return Err(EngineError::MalformedAttribute(start));
        }
        pos = skip_whitespace(bytes, pos + 1);

        let quote = match bytes.get(pos) {
            Some(q @ (b'"' | b'\'')) => *q,
            _ => return Err(EngineError::MalformedAttribute(start)),
        };
        let value_start = pos + 1;
        let value_len = bytes[value_start..]
            .iter()
            .position(|b| *b == quote)
            .ok_or(EngineError::UnclosedMarker(start))?;
        let value = &bytes[value_start..value_start + value_len];
        pos = value_start + value_len + 1;

        match name {
            b"query" => marker.query = Some(value),
            b"xslt" => marker.xslt = Some(value),
            b"uri" => marker.uri = Some(value),
            _ => {}
        }
    }
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

fn has_scheme(reference: &[u8]) -> bool {
    reference.windows(3).any(|window| window == b"://")
}

fn join_base(base: &str, reference: &[u8]) -> Vec<u8> {
    if base.is_empty() || reference.starts_with(b"/") || has_scheme(reference) {
        return reference.to_vec();
    }
    let mut joined = Vec::with_capacity(base.len() + reference.len() + 1);
    joined.extend_from_slice(base.as_bytes());
    if !(base.ends_with('/') || base.ends_with('#')) {
        joined.push(b'/');
    }
    joined.extend_from_slice(reference);
    joined
}

fn push_attribute(out: &mut Vec<u8>, name: &str, value: &[u8]) {
    out.push(b' ');
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b"=\"");
    out.extend_from_slice(value);
    out.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> MarkerEngine {
        let mut engine = MarkerEngine::new();
        engine.set_ibase("http://example.org/instances/");
        engine.set_sbase("http://example.org/schema#");
        engine.set_query_path("/srv/queries");
        engine.set_xslt_path("/srv/xslt/");
        engine.set_endpoint("http://localhost:8890/sparql");
        engine
    }

    fn render(
        engine: &MarkerEngine,
        context: Option<&RenderContext>,
        payload: &str,
    ) -> Result<String> {
        engine
            .render(context, payload.as_bytes())
            .map(|out| String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_payload_without_markers_passes_through() {
        let engine = configured();
        let payload = "<html>\n  <body>héllo &amp; <sparql-request/></body>\n</html>\n";
        assert_eq!(render(&engine, None, payload).unwrap(), payload);
    }

    #[test]
    fn test_marker_is_resolved() {
        let engine = configured();
        let output = render(
            &engine,
            None,
            r#"<p><sparql query="q.rq" xslt="t.xsl" uri="p1"/></p>"#,
        )
        .unwrap();
        assert_eq!(
            output,
            "<p><sparql-request endpoint=\"http://localhost:8890/sparql\" \
             query=\"/srv/queries/q.rq\" xslt=\"/srv/xslt/t.xsl\" \
             uri=\"http://example.org/instances/p1\"/></p>"
        );
    }

    #[test]
    fn test_absolute_references_are_kept() {
        let engine = configured();
        let output = render(
            &engine,
            None,
            r#"<sparql query="/abs/q.rq" xslt="http://x.org/t.xsl" uri="http://y.org/i"/>"#,
        )
        .unwrap();
        assert!(output.contains(r#"query="/abs/q.rq""#));
        assert!(output.contains(r#"xslt="http://x.org/t.xsl""#));
        assert!(output.contains(r#"uri="http://y.org/i""#));
    }

    #[test]
    fn test_schema_prefix_uses_schema_base() {
        let engine = configured();
        let output =
            render(&engine, None, r#"<sparql query="q" xslt="x" uri="schema:Person"/>"#).unwrap();
        assert!(output.contains(r#"uri="http://example.org/schema#Person""#));
    }

    #[test]
    fn test_context_supplies_missing_uri() {
        let engine = configured();
        let context = RenderContext::new().with_instance_uri("p7");
        let output =
            render(&engine, Some(&context), r#"<sparql query='q' xslt='x' uri=''/>"#).unwrap();
        assert!(output.contains(r#"uri="http://example.org/instances/p7""#));
    }

    #[test]
    fn test_empty_uri_without_context_stays_empty() {
        let engine = configured();
        let output = render(&engine, None, r#"<sparql query="q" xslt="x" uri=""/>"#).unwrap();
        assert!(output.ends_with(r#"uri=""/>"#));
    }

    #[test]
    fn test_multiple_markers_and_surrounding_text() {
        let engine = configured();
        let output = render(
            &engine,
            None,
            "a <sparql query=\"1\" xslt=\"x\"/> b <sparql\n  query=\"2\"\n  xslt=\"x\" /> c",
        )
        .unwrap();
        assert!(output.starts_with("a <sparql-request"));
        assert!(output.contains(r#"query="/srv/queries/1""#));
        assert!(output.contains(r#"query="/srv/queries/2""#));
        assert!(output.ends_with("/> c"));
        assert_eq!(output.matches(REQUEST_TAG).count(), 2);
    }

    #[test]
    fn test_missing_query_reports_offset() {
        let engine = configured();
        let err = render(&engine, None, r#"xx<sparql xslt="x"/>"#).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingAttribute {
                offset: 2,
                attribute: "query"
            }
        );
    }

    #[test]
    fn test_unclosed_marker() {
        let engine = configured();
        assert_eq!(
            render(&engine, None, r#"<sparql query="q" xslt="x">"#),
            Err(EngineError::UnclosedMarker(0))
        );
        assert_eq!(
            render(&engine, None, r#"<sparql query="q"#),
            Err(EngineError::UnclosedMarker(0))
        );
    }

    #[test]
    fn test_malformed_attribute() {
        let engine = configured();
        assert_eq!(
            render(&engine, None, "<sparql query=q/>"),
            Err(EngineError::MalformedAttribute(0))
        );
    }

    #[test]
    fn test_render_requires_endpoint() {
        let engine = MarkerEngine::new();
        assert_eq!(render(&engine, None, "text"), Err(EngineError::NoEndpoint));
    }

    #[test]
    fn test_non_utf8_text_passes_through() {
        let engine = configured();
        let payload = b"<p>caf\xe9</p><sparql query=\"q\" xslt=\"x\" uri=\"\xfc\"/>\xa9";
        let output = engine.render(None, payload).unwrap();
        assert!(output.starts_with(b"<p>caf\xe9</p><sparql-request "));
        assert!(output.ends_with(b" uri=\"http://example.org/instances/\xfc\"/>\xa9"));
    }

    #[test]
    fn test_debug_render_resolves_the_same() {
        let mut engine = configured();
        engine.enable_debug(true);
        let output = render(&engine, None, r#"<sparql query="q" xslt="x" uri="p"/>"#).unwrap();
        assert!(output.contains(r#"uri="http://example.org/instances/p""#));
    }

    #[test]
    fn test_join_base() {
        assert_eq!(join_base("/a", b"b"), b"/a/b");
        assert_eq!(join_base("/a/", b"b"), b"/a/b");
        assert_eq!(join_base("", b"b"), b"b");
        assert_eq!(join_base("/a", b"/b"), b"/b");
    }
}
