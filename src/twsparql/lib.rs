//! # twsparql Architecture
//!
//! twsparql renders documents that embed SPARQL rendering markers. It either takes an
//! existing document (`--input`) or synthesizes a one-marker document from
//! `--query`/`--xslt`/`--uri`, hands it to a rendering engine and writes the result to a
//! file or to stdout.
//!
//! The interesting part is deciding whether a run can proceed at all, and in which mode.
//! Query execution and transformation belong to the engine, which this crate only talks
//! to through the [`twsparql_engine::Engine`] trait.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints usage, maps errors to exits     │
//! │  - The ONLY place that knows about exit codes               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Option Resolver (resolver.rs, config.rs)                   │
//! │  - Validates option combinations                            │
//! │  - Loads the INI file, merges the endpoint override         │
//! │  - Returns an Invocation: ResolvedConfig + RunMode          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Execution Dispatcher (dispatch.rs, sink.rs)                │
//! │  - Configures the engine, opens the OutputSink              │
//! │  - Builds the payload, renders once, writes, releases       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (twsparql-engine crate)                             │
//! │  - Engine trait, MarkerEngine default implementation        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Explicit Ownership
//!
//! Nothing here is global. Each run owns its `ResolvedConfig`, its `RunMode`, its
//! `OutputSink` and its engine. The engine is passed into the dispatcher rather than
//! fetched from a shared accessor, and the output sink is a value that is consumed when
//! it is closed.
//!
//! ## Testing Strategy
//!
//! 1. **Resolver / config**: unit tests over `Options` and temp files
//! 2. **Dispatcher**: a recording engine checks setter order and the exact payload;
//!    a tracked writer checks the sink is released once on every path
//! 3. **CLI**: end-to-end tests in `tests/` run the binary with `assert_cmd`
//!
//! ## Module Overview
//!
//! - [`options`]: raw option set
//! - [`config`]: INI parsing, required keys, [`config::ResolvedConfig`]
//! - [`resolver`]: validation sequence, [`resolver::RunMode`]
//! - [`dispatch`]: engine setup, payload construction, rendering
//! - [`sink`]: [`sink::OutputSink`]
//! - [`error`]: error taxonomy
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod options;
pub mod resolver;
pub mod sink;

pub use config::ResolvedConfig;
pub use error::{ErrorClass, Result, TwsError};
pub use options::Options;
pub use resolver::{Invocation, RunMode};
pub use sink::OutputSink;
pub use twsparql_engine as engine;
