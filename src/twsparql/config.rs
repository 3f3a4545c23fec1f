//! # Run Configuration
//!
//! twsparql reads its run parameters from an INI-style file named by `--config`:
//!
//! ```text
//! ; site.ini
//! [paths]
//! iBase     = http://example.org/instances/
//! sBase     = http://example.org/schema#
//! xsltPath  = /srv/twsparql/xslt
//! queryPath = /srv/twsparql/queries
//!
//! [service]
//! endpoint  = "http://localhost:8890/sparql"
//! ```
//!
//! Section headers are ignored: every key lands in one flat map and later duplicates win.
//! Values may be wrapped in matching single or double quotes. Lines starting with `;`
//! or `#` are comments, and an unquoted value ends at the first `;`:
//!
//! ```text
//! endpoint = http://localhost:8890/sparql ; staging
//! ```
//!
//! All of [`REQUIRED_KEYS`] must be present with a non-empty value. Missing keys are
//! collected and reported together rather than one at a time.

use crate::error::{Result, TwsError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Keys every configuration file must define, in reporting order.
pub const REQUIRED_KEYS: [&str; 5] = ["iBase", "sBase", "xsltPath", "queryPath", "endpoint"];

/// The merged, validated run parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub engine_base: String,
    pub schema_base: String,
    pub xslt_path: String,
    pub query_path: String,
    pub endpoint: String,
    pub debug_enabled: bool,
}

/// A parsed configuration file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl ConfigFile {
    /// Loads and parses the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TwsError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| TwsError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Parses INI text. `path` is only used for error reporting.
    pub fn parse<P: AsRef<Path>>(path: P, content: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut values = HashMap::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(TwsError::ConfigMalformed {
                    path,
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(TwsError::ConfigMalformed {
                    path,
                    line: idx + 1,
                    content: line.to_string(),
                });
            }
            values.insert(key.to_string(), parse_value(value).to_string());
        }

        Ok(Self { path, values })
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Required keys that are absent or empty, in [`REQUIRED_KEYS`] order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| self.get(key).is_none_or(str::is_empty))
            .collect()
    }

    /// Merges the file with command-line overrides.
    ///
    /// A non-empty `endpoint_override` replaces the file's `endpoint`. The file must still
    /// define `endpoint` itself.
    pub fn resolve(&self, endpoint_override: Option<&str>, debug: bool) -> Result<ResolvedConfig> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(TwsError::ConfigMissingKeys {
                path: self.path.clone(),
                missing,
            });
        }

        let value = |key: &str| self.get(key).unwrap_or_default().to_string();
        let endpoint = endpoint_override
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| value("endpoint"));

        Ok(ResolvedConfig {
            engine_base: value("iBase"),
            schema_base: value("sBase"),
            xslt_path: value("xsltPath"),
            query_path: value("queryPath"),
            endpoint,
            debug_enabled: debug,
        })
    }
}

/// Quoted values run to the closing quote. Unquoted values stop at an inline `;` comment.
fn parse_value(raw: &str) -> &str {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.find(quote).map(|end| &rest[..end]))
        {
            return inner;
        }
    }
    match raw.split_once(';') {
        Some((value, _comment)) => value.trim_end(),
        None => raw,
    }
}
