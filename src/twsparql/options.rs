use std::path::PathBuf;

/// The raw option set of one invocation, before any validation.
///
/// Built by the CLI from parsed arguments; library callers and tests construct it
/// directly. Nothing here has been checked yet, that is the resolver's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub query: Option<String>,
    pub xslt: Option<String>,
    pub uri: Option<String>,
    pub endpoint: Option<String>,
    pub enable_debug: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Sets the inline query triple. Passing `None` for `uri` mirrors a command line
    /// that omits `--uri`.
    pub fn with_query(
        mut self,
        query: impl Into<String>,
        xslt: impl Into<String>,
        uri: Option<&str>,
    ) -> Self {
        self.query = Some(query.into());
        self.xslt = Some(xslt.into());
        self.uri = uri.map(str::to_string);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.enable_debug = enabled;
        self
    }
}
