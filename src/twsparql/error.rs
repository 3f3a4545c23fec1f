use std::path::PathBuf;
use thiserror::Error;
use twsparql_engine::EngineError;

#[derive(Error, Debug)]
pub enum TwsError {
    #[error("No configuration file specified: {0}")]
    InvalidOptions(String),

    #[error("Must specify query and xslt if no input file specified")]
    MissingQueryOrXslt,

    #[error("Must specify a configuration file")]
    MissingConfig,

    #[error("configuration file {} does not exist", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("configuration file {} could not be read: {source}", path.display())]
    ConfigUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration file {} is malformed at line {line}: {content}", path.display())]
    ConfigMalformed {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error(
        "configuration file {} is missing options or options invalid: {}",
        path.display(),
        missing.join(", ")
    )]
    ConfigMissingKeys {
        path: PathBuf,
        missing: Vec<&'static str>,
    },

    #[error("could not create output file {}: {source}", path.display())]
    OutputOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("input file {} does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("input file {} could not be read: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`TwsError`], used by the CLI to pick a report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Usage,
    ConfigFile,
    OutputOpen,
    Engine,
    Io,
}

impl TwsError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidOptions(_)
            | Self::MissingQueryOrXslt
            | Self::MissingConfig
            | Self::InputNotFound(_)
            | Self::InputUnreadable { .. } => ErrorClass::Usage,
            Self::ConfigNotFound(_)
            | Self::ConfigUnreadable { .. }
            | Self::ConfigMalformed { .. }
            | Self::ConfigMissingKeys { .. } => ErrorClass::ConfigFile,
            Self::OutputOpen { .. } => ErrorClass::OutputOpen,
            Self::Engine(_) => ErrorClass::Engine,
            Self::Io(_) => ErrorClass::Io,
        }
    }

    /// Validation failures are reported together with the program usage text.
    pub fn shows_usage(&self) -> bool {
        !matches!(self.class(), ErrorClass::Engine | ErrorClass::Io)
    }

    /// Every failure terminates the process with status 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, TwsError>;
