//! Error types for blueprint value decoding, paths and config validation.

use blueprint_source_map::Position;
use blueprint_substitutions::SubstitutionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for blueprint-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable tag identifying the kind of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorReasonCode {
    InvalidMappingNode,
    MissingMappingNode,
    MustBeScalar,
    InvalidMappingPath,
    MappingPathNotInjectable,
    MappingPathMaxDepthExceeded,
    YamlParse,
    JsonParse,
    YamlEmit,
    JsonEmit,
    Substitutions,
    InvalidConfigFieldPattern,
}

/// Errors raised by the value tree, path and schema layers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A document value that is not a sequence, mapping or scalar.
    #[error(
        "invalid mapping node{}: a value must be a scalar, a sequence or a mapping",
        at(.position)
    )]
    InvalidMappingNode { position: Option<Position> },

    /// A node holding no value was asked to be encoded.
    #[error(
        "missing mapping node{}: a value must be a scalar, fields, items or a string with substitutions",
        at(.position)
    )]
    MissingMappingNode { position: Option<Position> },

    #[error(
        "value must be a scalar{}: expected an integer, float, boolean or string",
        at(.position)
    )]
    MustBeScalar { position: Option<Position> },

    #[error("invalid mapping path {path:?}{}", reason_suffix(.reason))]
    InvalidMappingPath {
        path: String,
        reason: Option<String>,
    },

    #[error(
        "path {path:?} could not be injected into the mapping node, \
         the structure of the mapping node does not match the path"
    )]
    MappingPathNotInjectable { path: String },

    #[error(
        "path {path:?} could not be injected into the mapping node, \
         the path goes beyond the maximum depth of the node"
    )]
    MappingPathMaxDepthExceeded { path: String, max_depth: usize },

    #[error("YAML parse error{}: {message}", at(.position))]
    YamlParse {
        message: String,
        position: Option<Position>,
    },

    #[error("JSON parse error{}: {message}", at(.position))]
    JsonParse {
        message: String,
        position: Option<Position>,
    },

    #[error("failed to emit YAML: {message}")]
    YamlEmit { message: String },

    #[error("failed to emit JSON{}: {message}", at(.position))]
    JsonEmit {
        message: String,
        position: Option<Position>,
    },

    #[error(transparent)]
    Substitutions(#[from] SubstitutionError),

    /// A template field key produced a pattern that does not compile.
    #[error("invalid pattern for config field {key:?}: {message}")]
    InvalidConfigFieldPattern { key: String, message: String },
}

impl Error {
    pub fn reason_code(&self) -> ErrorReasonCode {
        match self {
            Error::InvalidMappingNode { .. } => ErrorReasonCode::InvalidMappingNode,
            Error::MissingMappingNode { .. } => ErrorReasonCode::MissingMappingNode,
            Error::MustBeScalar { .. } => ErrorReasonCode::MustBeScalar,
            Error::InvalidMappingPath { .. } => ErrorReasonCode::InvalidMappingPath,
            Error::MappingPathNotInjectable { .. } => ErrorReasonCode::MappingPathNotInjectable,
            Error::MappingPathMaxDepthExceeded { .. } => {
                ErrorReasonCode::MappingPathMaxDepthExceeded
            }
            Error::YamlParse { .. } => ErrorReasonCode::YamlParse,
            Error::JsonParse { .. } => ErrorReasonCode::JsonParse,
            Error::YamlEmit { .. } => ErrorReasonCode::YamlEmit,
            Error::JsonEmit { .. } => ErrorReasonCode::JsonEmit,
            Error::Substitutions(_) => ErrorReasonCode::Substitutions,
            Error::InvalidConfigFieldPattern { .. } => ErrorReasonCode::InvalidConfigFieldPattern,
        }
    }

    /// 1-based source position the error refers to, when known.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::InvalidMappingNode { position }
            | Error::MissingMappingNode { position }
            | Error::MustBeScalar { position }
            | Error::YamlParse { position, .. }
            | Error::JsonParse { position, .. }
            | Error::JsonEmit { position, .. } => *position,
            Error::Substitutions(err) => err.position,
            Error::InvalidMappingPath { .. }
            | Error::MappingPathNotInjectable { .. }
            | Error::MappingPathMaxDepthExceeded { .. }
            | Error::YamlEmit { .. }
            | Error::InvalidConfigFieldPattern { .. } => None,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Error::InvalidMappingPath {
            path: path.to_string(),
            reason: Some(reason.into()),
        }
    }
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        let marker = err.marker();
        Error::YamlParse {
            message: err.info().to_string(),
            position: Some(Position::new(marker.line(), marker.col() + 1)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let position = (err.line() > 0).then(|| Position::new(err.line(), err.column()));
        Error::JsonParse {
            message: err.to_string(),
            position,
        }
    }
}

fn at(position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!(" at {}", pos),
        None => String::new(),
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {}", reason),
        None => String::new(),
    }
}
