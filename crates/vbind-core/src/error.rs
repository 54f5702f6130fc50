use thiserror::Error;

use crate::dep::SubscriberId;
use crate::path::Path;

pub type Result<T> = std::result::Result<T, BindError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("mount selector matched no element: {selector}")]
    InvalidMountSelector { selector: String },

    #[error("data path `{path}` is missing key `{missing}`")]
    MissingDataPath { path: Path, missing: String },

    #[error("dependency collection for {requested} started while {active} is collecting")]
    ReentrantCollection {
        active: SubscriberId,
        requested: SubscriberId,
    },

    #[error("no reactive property at `{path}`")]
    UnknownProperty { path: Path },

    #[error("invalid component options: {message}")]
    InvalidOptions { message: String },
}

impl BindError {
    #[must_use]
    pub fn missing(path: &Path, missing: impl Into<String>) -> Self {
        Self::MissingDataPath {
            path: path.clone(),
            missing: missing.into(),
        }
    }

    #[must_use]
    pub fn unknown(path: impl Into<Path>) -> Self {
        Self::UnknownProperty { path: path.into() }
    }

    #[must_use]
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Internal invariant violations, as opposed to failures caused by
    /// template or data content.
    #[must_use]
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::ReentrantCollection { .. })
    }
}
