//! Errors raised while processing the inbox
//!
//! None of these abort a run. The processor logs them, skips the affected
//! rule or file and moves on to the next one.

use thiserror::Error;

/// Per-file or per-rule failure during a run
#[derive(Debug, Error)]
pub enum ProcessError {
    /// A rule pattern failed to compile
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The configured inbox folder is not a folder in the store
    #[error("inbox folder `{0}` does not exist or is not a folder")]
    MissingInbox(String),

    /// A file already occupies the destination path
    #[error("file already exists at `{0}`")]
    Collision(String),

    /// The file store rejected a rename or folder creation
    #[error("{action} `{path}` failed: {source}")]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A dated template needs a date the file name does not carry
    #[error("could not extract date from file name `{file_name}`")]
    DateExtraction { file_name: String },
}

impl ProcessError {
    pub(crate) fn io(action: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Whether the user should hear about this beyond the log
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ProcessError::InvalidPattern { .. }
                | ProcessError::MissingInbox(_)
                | ProcessError::Collision(_)
        )
    }
}
