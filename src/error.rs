//! Error types.

use thiserror::Error;

/// A problem that withholds the whole diagram.
///
/// The `Display` text is what the error graphic shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("commit {0} is not unique")]
    DuplicateCommit(String),
    #[error("branch {0} is not unique")]
    DuplicateBranch(String),
    #[error("commit {hash} base {base} not found")]
    BaseNotFound { hash: String, base: String },
    #[error("commit {hash} merge {merge} not found")]
    MergeNotFound { hash: String, merge: String },
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("unknown option `{0}`")]
    UnknownKey(String),
    #[error("invalid value `{value}` for option `{key}`")]
    InvalidValue { key: String, value: String },
    #[error("failed to parse options file: {0}")]
    File(#[from] json5::Error),
}
