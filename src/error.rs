use thiserror::Error;

use crate::model::tree::TreeError;

/// Problems caught before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{name} is at level {level}; subfolders can only be added above level {max}")]
    DepthLimit { name: String, level: u32, max: u32 },

    #[error("a {parent_kind} cannot hold a new {child_kind}")]
    WrongParent {
        parent_kind: &'static str,
        child_kind: &'static str,
    },

    #[error("name cannot be empty")]
    EmptyName,

    #[error("the course root cannot be deleted")]
    CourseDelete,

    #[error("transcripts cannot be uploaded to a {0}")]
    UploadTarget(&'static str),

    #[error("{0} already has transcript segments; delete them before uploading again")]
    SegmentsPresent(String),

    #[error("{0}: only .srt and .vtt transcripts are accepted")]
    TranscriptExtension(String),

    #[error("file not found: {0}")]
    MissingFile(String),

    #[error("no node with id {0} in the current tree")]
    UnknownNode(String),
}

/// Failures talking to the remote content store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Non-success HTTP status; `detail` is the server's message verbatim.
    #[error("{detail}")]
    Remote { status: u16, detail: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("store returned a malformed tree: {0}")]
    MalformedTree(#[from] TreeError),
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{action} succeeded but the refresh failed: {source}")]
    RefreshFailed {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("another request is still running")]
    Busy,

    #[error("no course is open")]
    NoCourse,
}
