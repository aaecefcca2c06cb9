use std::path::PathBuf;

/// Failure of a call against the remote object store.
///
/// `RefNotFound` and `RefAlreadyExists` are expected conditions during
/// branch bootstrap and are recovered there; every other variant is fatal
/// to the publish attempt that hit it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("ref not found: {0}")]
    RefNotFound(String),

    #[error("ref already exists: {0}")]
    RefAlreadyExists(String),

    /// The store rejected the request (authorization, quota, validation).
    #[error("store rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure reaching the store.
    #[error("store transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Failure enumerating the local build root.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("not found: {0}")]
    NotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("io error under {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Terminal failure of a publish attempt.
///
/// Callers never see this raised; the publish entrypoint folds it into the
/// `failure_reason` of its result.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("walking local root failed: {0}")]
    Walk(#[from] WalkError),

    #[error("object store call failed while {step}: {source}")]
    Store {
        step: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{failed} of {walked} files failed to upload")]
    PartialUpload { walked: usize, failed: usize },
}

impl PublishError {
    pub fn store(step: &'static str, source: StoreError) -> Self {
        Self::Store { step, source }
    }
}
