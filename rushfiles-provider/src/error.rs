use rushfiles_core::CoreError;
use thiserror::Error;

/// One typed error per failed operation, keeping the path or identifier
/// context. 404 is collapsed into `NotFound` wherever absence is an expected
/// outcome; no operation retries on its own.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("metadata request failed: {0}")]
    Metadata(CoreError),
    #[error("upload failed at offset {offset}: {source}")]
    Upload { source: CoreError, offset: u64 },
    #[error("upload source ended at offset {offset} before declared size {declared}")]
    UploadTruncated { offset: u64, declared: u64 },
    #[error("upload source longer than declared size {declared}")]
    UploadOverrun { declared: u64 },
    #[error("upload source read failed at offset {offset}: {source}")]
    UploadRead {
        source: std::io::Error,
        offset: u64,
    },
    #[error("upload response decode failed: {0}")]
    UploadDecode(serde_json::Error),
    #[error("upload accepted but no upload url returned")]
    UploadUrlMissing,
    #[error("delete failed: {0}")]
    Delete(CoreError),
    #[error("root cannot be deleted")]
    RootDelete,
    #[error("move failed: {0}")]
    IntraMove(CoreError),
    #[error("copy failed: {0}")]
    IntraCopy(CoreError),
    #[error("create folder failed: {0}")]
    CreateFolder(CoreError),
    #[error("folder naming conflict: {0}")]
    NamingConflict(String),
    #[error("revisions request failed: {0}")]
    Revisions(CoreError),
    #[error("download failed: {0}")]
    Download(CoreError),
    #[error("{0} has no content address")]
    MissingUploadName(String),
    #[error("{0} is not a file")]
    NotAFile(String),
    #[error("{0} is not a folder")]
    NotAFolder(String),
    #[error("time format error: {0}")]
    Time(#[from] time::error::Format),
}
