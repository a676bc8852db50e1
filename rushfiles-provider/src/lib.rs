mod error;
mod metadata;
mod path;
mod provider;

pub use error::ProviderError;
pub use metadata::{Entity, FileEntity, FolderEntity, Revision};
pub use path::RfPath;
pub use provider::{CHUNK_SIZE, RushFilesProvider, UploadSource};
