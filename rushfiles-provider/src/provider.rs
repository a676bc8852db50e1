use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use percent_encoding::percent_decode_str;
use rushfiles_core::{
    ByteStream, CoreError, JournalEventResponse, RfVirtualFile, RushFilesClient,
    VirtualFilePayload, attributes,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::error::ProviderError;
use crate::metadata::{Entity, FileEntity, FolderEntity, Revision, map_children, map_revisions};
use crate::path::RfPath;

/// Upper bound on one binary write. The filecache rejects larger request
/// bodies, so uploads are windowed at this size.
pub const CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// A seekable-read byte source with a declared total size. The declared size
/// is authoritative for chunk planning; a source whose readable length
/// differs fails the upload.
pub struct UploadSource<R> {
    reader: R,
    size: u64,
}

impl<R: AsyncRead + Send + Unpin> UploadSource<R> {
    pub fn new(reader: R, size: u64) -> Self {
        Self { reader, size }
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl UploadSource<std::io::Cursor<Vec<u8>>> {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self::new(std::io::Cursor::new(data), size)
    }
}

/// Path-addressed file operations over one RushFiles share. All calls within
/// one operation run strictly sequentially; paths are re-resolved by the
/// caller before mutations, and nothing is cached across operations.
pub struct RushFilesProvider {
    client: RushFilesClient,
    chunk_size: u64,
}

impl RushFilesProvider {
    pub fn new(client: RushFilesClient) -> Self {
        Self::with_chunk_size(client, CHUNK_SIZE)
    }

    pub fn with_chunk_size(client: RushFilesClient, chunk_size: u64) -> Self {
        Self {
            client,
            chunk_size: chunk_size.max(1),
        }
    }

    fn share_id(&self) -> &str {
        self.client.share_id()
    }

    /// Walk a raw slash-separated path from the share root, resolving each
    /// segment against a children listing. A trailing slash means the caller
    /// expects a folder. The terminal segment may come back unresolved,
    /// which signals "does not exist yet"; a missing non-terminal segment is
    /// not-found for the whole path. A terminal hit of the wrong kind is
    /// reported as not-found, not as a type conflict: from the caller's side
    /// files and folders share one namespace.
    pub async fn resolve(&self, raw: &str) -> Result<RfPath, ProviderError> {
        if raw == "/" || raw.is_empty() {
            return Ok(RfPath::root(self.share_id()));
        }
        let expect_folder = raw.ends_with('/');
        let names: Vec<String> = raw
            .trim_matches('/')
            .split('/')
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
            .collect();

        let mut path = RfPath::root(self.share_id());
        let mut current_id = self.share_id().to_string();
        for (i, name) in names.iter().enumerate() {
            let last = i == names.len() - 1;
            let children = self.list_children_of(&current_id, raw).await?;
            match children.iter().find(|record| record.public_name == *name) {
                Some(record) => {
                    if last && record.is_file == expect_folder {
                        return Err(ProviderError::NotFound(raw.to_string()));
                    }
                    current_id = record.internal_name.clone();
                    let folder = if last { expect_folder } else { true };
                    path = path.child(name, Some(record.internal_name.clone()), folder);
                }
                None if last => {
                    path = path.child(name, None, expect_folder);
                }
                None => return Err(ProviderError::NotFound(raw.to_string())),
            }
        }
        Ok(path)
    }

    /// Resolve and require that the target already exists.
    pub async fn validate(&self, raw: &str) -> Result<RfPath, ProviderError> {
        let path = self.resolve(raw).await?;
        if path.identifier().is_none() {
            return Err(ProviderError::NotFound(path.to_string()));
        }
        Ok(path)
    }

    /// Resolve one child name directly under an already-known parent,
    /// applying the same match and kind rules as the full walk.
    pub async fn resolve_child(
        &self,
        base: &RfPath,
        name: &str,
        folder: Option<bool>,
    ) -> Result<RfPath, ProviderError> {
        let parent_id = base
            .identifier()
            .ok_or_else(|| ProviderError::NotFound(base.to_string()))?;
        let children = self.list_children_of(parent_id, name).await?;
        match children.iter().find(|record| record.public_name == name) {
            Some(record) => {
                if let Some(folder) = folder {
                    if record.is_file == folder {
                        return Err(ProviderError::NotFound(name.to_string()));
                    }
                }
                Ok(base.child(
                    name,
                    Some(record.internal_name.clone()),
                    folder.unwrap_or(!record.is_file),
                ))
            }
            None => Ok(base.child(name, None, folder.unwrap_or(false))),
        }
    }

    /// Children of a folder path, each mapped with its own derived path.
    pub async fn list(&self, path: &RfPath) -> Result<Vec<Entity>, ProviderError> {
        let id = path
            .identifier()
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))?;
        let records = self.list_children_of(id, &path.to_string()).await?;
        Ok(map_children(&records, path))
    }

    /// Current metadata of a file, or a historical snapshot when a revision
    /// tick is given. A tick absent from the history is not-found.
    pub async fn file_metadata(
        &self,
        path: &RfPath,
        revision: Option<&str>,
    ) -> Result<FileEntity, ProviderError> {
        let id = path
            .identifier()
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))?;
        match revision {
            Some(revision) => {
                let history = self.client.file_history(id).await.map_err(|err| match err {
                    CoreError::NotFound => ProviderError::NotFound(path.to_string()),
                    other => ProviderError::Metadata(other),
                })?;
                let record = history
                    .iter()
                    .find(|record| record.tick.to_string() == revision)
                    .ok_or_else(|| ProviderError::NotFound(path.to_string()))?;
                Ok(FileEntity::from_record(record, path.clone()))
            }
            None => {
                let record = self.fetch_record(path).await?;
                Ok(FileEntity::from_record(&record, path.clone()))
            }
        }
    }

    pub async fn revisions(&self, path: &RfPath) -> Result<Vec<Revision>, ProviderError> {
        let id = path
            .identifier()
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))?;
        let history = self
            .client
            .file_history(id)
            .await
            .map_err(ProviderError::Revisions)?;
        Ok(map_revisions(&history))
    }

    pub async fn create_folder(&self, path: &RfPath) -> Result<FolderEntity, ProviderError> {
        if !path.is_folder() {
            return Err(ProviderError::NotAFolder(path.to_string()));
        }
        if path.identifier().is_some() {
            return Err(ProviderError::NamingConflict(path.name().to_string()));
        }
        debug!(path = %path, "creating folder");
        let now = timestamp_now()?;
        let payload = VirtualFilePayload {
            internal_name: None,
            share_id: self.share_id().to_string(),
            parrent_id: path.parent_identifier().map(str::to_string),
            end_of_file: 0,
            tick: 0,
            public_name: path.name().to_string(),
            creation_time: now.clone(),
            last_access_time: now.clone(),
            last_write_time: now,
            attributes: attributes::DIRECTORY,
        };
        let data = self
            .client
            .create_file(payload)
            .await
            .map_err(ProviderError::CreateFolder)?;
        let record = data.client_journal_event.rf_virtual_file;
        let result_path = path
            .parent()
            .child(&record.public_name, Some(record.internal_name.clone()), true);
        Ok(FolderEntity::from_record(&record, result_path))
    }

    /// Upload a byte source to a path, creating the entity when the terminal
    /// identifier is absent and updating it otherwise. Returns the resulting
    /// metadata and whether the entity was created.
    pub async fn upload<R>(
        &self,
        mut source: UploadSource<R>,
        path: &RfPath,
    ) -> Result<(FileEntity, bool), ProviderError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let created = path.identifier().is_none();
        debug!(path = %path, size = source.size, created, "uploading");
        let now = timestamp_now()?;
        let creation_time = if created {
            now.clone()
        } else {
            // Updates keep the original creation stamp.
            self.fetch_record(path).await?.creation_time
        };
        let payload = VirtualFilePayload {
            internal_name: path.identifier().map(str::to_string),
            share_id: self.share_id().to_string(),
            parrent_id: path.parent_identifier().map(str::to_string),
            end_of_file: source.size,
            tick: 0,
            public_name: path.name().to_string(),
            creation_time,
            last_access_time: now.clone(),
            last_write_time: now,
            attributes: attributes::NORMAL,
        };
        let data = match path.identifier() {
            None => self.client.create_file(payload).await,
            Some(id) => self.client.update_file(id, payload).await,
        }
        .map_err(|source| ProviderError::Upload { source, offset: 0 })?;

        // Zero-byte files are complete after the metadata phase.
        if source.size == 0 {
            let record = data.client_journal_event.rf_virtual_file;
            return Ok((self.file_entity_for(path, record), created));
        }

        let upload_url = data.url.ok_or(ProviderError::UploadUrlMissing)?;
        let mut offset = 0u64;
        let mut last_body = Bytes::new();
        while offset < source.size {
            let window = (source.size - offset).min(self.chunk_size) as usize;
            let mut buf = vec![0u8; window];
            source.reader.read_exact(&mut buf).await.map_err(|err| {
                if err.kind() == std::io::ErrorKind::UnexpectedEof {
                    ProviderError::UploadTruncated {
                        offset,
                        declared: source.size,
                    }
                } else {
                    ProviderError::UploadRead {
                        source: err,
                        offset,
                    }
                }
            })?;
            last_body = self
                .client
                .write_chunk(&upload_url, offset, Bytes::from(buf))
                .await
                .map_err(|source| ProviderError::Upload { source, offset })?;
            offset += window as u64;
        }

        // A source longer than its declared size is a protocol violation.
        let mut probe = [0u8; 1];
        match source.reader.read(&mut probe).await {
            Ok(0) => {}
            Ok(_) => {
                return Err(ProviderError::UploadOverrun {
                    declared: source.size,
                });
            }
            Err(err) => {
                return Err(ProviderError::UploadRead {
                    source: err,
                    offset,
                });
            }
        }

        // The final chunk's body is the authoritative resulting record.
        let response: JournalEventResponse =
            serde_json::from_slice(&last_body).map_err(ProviderError::UploadDecode)?;
        let record = response.data.client_journal_event.rf_virtual_file;
        Ok((self.file_entity_for(path, record), created))
    }

    /// Stream a file's content, optionally pinned to a revision tick and an
    /// inclusive byte range. Zero-size files yield an empty stream without a
    /// content call.
    pub async fn download(
        &self,
        path: &RfPath,
        revision: Option<&str>,
        range: Option<(u64, u64)>,
    ) -> Result<ByteStream, ProviderError> {
        if path.identifier().is_none() {
            return Err(ProviderError::NotFound(path.to_string()));
        }
        if path.is_folder() {
            return Err(ProviderError::NotAFile(path.to_string()));
        }
        let metadata = self.file_metadata(path, revision).await?;
        if metadata.size == 0 {
            return Ok(futures_util::stream::empty().boxed());
        }
        let upload_name = metadata
            .upload_name
            .ok_or_else(|| ProviderError::MissingUploadName(path.to_string()))?;
        self.client
            .download(&upload_name, range)
            .await
            .map_err(ProviderError::Download)
    }

    /// Delete a file, or a folder and everything under it. Folder deletion
    /// is strictly sequential and children-before-parent; a child failure
    /// propagates immediately and leaves the folder partially deleted.
    pub async fn delete(&self, path: &RfPath) -> Result<(), ProviderError> {
        if path.identifier().is_none() {
            return Err(ProviderError::NotFound(path.to_string()));
        }
        if path.is_root() {
            return Err(ProviderError::RootDelete);
        }
        debug!(path = %path, "deleting");
        if path.is_folder() {
            self.delete_folder(path).await
        } else {
            self.delete_entry(path).await
        }
    }

    fn delete_folder<'a>(&'a self, path: &'a RfPath) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            for child in self.list(path).await? {
                match child {
                    Entity::File(file) => self.delete_entry(file.path()).await?,
                    Entity::Folder(folder) => self.delete_folder(folder.path()).await?,
                }
            }
            self.delete_entry(path).await
        })
    }

    async fn delete_entry(&self, path: &RfPath) -> Result<(), ProviderError> {
        let id = path
            .identifier()
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))?;
        self.client.delete_file(id).await.map_err(|err| match err {
            CoreError::NotFound => ProviderError::NotFound(path.to_string()),
            other => ProviderError::Delete(other),
        })
    }

    /// Move or rename within the share, keeping the internal identifier. A
    /// pre-existing destination is deleted first (move overwrites). The
    /// result path is rebuilt from the destination parent and the response's
    /// name and identifier; moved folders get their children materialized,
    /// since the move does not cascade server-side.
    pub async fn intra_move(
        &self,
        src: &RfPath,
        dest: &RfPath,
    ) -> Result<(Entity, bool), ProviderError> {
        let created = dest.identifier().is_none();
        if !created {
            self.delete(dest).await?;
        }
        let src_id = src
            .identifier()
            .ok_or_else(|| ProviderError::NotFound(src.to_string()))?;
        debug!(src = %src, dest = %dest, "moving");

        let record = self.fetch_record(src).await?;
        let payload = VirtualFilePayload {
            internal_name: Some(src_id.to_string()),
            share_id: self.share_id().to_string(),
            parrent_id: dest.parent_identifier().map(str::to_string),
            end_of_file: if src.is_folder() { 0 } else { record.end_of_file },
            tick: 0,
            public_name: dest.name().to_string(),
            creation_time: record.creation_time,
            last_access_time: record.last_access_time,
            last_write_time: record.last_write_time,
            attributes: record.attributes,
        };
        let data = self
            .client
            .move_file(src_id, payload)
            .await
            .map_err(ProviderError::IntraMove)?;
        let moved = data.client_journal_event.rf_virtual_file;
        let result_path = dest.parent().child(
            &moved.public_name,
            Some(moved.internal_name.clone()),
            dest.is_folder(),
        );

        if dest.is_folder() {
            let mut folder = FolderEntity::from_record(&moved, result_path.clone());
            folder.children = self.list(&result_path).await?;
            Ok((Entity::Folder(folder), created))
        } else {
            Ok((Entity::File(FileEntity::from_record(&moved, result_path)), created))
        }
    }

    /// Copy a file within the share. The clone endpoint does not take a
    /// destination name, so when the clone lands under a different name it
    /// is moved into place as a second step.
    pub async fn intra_copy(
        &self,
        src: &RfPath,
        dest: &RfPath,
    ) -> Result<(Entity, bool), ProviderError> {
        if src.is_folder() {
            // The service clones file content only, never folder contents.
            return Err(ProviderError::NotAFile(src.to_string()));
        }
        let src_id = src
            .identifier()
            .ok_or_else(|| ProviderError::NotFound(src.to_string()))?;
        debug!(src = %src, dest = %dest, "copying");

        let mut dest = dest.clone();
        if dest.identifier().is_some() {
            self.delete(&dest).await?;
            dest = dest.parent().child(dest.name(), None, false);
        }
        let parent_id = dest
            .parent_identifier()
            .ok_or_else(|| ProviderError::NotFound(dest.parent().to_string()))?
            .to_string();

        let data = self
            .client
            .clone_file(src_id, &parent_id, self.share_id())
            .await
            .map_err(ProviderError::IntraCopy)?;
        let cloned = data.client_journal_event.rf_virtual_file;
        let clone_path = dest.parent().child(
            &cloned.public_name,
            Some(cloned.internal_name.clone()),
            false,
        );

        if cloned.public_name == dest.name() {
            // Clone landed exactly on the requested destination.
            Ok((Entity::File(FileEntity::from_record(&cloned, clone_path)), true))
        } else {
            self.intra_move(&clone_path, &dest).await
        }
    }

    async fn list_children_of(
        &self,
        id: &str,
        context: &str,
    ) -> Result<Vec<RfVirtualFile>, ProviderError> {
        self.client.list_children(id).await.map_err(|err| match err {
            CoreError::NotFound => ProviderError::NotFound(context.to_string()),
            other => ProviderError::Metadata(other),
        })
    }

    async fn fetch_record(&self, path: &RfPath) -> Result<RfVirtualFile, ProviderError> {
        let id = path
            .identifier()
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))?;
        self.client
            .get_virtual_file(id)
            .await
            .map_err(|err| match err {
                CoreError::NotFound => ProviderError::NotFound(path.to_string()),
                other => ProviderError::Metadata(other),
            })
    }

    fn file_entity_for(&self, requested: &RfPath, record: RfVirtualFile) -> FileEntity {
        let path = requested.parent().child(
            &record.public_name,
            Some(record.internal_name.clone()),
            false,
        );
        FileEntity::from_record(&record, path)
    }
}

fn timestamp_now() -> Result<String, ProviderError> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}
