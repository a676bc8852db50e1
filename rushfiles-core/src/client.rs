use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::{Client, StatusCode, header};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::wire::{
    CloneRequest, EntityResponse, HistoryResponse, JournalEventData, JournalEventRequest,
    JournalEventResponse, JournalEventType, ListResponse, RfVirtualFile, TombstoneRequest,
    VirtualFilePayload,
};

/// Streaming download body.
pub type ByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("virtual file not found")]
    NotFound,
}

/// Per-share connection settings. The device id identifies this client
/// installation in the share's journal; it is configuration, not a global.
#[derive(Debug, Clone)]
pub struct ShareConfig {
    pub share_id: String,
    pub domain: String,
    pub token: String,
    pub device_id: String,
}

/// Client for the two RushFiles hosts serving one share: the clientgateway
/// (listings, lookups, history) and the filecache (content and mutations).
#[derive(Clone)]
pub struct RushFilesClient {
    http: Client,
    gateway_base: Url,
    filecache_base: Url,
    share_id: String,
    token: String,
    device_id: String,
}

impl RushFilesClient {
    pub fn new(config: ShareConfig) -> Result<Self, CoreError> {
        let gateway = format!("https://clientgateway.{}", config.domain);
        let filecache = format!("https://filecache01.{}", config.domain);
        Self::with_base_urls(&gateway, &filecache, config)
    }

    pub fn with_base_urls(
        gateway_base: &str,
        filecache_base: &str,
        config: ShareConfig,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            http: Client::new(),
            gateway_base: Url::parse(gateway_base)?,
            filecache_base: Url::parse(filecache_base)?,
            share_id: config.share_id,
            token: config.token,
            device_id: config.device_id,
        })
    }

    pub fn share_id(&self) -> &str {
        &self.share_id
    }

    /// List the direct children of a folder identifier. 404 means the
    /// identifier is unknown to the share.
    pub async fn list_children(&self, id: &str) -> Result<Vec<RfVirtualFile>, CoreError> {
        let url = self.gateway_url(&["virtualfiles", id, "children"])?;
        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, self.auth_header_value())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::NotFound);
        }
        let payload: ListResponse = Self::expect_json(response, &[StatusCode::OK]).await?;
        Ok(payload.data)
    }

    pub async fn get_virtual_file(&self, id: &str) -> Result<RfVirtualFile, CoreError> {
        let url = self.gateway_url(&["virtualfiles", id])?;
        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, self.auth_header_value())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::NotFound);
        }
        let payload: EntityResponse = Self::expect_json(response, &[StatusCode::OK]).await?;
        Ok(payload.data)
    }

    /// Revision history, ordered by tick as the service returns it.
    pub async fn file_history(&self, id: &str) -> Result<Vec<RfVirtualFile>, CoreError> {
        let url = self.gateway_url(&["virtualfiles", id, "history"])?;
        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, self.auth_header_value())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::NotFound);
        }
        let payload: HistoryResponse = Self::expect_json(response, &[StatusCode::OK]).await?;
        Ok(payload.data.into_iter().map(|entry| entry.file).collect())
    }

    pub async fn create_file(
        &self,
        payload: VirtualFilePayload,
    ) -> Result<JournalEventData, CoreError> {
        let url = self.filecache_url(&["files"])?;
        let body = self.envelope(payload, JournalEventType::Create);
        let response = self
            .http
            .post(url)
            .header(header::AUTHORIZATION, self.auth_header_value())
            .json(&body)
            .send()
            .await?;
        let payload: JournalEventResponse =
            Self::expect_json(response, &[StatusCode::OK, StatusCode::ACCEPTED]).await?;
        Ok(payload.data)
    }

    pub async fn update_file(
        &self,
        id: &str,
        payload: VirtualFilePayload,
    ) -> Result<JournalEventData, CoreError> {
        let url = self.filecache_url(&["files", id])?;
        let body = self.envelope(payload, JournalEventType::Update);
        let response = self
            .http
            .put(url)
            .header(header::AUTHORIZATION, self.auth_header_value())
            .json(&body)
            .send()
            .await?;
        let payload: JournalEventResponse =
            Self::expect_json(response, &[StatusCode::OK, StatusCode::ACCEPTED]).await?;
        Ok(payload.data)
    }

    /// Move/rename keeps the internal identifier; only parent and public
    /// name change. The service accepts this only as a plain 200.
    pub async fn move_file(
        &self,
        id: &str,
        payload: VirtualFilePayload,
    ) -> Result<JournalEventData, CoreError> {
        let url = self.filecache_url(&["files", id])?;
        let body = self.envelope(payload, JournalEventType::Move);
        let response = self
            .http
            .put(url)
            .header(header::AUTHORIZATION, self.auth_header_value())
            .json(&body)
            .send()
            .await?;
        let payload: JournalEventResponse =
            Self::expect_json(response, &[StatusCode::OK]).await?;
        Ok(payload.data)
    }

    /// Delete is idempotent-friendly: the service answers 400 or 404 for an
    /// identifier that is already gone, and both map to `NotFound`.
    pub async fn delete_file(&self, id: &str) -> Result<(), CoreError> {
        let url = self.filecache_url(&["files", id])?;
        let body = TombstoneRequest {
            transmit_id: new_transmit_id(),
            client_journal_event_type: JournalEventType::Delete,
            device_id: self.device_id.clone(),
        };
        let response = self
            .http
            .delete(url)
            .header(header::AUTHORIZATION, self.auth_header_value())
            .json(&body)
            .send()
            .await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => Err(CoreError::NotFound),
            status => Err(CoreError::Api {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Clone a file's content into a destination parent. The endpoint does
    /// not take a destination name; the service picks one.
    pub async fn clone_file(
        &self,
        id: &str,
        destination_parent_id: &str,
        destination_share_id: &str,
    ) -> Result<JournalEventData, CoreError> {
        let url = self.filecache_url(&["files", id, "clone"])?;
        let body = CloneRequest {
            destination_parent_id: destination_parent_id.to_string(),
            device_id: self.device_id.clone(),
            destination_share_id: destination_share_id.to_string(),
        };
        let response = self
            .http
            .post(url)
            .header(header::AUTHORIZATION, self.auth_header_value())
            .json(&body)
            .send()
            .await?;
        let payload: JournalEventResponse =
            Self::expect_json(response, &[StatusCode::CREATED]).await?;
        Ok(payload.data)
    }

    /// One bounded window of an upload, expressed as a byte-range write
    /// against the URL the create/update response handed back. Returns the
    /// raw body; only the final chunk's body carries the journal event.
    pub async fn write_chunk(
        &self,
        upload_url: &Url,
        offset: u64,
        chunk: Bytes,
    ) -> Result<Bytes, CoreError> {
        debug_assert!(!chunk.is_empty());
        let end = offset + chunk.len() as u64 - 1;
        let response = self
            .http
            .put(upload_url.clone())
            .header(header::AUTHORIZATION, self.auth_header_value())
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(header::CONTENT_RANGE, format!("bytes {offset}-{end}/*"))
            .header(header::CONTENT_LENGTH, chunk.len())
            .body(chunk)
            .send()
            .await?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => {
                Ok(response.bytes().await?)
            }
            status => Err(CoreError::Api {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Stream a file's content by its upload name (the content address),
    /// optionally restricted to an inclusive byte range.
    pub async fn download(
        &self,
        upload_name: &str,
        range: Option<(u64, u64)>,
    ) -> Result<ByteStream, CoreError> {
        let url = self.filecache_url(&["files", upload_name])?;
        let mut request = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, self.auth_header_value());
        if let Some((start, end)) = range {
            request = request.header(header::RANGE, format!("bytes={start}-{end}"));
        }
        let response = request.send().await?;
        match response.status() {
            StatusCode::OK | StatusCode::PARTIAL_CONTENT => Ok(response.bytes_stream().boxed()),
            status => Err(CoreError::Api {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    fn envelope(
        &self,
        payload: VirtualFilePayload,
        event: JournalEventType,
    ) -> JournalEventRequest {
        JournalEventRequest {
            rf_virtual_file: payload,
            transmit_id: new_transmit_id(),
            client_journal_event_type: event,
            device_id: self.device_id.clone(),
        }
    }

    fn auth_header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn gateway_url(&self, segments: &[&str]) -> Result<Url, CoreError> {
        Self::shares_url(&self.gateway_base, &self.share_id, segments)
    }

    fn filecache_url(&self, segments: &[&str]) -> Result<Url, CoreError> {
        Self::shares_url(&self.filecache_base, &self.share_id, segments)
    }

    fn shares_url(base: &Url, share_id: &str, segments: &[&str]) -> Result<Url, CoreError> {
        let mut path = format!("api/shares/{share_id}");
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        Ok(base.join(&path)?)
    }

    async fn expect_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        accepted: &[StatusCode],
    ) -> Result<T, CoreError> {
        if accepted.contains(&response.status()) {
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(CoreError::Api { status, body })
        }
    }
}

/// Fresh transmission identifier for one mutating request. The service wants
/// a UUID with the hyphens stripped; never reused across requests.
pub fn new_transmit_id() -> String {
    Uuid::new_v4().simple().to_string()
}
