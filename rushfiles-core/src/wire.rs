use serde::{Deserialize, Serialize, Serializer};
use url::Url;

/// Journal event code carried by every mutating request. The RushFiles
/// service logs each mutation as a client journal event of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalEventType {
    Create,
    Delete,
    Update,
    Move,
}

impl JournalEventType {
    pub fn code(self) -> u8 {
        match self {
            JournalEventType::Create => 0,
            JournalEventType::Delete => 1,
            JournalEventType::Update => 3,
            JournalEventType::Move => 16,
        }
    }
}

impl Serialize for JournalEventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Remote attribute bitmask values.
pub mod attributes {
    pub const DIRECTORY: u32 = 16;
    pub const ARCHIVE: u32 = 32;
    pub const NORMAL: u32 = 128;
}

/// One virtual-file record as the service returns it. `ParrentId` is the
/// service's own spelling, not ours.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RfVirtualFile {
    #[serde(default)]
    pub internal_name: String,
    #[serde(default)]
    pub upload_name: Option<String>,
    #[serde(default)]
    pub share_id: Option<String>,
    #[serde(default)]
    pub parrent_id: Option<String>,
    pub public_name: String,
    #[serde(default)]
    pub is_file: bool,
    #[serde(default)]
    pub end_of_file: u64,
    #[serde(default)]
    pub tick: u64,
    #[serde(default)]
    pub creation_time: String,
    #[serde(default)]
    pub last_access_time: String,
    #[serde(default)]
    pub last_write_time: String,
    #[serde(default)]
    pub attributes: u32,
}

/// Request-side partial record. `internal_name` is omitted entirely when
/// creating a new entity; the service assigns one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VirtualFilePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_name: Option<String>,
    pub share_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parrent_id: Option<String>,
    pub end_of_file: u64,
    pub tick: u64,
    pub public_name: String,
    pub creation_time: String,
    pub last_access_time: String,
    pub last_write_time: String,
    pub attributes: u32,
}

/// Full mutation envelope: proposed record, fresh transmit id, event tag,
/// device id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JournalEventRequest {
    pub rf_virtual_file: VirtualFilePayload,
    pub transmit_id: String,
    pub client_journal_event_type: JournalEventType,
    pub device_id: String,
}

/// Body of a DELETE: no record, only the event identification fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TombstoneRequest {
    pub transmit_id: String,
    pub client_journal_event_type: JournalEventType,
    pub device_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloneRequest {
    pub destination_parent_id: String,
    pub device_id: String,
    pub destination_share_id: String,
}

/// Mutation responses wrap the resulting record in a journal-event container
/// under `Data`, alongside an upload URL when a binary phase follows.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JournalEventResponse {
    pub data: JournalEventData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JournalEventData {
    pub client_journal_event: ClientJournalEvent,
    #[serde(default)]
    pub url: Option<Url>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientJournalEvent {
    pub rf_virtual_file: RfVirtualFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListResponse {
    pub data: Vec<RfVirtualFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct EntityResponse {
    pub data: RfVirtualFile,
}

/// History entries arrive wrapped one level deeper than listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct HistoryResponse {
    pub data: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct HistoryEntry {
    pub file: RfVirtualFile,
}
