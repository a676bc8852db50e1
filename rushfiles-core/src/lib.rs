mod client;
mod wire;

pub use client::{ByteStream, CoreError, RushFilesClient, ShareConfig, new_transmit_id};
pub use wire::{
    ClientJournalEvent, CloneRequest, JournalEventData, JournalEventRequest, JournalEventResponse,
    JournalEventType, RfVirtualFile, TombstoneRequest, VirtualFilePayload, attributes,
};
