use rushfiles_core::RfVirtualFile;

use crate::path::RfPath;

/// One remote entity, addressable by its resolved path. Files and folders
/// share the identification and timestamp fields; files add content size and
/// the upload name (content address), folders a lazily-populated child list.
#[derive(Debug, Clone)]
pub enum Entity {
    File(FileEntity),
    Folder(FolderEntity),
}

#[derive(Debug, Clone)]
pub struct FileEntity {
    pub name: String,
    pub id: String,
    pub parent_id: Option<String>,
    pub size: u64,
    pub upload_name: Option<String>,
    pub created: String,
    pub accessed: String,
    pub modified: String,
    pub attributes: u32,
    pub tick: u64,
    path: RfPath,
}

#[derive(Debug, Clone)]
pub struct FolderEntity {
    pub name: String,
    pub id: String,
    pub parent_id: Option<String>,
    pub created: String,
    pub accessed: String,
    pub modified: String,
    pub attributes: u32,
    pub tick: u64,
    pub children: Vec<Entity>,
    path: RfPath,
}

impl FileEntity {
    pub fn from_record(record: &RfVirtualFile, path: RfPath) -> Self {
        Self {
            name: record.public_name.clone(),
            id: record.internal_name.clone(),
            parent_id: record.parrent_id.clone(),
            size: record.end_of_file,
            upload_name: record.upload_name.clone(),
            created: record.creation_time.clone(),
            accessed: record.last_access_time.clone(),
            modified: record.last_write_time.clone(),
            attributes: record.attributes,
            tick: record.tick,
            path,
        }
    }

    pub fn path(&self) -> &RfPath {
        &self.path
    }
}

impl FolderEntity {
    pub fn from_record(record: &RfVirtualFile, path: RfPath) -> Self {
        Self {
            name: record.public_name.clone(),
            id: record.internal_name.clone(),
            parent_id: record.parrent_id.clone(),
            created: record.creation_time.clone(),
            accessed: record.last_access_time.clone(),
            modified: record.last_write_time.clone(),
            attributes: record.attributes,
            tick: record.tick,
            children: Vec::new(),
            path,
        }
    }

    pub fn path(&self) -> &RfPath {
        &self.path
    }
}

impl Entity {
    pub fn from_record(record: &RfVirtualFile, path: RfPath) -> Self {
        if record.is_file {
            Entity::File(FileEntity::from_record(record, path))
        } else {
            Entity::Folder(FolderEntity::from_record(record, path))
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::File(file) => &file.name,
            Entity::Folder(folder) => &folder.name,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::File(file) => &file.id,
            Entity::Folder(folder) => &folder.id,
        }
    }

    pub fn path(&self) -> &RfPath {
        match self {
            Entity::File(file) => file.path(),
            Entity::Folder(folder) => folder.path(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entity::File(_))
    }
}

/// Map a folder listing, deriving each child's path from the parent so every
/// child entity is independently addressable.
pub fn map_children(records: &[RfVirtualFile], parent: &RfPath) -> Vec<Entity> {
    records
        .iter()
        .map(|record| {
            let path = parent.child(
                &record.public_name,
                Some(record.internal_name.clone()),
                !record.is_file,
            );
            Entity::from_record(record, path)
        })
        .collect()
}

/// An immutable historical snapshot of a file, keyed by its version tick.
#[derive(Debug, Clone)]
pub struct Revision {
    pub tick: u64,
    pub name: String,
    pub size: u64,
    pub modified: String,
    pub upload_name: Option<String>,
}

impl Revision {
    pub fn from_record(record: &RfVirtualFile) -> Self {
        Self {
            tick: record.tick,
            name: record.public_name.clone(),
            size: record.end_of_file,
            modified: record.last_write_time.clone(),
            upload_name: record.upload_name.clone(),
        }
    }
}

pub fn map_revisions(records: &[RfVirtualFile]) -> Vec<Revision> {
    records.iter().map(Revision::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, id: &str, is_file: bool) -> RfVirtualFile {
        serde_json::from_value(serde_json::json!({
            "InternalName": id,
            "PublicName": name,
            "IsFile": is_file,
            "EndOfFile": if is_file { 10 } else { 0 },
            "Tick": 3,
            "LastWriteTime": "2026-02-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn kind_dispatch_happens_at_construction() {
        let parent = RfPath::root("root1");
        let file = Entity::from_record(&record("a.txt", "id-a", true), parent.child("a.txt", Some("id-a".into()), false));
        let folder = Entity::from_record(&record("b", "id-b", false), parent.child("b", Some("id-b".into()), true));
        assert!(file.is_file());
        assert!(!folder.is_file());
        assert_eq!(file.id(), "id-a");
        assert_eq!(folder.name(), "b");
    }

    #[test]
    fn children_derive_addressable_paths() {
        let parent = RfPath::root("root1").child("docs", Some("id-docs".into()), true);
        let records = vec![record("a.txt", "id-a", true), record("sub", "id-sub", false)];
        let children = map_children(&records, &parent);

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].path().to_string(), "/docs/a.txt");
        assert_eq!(children[0].path().identifier(), Some("id-a"));
        assert_eq!(children[1].path().to_string(), "/docs/sub/");
        assert!(children[1].path().is_folder());
    }

    #[test]
    fn revisions_keep_tick_order() {
        let records = vec![record("a.txt", "id-a", true), record("a.txt", "id-a", true)];
        let revisions = map_revisions(&records);
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[0].tick, 3);
        assert_eq!(revisions[0].size, 10);
    }
}
