use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    name: String,
    id: Option<String>,
}

/// A slash-separated remote path with the identifier resolved for each
/// prefix. The root segment always carries the share's root identifier; the
/// terminal segment's identifier may be absent, meaning the entity does not
/// exist yet. Paths are never mutated after a request is issued against
/// them — a rename builds a new path from the parent instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfPath {
    segments: Vec<Segment>,
    folder: bool,
}

impl RfPath {
    pub fn root(share_root_id: &str) -> Self {
        Self {
            segments: vec![Segment {
                name: String::new(),
                id: Some(share_root_id.to_string()),
            }],
            folder: true,
        }
    }

    pub fn child(&self, name: &str, id: Option<String>, folder: bool) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment {
            name: name.to_string(),
            id,
        });
        Self { segments, folder }
    }

    pub fn parent(&self) -> Self {
        if self.is_root() {
            return self.clone();
        }
        Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            folder: true,
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    pub fn is_folder(&self) -> bool {
        self.folder
    }

    /// Display name of the terminal segment; empty for the root.
    pub fn name(&self) -> &str {
        &self.segments[self.segments.len() - 1].name
    }

    /// Identifier of the terminal segment, if resolved.
    pub fn identifier(&self) -> Option<&str> {
        self.segments[self.segments.len() - 1].id.as_deref()
    }

    pub fn parent_identifier(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.segments[self.segments.len() - 2].id.as_deref()
    }
}

impl fmt::Display for RfPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for segment in &self.segments[1..] {
            write!(f, "/{}", segment.name)?;
        }
        if self.folder {
            write!(f, "/")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_carries_share_root_identifier() {
        let root = RfPath::root("root1");
        assert!(root.is_root());
        assert!(root.is_folder());
        assert_eq!(root.identifier(), Some("root1"));
        assert_eq!(root.to_string(), "/");
    }

    #[test]
    fn child_tracks_parent_identifier() {
        let path = RfPath::root("root1")
            .child("docs", Some("id-docs".into()), true)
            .child("a.txt", Some("id-a".into()), false);
        assert_eq!(path.name(), "a.txt");
        assert_eq!(path.identifier(), Some("id-a"));
        assert_eq!(path.parent_identifier(), Some("id-docs"));
        assert_eq!(path.to_string(), "/docs/a.txt");
    }

    #[test]
    fn folder_path_displays_trailing_slash() {
        let path = RfPath::root("root1").child("docs", None, true);
        assert_eq!(path.to_string(), "/docs/");
        assert_eq!(path.identifier(), None);
    }

    #[test]
    fn parent_of_child_is_original() {
        let root = RfPath::root("root1");
        let child = root.child("docs", Some("id-docs".into()), true);
        assert_eq!(child.parent(), root);
        assert_eq!(root.parent(), root);
    }

    #[test]
    fn rename_rebuilds_from_parent() {
        let old = RfPath::root("root1").child("a.txt", Some("id-a".into()), false);
        let renamed = old.parent().child("b.txt", Some("id-a".into()), false);
        assert_eq!(renamed.name(), "b.txt");
        assert_eq!(renamed.identifier(), Some("id-a"));
        // The original is untouched.
        assert_eq!(old.name(), "a.txt");
    }
}
