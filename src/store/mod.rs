//! File store - the vault's file tree as seen by the processor
//!
//! Paths are vault-relative and `/`-separated. The empty path is the vault
//! root.

mod local;
#[cfg(test)]
pub(crate) mod memory;

pub use local::LocalStore;

use std::io;

/// A node of the file tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File { path: String, name: String },
    Folder { path: String },
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::File { path, .. } | Entry::Folder { path } => path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Entry::Folder { .. })
    }
}

/// Operations the processor needs from the host file tree
pub trait FileStore: Send + Sync {
    /// Look up a file or folder
    fn get(&self, path: &str) -> Option<Entry>;

    /// Direct children of a folder
    fn list_children(&self, folder: &str) -> io::Result<Vec<Entry>>;

    /// Whether anything exists at `path`
    fn exists(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Create a folder and any missing parents. Succeeds if the folder exists.
    fn create_folder(&self, path: &str) -> io::Result<()>;

    /// Move a file. Fails if the target's parent folder is missing or the
    /// target is occupied.
    fn rename(&self, from: &str, to: &str) -> io::Result<()>;

    /// Every folder below the root, depth-first
    fn folders(&self) -> Vec<String>;
}

/// Join path segments with `/`, skipping empty ones
pub fn join_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parent folder of a path (the root for top-level entries)
pub fn parent_path(path: &str) -> &str {
    path.rfind('/').map(|i| &path[..i]).unwrap_or("")
}

/// Last segment of a path
pub fn file_name(path: &str) -> &str {
    path.rfind('/').map(|i| &path[i + 1..]).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(["Archive", "2024/03", "a.pdf"]), "Archive/2024/03/a.pdf");
        assert_eq!(join_path(["", "2024", "a.pdf"]), "2024/a.pdf");
        assert_eq!(join_path(["Archive/", "a.pdf"]), "Archive/a.pdf");
        assert_eq!(join_path([""]), "");
    }

    #[test]
    fn test_parent_and_name() {
        assert_eq!(parent_path("Inbox/a.pdf"), "Inbox");
        assert_eq!(parent_path("a.pdf"), "");
        assert_eq!(file_name("Inbox/sub/a.pdf"), "a.pdf");
        assert_eq!(file_name("a.pdf"), "a.pdf");
    }
}
