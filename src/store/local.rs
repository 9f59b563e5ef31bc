//! File store backed by a vault directory on disk

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Entry, FileStore, file_name, join_path, parent_path};

/// A vault directory on the local file system.
///
/// Dot-entries (such as the host application's own configuration folder)
/// are not part of the file tree.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a vault path onto the file system, refusing to leave the vault
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            if segment == ".." {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path escapes the vault: {path}"),
                ));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }

    fn collect_folders(&self, dir: &Path, prefix: &str, result: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };

        let mut children: Vec<(String, PathBuf)> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_ok_and(|ft| ft.is_dir()))
            .filter_map(|e| {
                let name = e.file_name().into_string().ok()?;
                (!name.starts_with('.')).then(|| (name, e.path()))
            })
            .collect();
        children.sort();

        for (name, path) in children {
            let vault_path = join_path([prefix, name.as_str()]);
            result.push(vault_path.clone());
            self.collect_folders(&path, &vault_path, result);
        }
    }
}

/// Whether two paths name the same file on disk
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl FileStore for LocalStore {
    fn get(&self, path: &str) -> Option<Entry> {
        let resolved = self.resolve(path).ok()?;
        let metadata = std::fs::metadata(&resolved).ok()?;
        let path = join_path([path]);

        if metadata.is_dir() {
            Some(Entry::Folder { path })
        } else if metadata.is_file() {
            let name = file_name(&path).to_string();
            Some(Entry::File { path, name })
        } else {
            None
        }
    }

    fn list_children(&self, folder: &str) -> io::Result<Vec<Entry>> {
        let dir = self.resolve(folder)?;
        let mut children = Vec::new();

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                debug!("Skipping non UTF-8 name in {}", dir.display());
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let path = join_path([folder, name.as_str()]);
            // Follow symlinks the way the host does when it lists a folder
            let metadata = match std::fs::metadata(entry.path()) {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!("Skipping unreadable entry {}: {}", path, e);
                    continue;
                }
            };
            if metadata.is_dir() {
                children.push(Entry::Folder { path });
            } else if metadata.is_file() {
                children.push(Entry::File { path, name });
            }
        }

        children.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(children)
    }

    fn create_folder(&self, path: &str) -> io::Result<()> {
        let dir = self.resolve(path)?;
        if dir.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("a file occupies {path}"),
            ));
        }
        std::fs::create_dir_all(&dir)
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;

        if !source.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {from}"),
            ));
        }
        if !self.resolve(parent_path(to))?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("destination folder missing for {to}"),
            ));
        }
        // A case-only rename sees its own source on case-insensitive file systems
        if target.exists() && !same_file(&source, &target) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination exists: {to}"),
            ));
        }

        std::fs::rename(&source, &target)
    }

    fn folders(&self) -> Vec<String> {
        let mut result = Vec::new();
        self.collect_folders(&self.root, "", &mut result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vault() -> (TempDir, LocalStore) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Inbox")).unwrap();
        std::fs::create_dir_all(dir.path().join(".obsidian/plugins")).unwrap();
        std::fs::write(dir.path().join("Inbox/b.pdf"), b"b").unwrap();
        std::fs::write(dir.path().join("Inbox/a.pdf"), b"a").unwrap();
        std::fs::write(dir.path().join("Inbox/.DS_Store"), b"").unwrap();
        std::fs::create_dir_all(dir.path().join("Inbox/Sub")).unwrap();
        let store = LocalStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_get_and_list() {
        let (_dir, store) = vault();

        assert!(matches!(store.get("Inbox"), Some(Entry::Folder { .. })));
        assert_eq!(
            store.get("Inbox/a.pdf"),
            Some(Entry::File {
                path: "Inbox/a.pdf".to_string(),
                name: "a.pdf".to_string()
            })
        );
        assert!(store.get("Missing").is_none());

        let children = store.list_children("Inbox").unwrap();
        let paths: Vec<_> = children.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["Inbox/Sub", "Inbox/a.pdf", "Inbox/b.pdf"]);
    }

    #[test]
    fn test_rename_requires_parent() {
        let (dir, store) = vault();

        assert!(store.rename("Inbox/a.pdf", "Archive/a.pdf").is_err());
        store.create_folder("Archive/2024").unwrap();
        store.create_folder("Archive/2024").unwrap();
        store.rename("Inbox/a.pdf", "Archive/2024/a.pdf").unwrap();

        assert!(dir.path().join("Archive/2024/a.pdf").is_file());
        assert!(!store.exists("Inbox/a.pdf"));
    }

    #[test]
    fn test_rename_refuses_to_overwrite() {
        let (dir, store) = vault();

        let err = store.rename("Inbox/a.pdf", "Inbox/b.pdf").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(dir.path().join("Inbox/b.pdf")).unwrap(), b"b");
    }

    #[test]
    fn test_case_only_rename_keeps_other_file() {
        let (dir, store) = vault();
        std::fs::write(dir.path().join("Inbox/IMG.JPG"), b"upper").unwrap();
        std::fs::write(dir.path().join("Inbox/IMG.jpg"), b"lower").unwrap();

        let case_sensitive = std::fs::read(dir.path().join("Inbox/IMG.JPG")).unwrap() == b"upper";
        if case_sensitive {
            let err = store.rename("Inbox/IMG.JPG", "Inbox/IMG.jpg").unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
            assert_eq!(std::fs::read(dir.path().join("Inbox/IMG.jpg")).unwrap(), b"lower");
            assert_eq!(std::fs::read(dir.path().join("Inbox/IMG.JPG")).unwrap(), b"upper");
        }
    }

    #[test]
    fn test_case_only_rename_of_single_file() {
        let (dir, store) = vault();
        std::fs::write(dir.path().join("Inbox/SCAN.PDF"), b"scan").unwrap();

        store.rename("Inbox/SCAN.PDF", "Inbox/SCAN.pdf").unwrap();

        assert_eq!(std::fs::read(dir.path().join("Inbox/SCAN.pdf")).unwrap(), b"scan");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let (dir, store) = vault();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("Inbox/broken.pdf"))
            .unwrap();

        let children = store.list_children("Inbox").unwrap();
        let paths: Vec<_> = children.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["Inbox/Sub", "Inbox/a.pdf", "Inbox/b.pdf"]);
    }

    #[test]
    fn test_paths_cannot_escape_vault() {
        let (_dir, store) = vault();

        assert!(store.get("../etc").is_none());
        assert!(store.create_folder("Inbox/../../x").is_err());
    }

    #[test]
    fn test_folders_skips_hidden() {
        let (_dir, store) = vault();
        store.create_folder("Archive/2024").unwrap();

        assert_eq!(
            store.folders(),
            vec!["Archive", "Archive/2024", "Inbox", "Inbox/Sub"]
        );
    }
}
