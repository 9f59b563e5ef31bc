//! In-memory file store for tests

use std::collections::BTreeMap;
use std::io;
use std::sync::Mutex;

use super::{Entry, FileStore, file_name, join_path, parent_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    File,
    Folder,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Kind>>,
    renames: Mutex<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent folders
    pub fn with_file(self, path: &str) -> Self {
        let path = join_path([path]);
        self.insert_folders(parent_path(&path));
        self.entries.lock().unwrap().insert(path, Kind::File);
        self
    }

    pub fn with_folder(self, path: &str) -> Self {
        self.insert_folders(path);
        self
    }

    fn insert_folders(&self, path: &str) {
        let mut entries = self.entries.lock().unwrap();
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = join_path([current.as_str(), segment]);
            entries.entry(current.clone()).or_insert(Kind::Folder);
        }
    }

    pub fn renames(&self) -> Vec<(String, String)> {
        self.renames.lock().unwrap().clone()
    }

    pub fn files(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, k)| **k == Kind::File)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

impl FileStore for MemoryStore {
    fn get(&self, path: &str) -> Option<Entry> {
        let path = join_path([path]);
        if path.is_empty() {
            return Some(Entry::Folder { path });
        }
        match self.entries.lock().unwrap().get(&path)? {
            Kind::Folder => Some(Entry::Folder { path }),
            Kind::File => {
                let name = file_name(&path).to_string();
                Some(Entry::File { path, name })
            }
        }
    }

    fn list_children(&self, folder: &str) -> io::Result<Vec<Entry>> {
        let folder = join_path([folder]);
        if !self.get(&folder).is_some_and(|e| e.is_folder()) {
            return Err(io::Error::new(io::ErrorKind::NotFound, folder));
        }
        let children = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| parent_path(p) == folder)
            .map(|(p, k)| match k {
                Kind::Folder => Entry::Folder { path: p.clone() },
                Kind::File => Entry::File {
                    path: p.clone(),
                    name: file_name(p).to_string(),
                },
            })
            .collect();
        Ok(children)
    }

    fn create_folder(&self, path: &str) -> io::Result<()> {
        if matches!(self.get(path), Some(Entry::File { .. })) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, path.to_string()));
        }
        self.insert_folders(path);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        if !matches!(self.get(from), Some(Entry::File { .. })) {
            return Err(io::Error::new(io::ErrorKind::NotFound, from.to_string()));
        }
        if !self.get(parent_path(to)).is_some_and(|e| e.is_folder()) {
            return Err(io::Error::new(io::ErrorKind::NotFound, to.to_string()));
        }
        if self.exists(to) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, to.to_string()));
        }

        let mut entries = self.entries.lock().unwrap();
        entries.remove(from);
        entries.insert(to.to_string(), Kind::File);
        self.renames
            .lock()
            .unwrap()
            .push((from.to_string(), to.to_string()));
        Ok(())
    }

    fn folders(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, k)| **k == Kind::Folder)
            .map(|(p, _)| p.clone())
            .collect()
    }
}
