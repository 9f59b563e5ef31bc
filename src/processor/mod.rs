//! Inbox processor - moves matching inbox files to their destinations

mod report;

pub use report::{Plan, PlannedMove, RunReport};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, error, info, trace, warn};

use crate::config::Settings;
use crate::error::ProcessError;
use crate::notifications;
use crate::rules::{Rule, lowercase_extension, match_rule_index, resolve_destination};
use crate::store::{Entry, FileStore, join_path, parent_path};

/// Result of processing a single file
enum Outcome {
    Unmatched,
    Moved,
}

/// Clears the in-flight flag when a run ends, however it ends
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Applies the rules to every file directly inside the inbox folder
pub struct InboxProcessor<S> {
    store: S,
    settings: RwLock<Settings>,
    in_flight: AtomicBool,
    files_moved: AtomicU64,
}

impl<S: FileStore> InboxProcessor<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Self {
            store,
            settings: RwLock::new(settings),
            in_flight: AtomicBool::new(false),
            files_moved: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the settings. A run already in progress keeps the ones it started with.
    pub fn reload(&self, settings: Settings) {
        *self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = settings;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Total number of files moved since the processor was created
    pub fn files_moved(&self) -> u64 {
        self.files_moved.load(Ordering::Relaxed)
    }

    /// Whether a run is currently in progress
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Files directly inside the inbox, or `None` when there is no inbox to scan
    fn inbox_files(&self, settings: &Settings) -> Option<Vec<(String, String)>> {
        let inbox = &settings.inbox_folder;
        if inbox.is_empty() {
            info!("No inbox folder configured");
            return None;
        }

        match self.store.get(inbox) {
            Some(Entry::Folder { .. }) => {}
            _ => {
                info!("Inbox folder is empty or does not exist: {}", inbox);
                return None;
            }
        }

        match self.store.list_children(inbox) {
            Ok(children) => Some(
                children
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Entry::File { path, name } => Some((path, name)),
                        Entry::Folder { .. } => None,
                    })
                    .collect(),
            ),
            Err(e) => {
                error!("Failed to list inbox folder {}: {}", inbox, e);
                None
            }
        }
    }

    /// Process the inbox once.
    ///
    /// Errors are per file: they are logged and counted, and the run carries
    /// on with the next file. A call made while another run is in flight
    /// returns immediately.
    pub fn process_inbox(&self) -> RunReport {
        let Some(_guard) = RunGuard::acquire(&self.in_flight) else {
            debug!("Inbox run already in progress, skipping");
            return RunReport::busy();
        };

        let settings = self.settings();
        let mut report = RunReport::default();
        let Some(files) = self.inbox_files(&settings) else {
            return report;
        };

        for (path, name) in files {
            report.scanned += 1;
            match self.process_file(&settings, &path, &name) {
                Ok(Outcome::Moved) => report.moved += 1,
                Ok(Outcome::Unmatched) => report.unmatched += 1,
                Err(ProcessError::Collision(destination)) => {
                    info!("File already exists at \"{}\"", destination);
                    notifications::notify_collision(&name, &destination);
                    report.collisions += 1;
                }
                Err(e) => {
                    if e.is_user_facing() {
                        warn!("Skipping {}: {}", path, e);
                        notifications::notify_config_error(&e.to_string());
                    } else {
                        error!("Failed to process {}: {}", path, e);
                    }
                    report.errors += 1;
                }
            }
        }

        self.files_moved
            .fetch_add(report.moved as u64, Ordering::Relaxed);

        if report.scanned > 0 {
            info!(
                "Inbox run: {} files scanned, {} moved, {} unmatched, {} collisions, {} errors",
                report.scanned, report.moved, report.unmatched, report.collisions, report.errors
            );
        }

        report
    }

    fn process_file(
        &self,
        settings: &Settings,
        path: &str,
        name: &str,
    ) -> Result<Outcome, ProcessError> {
        let Some(index) = match_rule_index(name, &settings.rules) else {
            trace!("No rule matches {}", name);
            return Ok(Outcome::Unmatched);
        };
        let rule = &settings.rules[index];
        debug!("Rule {} matched {}", index + 1, path);

        let (path, name) = if settings.convert_extensions_to_lowercase {
            self.normalize_extension(path, name)?
        } else {
            (path.to_string(), name.to_string())
        };

        self.move_file(&path, &name, rule)?;
        Ok(Outcome::Moved)
    }

    /// Lowercase the extension in place, returning the file's new path and name
    fn normalize_extension(&self, path: &str, name: &str) -> Result<(String, String), ProcessError> {
        let new_name = lowercase_extension(name);
        if new_name == name {
            return Ok((path.to_string(), new_name));
        }

        let new_path = join_path([parent_path(path), new_name.as_str()]);
        self.store.rename(path, &new_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                ProcessError::Collision(new_path.clone())
            } else {
                ProcessError::io("rename", path, e)
            }
        })?;
        debug!("Renamed {} -> {}", path, new_path);

        // Handles are path-addressed; look the file up again at its new path
        match self.store.get(&new_path) {
            Some(Entry::File { path, name }) => Ok((path, name)),
            _ => Err(ProcessError::io(
                "look up",
                new_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a file after rename"),
            )),
        }
    }

    fn move_file(&self, path: &str, name: &str, rule: &Rule) -> Result<(), ProcessError> {
        let destination = resolve_destination(name, rule)?;

        if !self
            .store
            .get(&destination.folder)
            .is_some_and(|e| e.is_folder())
        {
            self.store
                .create_folder(&destination.folder)
                .map_err(|e| ProcessError::io("create folder", &destination.folder, e))?;
            debug!("Created folder {}", destination.folder);
        }

        if self.store.exists(&destination.file_path) {
            return Err(ProcessError::Collision(destination.file_path));
        }

        self.store
            .rename(path, &destination.file_path)
            .map_err(|e| ProcessError::io("move", path, e))?;
        info!("\"{}\" moved to \"{}\"", name, destination.folder);
        Ok(())
    }

    /// Work out what a run would do, without touching the store
    pub fn preview(&self) -> Vec<PlannedMove> {
        let settings = self.settings();
        let Some(files) = self.inbox_files(&settings) else {
            return Vec::new();
        };

        files
            .into_iter()
            .map(|(source, name)| {
                let plan = match match_rule_index(&name, &settings.rules) {
                    None => Plan::Unmatched,
                    Some(rule) => {
                        let name = if settings.convert_extensions_to_lowercase {
                            lowercase_extension(&name)
                        } else {
                            name
                        };
                        match resolve_destination(&name, &settings.rules[rule]) {
                            Ok(dest) if self.store.exists(&dest.file_path) => Plan::Collision {
                                rule,
                                destination: dest.file_path,
                            },
                            Ok(dest) => Plan::Move {
                                rule,
                                destination: dest.file_path,
                            },
                            Err(error) => Plan::Failed { rule, error },
                        }
                    }
                };
                PlannedMove { source, plan }
            })
            .collect()
    }
}
