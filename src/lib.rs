//! Inbox Processor - rule-based inbox organizer for a notes vault
//!
//! Files dropped into the vault's inbox folder are matched against ordered
//! rules (extension filter plus optional name pattern) and moved into
//! folders derived from the date in their name.

pub mod app;
pub mod config;
pub mod error;
pub mod notifications;
pub mod processor;
pub mod rules;
pub mod scheduler;
pub mod store;
pub mod suggest;

pub use config::{JsonSettingsStore, Settings, SettingsStore};
pub use error::ProcessError;
pub use processor::{InboxProcessor, RunReport};
pub use rules::{Rule, match_rule, resolve_destination};
pub use store::{Entry, FileStore, LocalStore};
pub use suggest::FolderSuggest;

/// Current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Expand ~ and environment variables ($VAR, ${VAR}) in a path
pub fn expand_path(path: &std::path::Path) -> std::path::PathBuf {
    let path_str = path.to_string_lossy();

    // First expand ~ prefix
    let expanded = match path_str.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => format!("{}{}", home.to_string_lossy(), rest),
            None => path_str.to_string(),
        },
        _ => path_str.to_string(),
    };

    // Then expand $VAR and ${VAR} patterns
    use std::sync::LazyLock;
    static ENV_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
        regex::Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("invalid env regex")
    });

    let result = ENV_RE.replace_all(&expanded, |caps: &regex::Captures| {
        let var_name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("");
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    });

    std::path::PathBuf::from(result.as_ref())
}
