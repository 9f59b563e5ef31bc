//! Inbox Processor CLI
//!
//! Processes a vault's inbox folder once, on a timer, or edits the rules.

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inbox_processor::config::parse_interval;
use inbox_processor::processor::Plan;
use inbox_processor::rules::validate_rule;
use inbox_processor::suggest::Suggestions;
use inbox_processor::{
    FileStore, FolderSuggest, InboxProcessor, JsonSettingsStore, LocalStore, Settings,
    SettingsStore, notifications, scheduler,
};

#[derive(Parser, Debug)]
#[command(name = "inbox-processor")]
#[command(author, version, about = "Files inbox notes and attachments by rule")]
struct Cli {
    /// Vault directory
    #[arg(long, value_name = "DIR", default_value = ".")]
    vault: PathBuf,

    /// Path to settings file (defaults to the vault's plugin data)
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Process the inbox now
    Run {
        /// Only show what would be moved
        #[arg(long)]
        dry_run: bool,
    },

    /// Process the inbox on the configured interval (Enter runs it now)
    Watch,

    /// List rules in evaluation order
    Rules,

    /// Validate settings and rule patterns
    Check,

    /// Show folder suggestions for a query
    Folders {
        /// Case-insensitive text to look for
        query: Option<String>,
    },

    /// Change scalar settings
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Edit the rule list
    #[command(subcommand)]
    Rule(RuleCommand),
}

#[derive(clap::Subcommand, Debug)]
enum ConfigCommand {
    /// Set the inbox folder (opens a folder picker when omitted)
    Inbox { folder: Option<String> },

    /// Seconds between automatic runs, or `off`
    Interval { value: String },

    /// Lowercase file extensions before moving
    Lowercase { value: Toggle },

    /// Desktop notifications for configuration errors and collisions
    Notify { value: Toggle },
}

#[derive(clap::Subcommand, Debug)]
enum RuleCommand {
    /// Append a rule
    Add {
        /// Extensions separated by `|`, e.g. `jpg|png`
        #[arg(short, long)]
        extensions: String,

        /// Name pattern, also used to find the date
        #[arg(short, long, default_value = "")]
        regex: String,

        /// Destination folder (opens a folder picker when omitted)
        #[arg(long)]
        root: Option<String>,

        /// Folder structure template, e.g. `YYYY/MM`
        #[arg(long, default_value = "")]
        structure: String,
    },

    /// Remove a rule
    Remove { index: usize },

    /// Move a rule up one place
    Up { index: usize },

    /// Move a rule down one place
    Down { index: usize },

    /// Change fields of a rule
    Set {
        index: usize,

        #[arg(short, long)]
        extensions: Option<String>,

        #[arg(short, long)]
        regex: Option<String>,

        #[arg(long, conflicts_with = "pick_root")]
        root: Option<String>,

        /// Choose the destination folder interactively
        #[arg(long)]
        pick_root: bool,

        #[arg(long)]
        structure: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(t: Toggle) -> bool {
        matches!(t, Toggle::On)
    }
}

/// Everything a command needs to reach the vault and its settings
struct Vault {
    store: LocalStore,
    settings_store: JsonSettingsStore,
}

impl Vault {
    fn new(cli: &Cli) -> Self {
        let vault = inbox_processor::expand_path(&cli.vault);
        let settings_store = match &cli.settings {
            Some(path) => JsonSettingsStore::new(inbox_processor::expand_path(path)),
            None => JsonSettingsStore::for_vault(&vault),
        };
        Self {
            store: LocalStore::new(vault),
            settings_store,
        }
    }

    fn settings(&self) -> Result<Settings> {
        Settings::load_from(&self.settings_store)
    }
}

/// Convert a 1-based rule number into an index
fn rule_index(settings: &Settings, number: usize) -> Result<usize> {
    match number.checked_sub(1) {
        Some(index) if index < settings.rules.len() => Ok(index),
        _ => bail!(
            "No rule {} (there are {} rules)",
            number,
            settings.rules.len()
        ),
    }
}

fn pick_folder(ctx: &Vault, title: &str, current: &str) -> Result<Option<String>> {
    let suggest = FolderSuggest::from_store(&ctx.store).with_value(current);
    inbox_processor::app::pick_folder(title, suggest)
}

fn print_rules(settings: &Settings) {
    println!("Rules:");
    for (i, rule) in settings.rules.iter().enumerate() {
        let pattern = if rule.regex.is_empty() {
            "*"
        } else {
            rule.regex.as_str()
        };
        let structure = if rule.folder_structure.is_empty() {
            String::new()
        } else {
            format!("/{}", rule.folder_structure)
        };
        println!(
            "  [{}] .({}) {} -> {}{}",
            i + 1,
            rule.file_extensions,
            pattern,
            rule.root_folder,
            structure
        );
    }
}

fn run_once(ctx: &Vault, dry_run: bool) -> Result<()> {
    let settings = ctx.settings()?;
    notifications::init(settings.notify_on_error);
    let processor = InboxProcessor::new(ctx.store.clone(), settings);

    if !dry_run {
        let report = processor.process_inbox();
        println!(
            "{} scanned, {} moved, {} unmatched, {} collisions, {} errors",
            report.scanned, report.moved, report.unmatched, report.collisions, report.errors
        );
        return Ok(());
    }

    for planned in processor.preview() {
        match planned.plan {
            Plan::Unmatched => println!("  [skip] {}", planned.source),
            Plan::Move { rule, destination } => {
                println!("  [rule {}] {} -> {}", rule + 1, planned.source, destination)
            }
            Plan::Collision { rule, destination } => println!(
                "  [rule {}] {} -> {} (exists, left in place)",
                rule + 1,
                planned.source,
                destination
            ),
            Plan::Failed { rule, error } => {
                println!("  [rule {}] {}: {}", rule + 1, planned.source, error)
            }
        }
    }
    Ok(())
}

async fn watch(ctx: Vault) -> Result<()> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let settings = ctx.settings()?;
    notifications::init(settings.notify_on_error);
    info!(
        "Loaded settings with inbox '{}' and {} rules",
        settings.inbox_folder,
        settings.rules.len()
    );

    // Settings edited while watching take effect on the next run
    let source: Arc<dyn SettingsStore> = Arc::new(ctx.settings_store);
    let processor = Arc::new(InboxProcessor::new(ctx.store, settings));
    let handle = scheduler::spawn(Arc::clone(&processor), Some(source));

    // Enter on stdin is the manual "process inbox now" action
    let trigger = handle.trigger_sender();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            let _ = trigger.try_send(());
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let trigger = handle.trigger_sender();
        match signal(SignalKind::user_defined1()) {
            Ok(mut usr1) => {
                tokio::spawn(async move {
                    while usr1.recv().await.is_some() {
                        let _ = trigger.try_send(());
                    }
                });
            }
            Err(e) => warn!("SIGUSR1 trigger unavailable: {}", e),
        }
    }

    info!("Watching inbox. Press Enter to process now, Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    handle.shutdown().await;
    info!("{} files moved this session", processor.files_moved());

    Ok(())
}

fn check(ctx: &Vault) -> Result<bool> {
    let settings = ctx.settings()?;
    let mut problems = 0;

    if settings.inbox_folder.is_empty()
        || !ctx
            .store
            .get(&settings.inbox_folder)
            .is_some_and(|e| e.is_folder())
    {
        println!("✗ Inbox folder '{}' does not exist", settings.inbox_folder);
        problems += 1;
    }

    for (i, rule) in settings.rules.iter().enumerate() {
        if rule.file_extensions.is_empty() {
            println!("  rule {}: no extensions, never matches", i + 1);
        }
        if rule.is_dated() && rule.regex.is_empty() {
            println!("✗ rule {}: dated folder structure needs a date pattern", i + 1);
            problems += 1;
        }
        for e in validate_rule(rule) {
            println!("✗ rule {}: {}", i + 1, e);
            problems += 1;
        }
    }

    if problems == 0 {
        println!("✓ Settings are valid");
    }
    println!("  inbox: {}", settings.inbox_folder);
    match settings.interval() {
        Some(interval) => println!("  interval: {}s", interval.as_secs()),
        None => println!("  interval: off"),
    }
    println!("  {} rules", settings.rules.len());

    Ok(problems == 0)
}

fn configure(ctx: &Vault, command: ConfigCommand) -> Result<()> {
    let mut settings = ctx.settings()?;

    match command {
        ConfigCommand::Inbox { folder } => {
            let folder = match folder {
                Some(folder) => folder,
                None => match pick_folder(ctx, "Inbox folder", &settings.inbox_folder)? {
                    Some(folder) => folder,
                    None => return Ok(()),
                },
            };
            settings.set_inbox_folder(&folder, &ctx.store)?;
            ctx.settings_store.save(&settings)?;
            println!("Inbox folder set to '{}'", folder);
        }
        ConfigCommand::Interval { value } => {
            let interval = parse_interval(&value)
                .with_context(|| format!("Invalid interval '{}'", value))?;
            settings.edit(&ctx.settings_store, |s| s.interval = interval)?;
        }
        ConfigCommand::Lowercase { value } => {
            settings.edit(&ctx.settings_store, |s| {
                s.convert_extensions_to_lowercase = value.into()
            })?;
        }
        ConfigCommand::Notify { value } => {
            settings.edit(&ctx.settings_store, |s| s.notify_on_error = value.into())?;
        }
    }

    Ok(())
}

fn edit_rules(ctx: &Vault, command: RuleCommand) -> Result<()> {
    let mut settings = ctx.settings()?;
    let store = &ctx.settings_store;

    match command {
        RuleCommand::Add {
            extensions,
            regex,
            root,
            structure,
        } => {
            let root = match root {
                Some(root) => root,
                None => match pick_folder(ctx, "Destination folder", "")? {
                    Some(root) => root,
                    None => return Ok(()),
                },
            };
            settings.edit(store, |s| {
                let index = s.add_rule();
                let rule = &mut s.rules[index];
                rule.file_extensions = extensions;
                rule.regex = regex;
                rule.root_folder = root;
                rule.folder_structure = structure;
            })?;
        }
        RuleCommand::Remove { index } => {
            let index = rule_index(&settings, index)?;
            settings.edit(store, |s| s.remove_rule(index))?;
        }
        RuleCommand::Up { index } => {
            let index = rule_index(&settings, index)?;
            settings.edit(store, |s| s.move_rule_up(index))?;
        }
        RuleCommand::Down { index } => {
            let index = rule_index(&settings, index)?;
            settings.edit(store, |s| s.move_rule_down(index))?;
        }
        RuleCommand::Set {
            index,
            extensions,
            regex,
            root,
            pick_root,
            structure,
        } => {
            let index = rule_index(&settings, index)?;
            let root = if pick_root {
                let current = settings.rules[index].root_folder.clone();
                pick_folder(ctx, "Destination folder", &current)?
            } else {
                root
            };
            settings.edit(store, |s| {
                let rule = &mut s.rules[index];
                if let Some(extensions) = extensions {
                    rule.file_extensions = extensions;
                }
                if let Some(regex) = regex {
                    rule.regex = regex;
                }
                if let Some(root) = root {
                    rule.root_folder = root;
                }
                if let Some(structure) = structure {
                    rule.folder_structure = structure;
                }
            })?;
        }
    }

    print_rules(&settings);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("INBOX_PROCESSOR_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let ctx = Vault::new(&cli);

    match cli.command {
        Commands::Run { dry_run } => run_once(&ctx, dry_run)?,
        Commands::Watch => watch(ctx).await?,
        Commands::Rules => print_rules(&ctx.settings()?),
        Commands::Check => {
            if !check(&ctx)? {
                std::process::exit(1);
            }
        }
        Commands::Folders { query } => {
            let mut suggest = FolderSuggest::from_store(&ctx.store);
            suggest.focus();
            suggest.input(query.unwrap_or_default());
            match suggest.suggestions() {
                Suggestions::Items(items) => items.iter().for_each(|f| println!("{}", f)),
                Suggestions::NoResults => println!("No results"),
            }
        }
        Commands::Config(command) => configure(&ctx, command)?,
        Commands::Rule(command) => edit_rules(&ctx, command)?,
    }

    Ok(())
}
