//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::storage::MoveDirection;

pub mod commands;

/// Koffan - shared shopping lists
#[derive(Parser, Debug)]
#[command(name = "koffan", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.koffan/data/koffan.db)
    #[arg(long, global = true, env = "KOFFAN_DB")]
    pub db: Option<PathBuf>,

    /// API token for section, item, and history commands
    #[arg(long, global = true, env = "KOFFAN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database
    Init {
        /// Recreate the database file if it exists
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version {
        /// Also look up the latest release
        #[arg(long)]
        check: bool,
    },

    /// Shopping lists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Sections of a list (requires --token)
    Section {
        #[command(subcommand)]
        command: SectionCommands,
    },

    /// Items of a section (requires --token)
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Autocomplete history (requires --token)
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Reusable item templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Export lists to JSON or CSV
    Export(ExportArgs),

    /// Import lists from a JSON or CSV export
    Import(ImportArgs),

    /// Delete all data
    Clear {
        /// Type DELETE to confirm
        #[arg(long)]
        confirm: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Reorder direction.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
        }
    }
}

// ============================================================================
// List Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// Show all lists with progress
    #[command(alias = "ls")]
    All,

    /// Show a list with its sections and items
    Show {
        id: String,
    },

    /// Create a list
    Create {
        name: String,

        /// Emoji icon (default 🛒)
        #[arg(long, default_value = "")]
        icon: String,
    },

    /// Rename a list
    Update {
        id: String,
        name: String,

        /// New icon (keeps the current one if omitted)
        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a list with its sections and items
    Delete {
        id: String,
    },

    /// Make a list the active one
    Activate {
        id: String,
    },

    /// Move a list up or down
    Move {
        id: String,
        #[arg(value_enum)]
        direction: Direction,
    },
}

// ============================================================================
// Section Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum SectionCommands {
    /// Show a section
    Show {
        id: String,
    },

    /// Create a section at the end of a list
    Create {
        list_id: i64,
        name: String,
    },

    /// Rename a section
    Update {
        id: String,
        name: String,
    },

    /// Delete a section and its items
    Delete {
        id: String,
    },

    /// List the items of a section
    Items {
        id: String,
    },

    /// Move a section up or down
    Move {
        id: String,
        #[arg(value_enum)]
        direction: Direction,
    },
}

// ============================================================================
// Item Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Show an item
    Show {
        id: String,
    },

    /// Add an item to a section
    Add {
        section_id: i64,
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Change name or description
    Update {
        id: String,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete an item
    Delete {
        id: String,
    },

    /// Toggle the completed flag
    Toggle {
        id: String,
    },

    /// Toggle the uncertain flag
    Uncertain {
        id: String,
    },

    /// Move an item to the end of another section
    Transfer {
        id: String,

        /// Target section
        #[arg(long = "to")]
        section_id: i64,
    },

    /// Move an item up or down within its section
    Move {
        id: String,
        #[arg(value_enum)]
        direction: Direction,
    },
}

// ============================================================================
// History Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// Show history, most used first
    #[command(alias = "ls")]
    All,

    /// Record a use of an item name
    Add {
        name: String,

        /// Section the item was last placed in
        #[arg(long, default_value_t = 0)]
        section: i64,
    },

    /// Delete one entry
    Delete {
        id: String,
    },

    /// Delete several entries
    Prune {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

// ============================================================================
// Template Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Show all templates
    #[command(alias = "ls")]
    All,

    /// Show a template with its items
    Show {
        id: String,
    },

    /// Create an empty template
    Create {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete a template
    Delete {
        id: String,
    },

    /// Add an item to a template
    AddItem {
        id: String,
        name: String,

        /// Section name (default: the localized "General")
        #[arg(long, default_value = "")]
        section: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Copy a template's items into a list
    Apply {
        id: String,
        list_id: i64,
    },
}

// ============================================================================
// Transfer Commands
// ============================================================================

/// File format for exports.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Export only this list
    #[arg(long)]
    pub list: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    pub format: ExportFormat,

    /// Leave templates out of a JSON export
    #[arg(long)]
    pub no_templates: bool,

    /// Leave history out of the export
    #[arg(long)]
    pub no_history: bool,

    /// CSV delimiter
    #[arg(long, default_value = ",")]
    pub delimiter: String,

    /// Output file or directory (default: current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only show what would be exported
    #[arg(long)]
    pub preview: bool,
}

/// Handling of imported lists whose name already exists.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Resolution {
    #[default]
    Skip,
    Replace,
    Copy,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// JSON or CSV file exported by Koffan
    pub file: PathBuf,

    /// Validate and summarize without importing
    #[arg(long)]
    pub preview: bool,

    #[arg(long, value_enum, default_value_t)]
    pub resolution: Resolution,

    /// Suffix for renamed copies
    #[arg(long, default_value = "copy")]
    pub copy_suffix: String,

    /// CSV delimiter
    #[arg(long, default_value = ",")]
    pub delimiter: String,
}
