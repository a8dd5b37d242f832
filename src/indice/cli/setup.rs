use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "indice", bin_name = "indice", version)]
#[command(
    about = "Keeps generated folder outlines up to date inside vault index notes",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault root (defaults to the nearest folder holding .obsidian or .indice)
    #[arg(long, global = true, value_name = "DIR")]
    pub vault: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build or refresh the index region of a document
    Build {
        /// Vault path of the document, e.g. Projects/Index.md
        path: String,

        /// Cursor line used when the document has no region yet (0-based)
        #[arg(long, requires = "ch")]
        line: Option<usize>,

        /// Cursor column used when the document has no region yet (0-based)
        #[arg(long, requires = "line")]
        ch: Option<usize>,
    },

    /// Rebuild the indexes governing a document or folder
    #[command(alias = "update")]
    Refresh {
        /// Vault path of a document or folder
        path: String,
    },

    /// Rebuild every index in the vault
    All,

    /// Print the outline of a folder without writing anything
    Outline {
        /// Vault path of the folder
        #[arg(default_value = "/")]
        folder: String,
    },

    /// Watch the vault and keep indexes up to date
    Watch,

    /// Get or set configuration
    Config {
        /// Configuration key (extensions, max-depth, ignore, debounce-ms)
        key: Option<String>,
        /// Value to set
        value: Option<String>,
    },
}
