//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "diario")]
#[command(about = "Shared journal that keeps working offline", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new journal
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Base URL of the hosted datastore
        #[arg(long)]
        url: Option<String>,

        /// Anon API key for the hosted datastore
        #[arg(long)]
        key: Option<String>,
    },

    /// Log in as one of the household users
    Login {
        /// Esposa or Esposo
        user: String,

        /// Shared passphrase
        passphrase: String,
    },

    /// Forget the current session
    Logout,

    /// Show who is logged in
    Whoami,

    /// List entries, newest first
    List,

    /// Write a new entry
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,
    },

    /// Change the title and/or content of an entry
    Edit {
        /// Entry id (see `diario list`)
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,
    },

    /// Delete an entry
    Delete {
        /// Entry id (see `diario list`)
        id: String,
    },

    /// Check whether the hosted datastore is reachable
    Status,

    /// Copy local entries to the hosted datastore
    Migrate,

    /// View or modify configuration
    Config {
        /// Config key to get or set
        key: Option<String>,

        /// Value to set (if provided, sets the key)
        value: Option<String>,

        /// List all configuration
        #[arg(short, long)]
        list: bool,
    },
}
