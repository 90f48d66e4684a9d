use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "usp-canvas")]
#[command(version, about = "Edit and store Unique Selling Proposition canvases")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Strategy whose canvas to work on (defaults to the project's default_strategy)
    #[arg(long, short = 's', global = true)]
    pub strategy: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new usp-canvas project in the current directory
    Init,

    /// Add an item to the canvas
    Add {
        /// Item kind (job, pain, gain, service, reliever, creator)
        #[arg(value_name = "KIND")]
        kind: String,

        /// Item text
        content: String,

        /// Priority, severity or importance for profile items (low, medium, high)
        #[arg(long, short = 'r')]
        rating: Option<String>,

        /// Related profile item id for value map items (can be specified multiple times)
        #[arg(long = "related")]
        related: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace the text and rating or links of an item
    Update {
        #[arg(value_name = "KIND")]
        kind: String,

        /// Item ID (full id or unique prefix)
        id: String,

        /// New item text
        content: String,

        #[arg(long, short = 'r')]
        rating: Option<String>,

        /// Related profile item id; replaces the existing links when given
        #[arg(long = "related")]
        related: Vec<String>,
    },

    /// Delete an item; links pointing at it are removed too
    Delete {
        #[arg(value_name = "KIND")]
        kind: String,

        /// Item ID (full id or unique prefix)
        id: String,
    },

    /// Reorder the items of one kind
    Reorder {
        #[arg(value_name = "KIND")]
        kind: String,

        /// Item IDs in the new order; every item of the kind must be listed once
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show the canvas
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save the canvas to the remote store
    Save {
        /// Mark the saved snapshot as the final version
        #[arg(long = "final")]
        is_final: bool,
    },

    /// List saved snapshots, newest first
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import AI suggestions from a JSON file
    Import {
        /// Generation response or bare suggestion payload
        file: PathBuf,

        /// Only import this profile kind (job, pain, gain)
        #[arg(long)]
        kind: Option<String>,
    },

    /// Empty the canvas
    Reset {
        /// Also delete the stored remote canvas
        #[arg(long)]
        remote: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}
