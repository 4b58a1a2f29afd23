use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "versecache", version)]
#[command(about = "Verse-indexed text cache for Bibles and commentaries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Cache directory (defaults to the user data directory)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new cache directory
    Init {
        /// Numbering scheme of the cache
        #[arg(long, default_value = versecache::versification::DEFAULT_VERSIFICATION)]
        versification: String,

        /// Title of documents read from the cache
        #[arg(long)]
        title: Option<String>,
    },

    /// Record the text of one verse
    Put {
        /// Verse reference (e.g. "Gen 1:1")
        reference: String,

        /// Text of the verse
        text: String,
    },

    /// Import verses from a file of REFERENCE<TAB>TEXT lines
    Import { file: PathBuf },

    /// Print one or more passages
    #[command(alias = "g")]
    Get {
        /// Passages (e.g. "Gen 1:1-3" "Exod 2")
        #[arg(required = true, num_args = 1..)]
        passages: Vec<String>,

        /// Print the document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify that every recorded verse is readable
    Check,

    /// Show cache settings and statistics
    Info,
}
