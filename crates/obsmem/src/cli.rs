use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "obsmem")]
#[command(version)]
#[command(about = "Observational memory for AI coding agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress new transcript messages into observations
    Observe {
        /// Normalized transcript, one JSON message per line
        #[arg(short, long)]
        transcript: PathBuf,

        /// Historical import: append notes without showing existing observations
        #[arg(long)]
        backfill: bool,

        /// Messages per oracle call when backfilling (default from config)
        #[arg(long, requires = "backfill")]
        chunk_size: Option<usize>,

        /// Print the oracle output without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Import every unprocessed transcript, reflecting as it goes
    Backfill {
        /// Transcript files or directories to search for *.jsonl
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Max transcripts to process (0 = unlimited)
        #[arg(long)]
        limit: Option<usize>,

        /// Run the reflector every N transcripts (0 = only at the end)
        #[arg(long, default_value_t = obsmem_pipeline::DEFAULT_REFLECT_EVERY)]
        reflect_every: usize,

        /// Messages per oracle call (default from config)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// List unprocessed transcripts without processing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Condense observations into long-term reflections
    Reflect {
        /// Print the new reflections without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Keyword search over observations and reflections
    Search {
        query: String,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Rebuild the index before searching
        #[arg(long)]
        reindex: bool,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Print memory for a new session: reflections plus relevant observations
    Context {
        /// Wrap the text in a session-start hook payload
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the search index from the memory files
    Reindex,

    /// Show memory status
    Status,

    /// Print version information
    Version,
}
