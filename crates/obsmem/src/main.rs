mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Observe {
            transcript,
            backfill,
            chunk_size,
            dry_run,
        } => commands::observe::run(&transcript, backfill, chunk_size, dry_run),
        Commands::Backfill {
            paths,
            limit,
            reflect_every,
            chunk_size,
            dry_run,
        } => commands::backfill::run(commands::backfill::Args {
            roots: paths,
            limit,
            reflect_every,
            chunk_size,
            dry_run,
        }),
        Commands::Reflect { dry_run } => commands::reflect::run(dry_run),
        Commands::Search {
            query,
            limit,
            reindex,
            json,
        } => commands::search::run(&query, limit, reindex, json),
        Commands::Context { json } => commands::context::run(json),
        Commands::Reindex => commands::reindex::run(),
        Commands::Status => commands::status::run(),
        Commands::Version => commands::version::run(),
    }
}
