use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tagatom::build::build_site;
use tagatom::config::Config;

#[derive(Parser)]
#[command(name = "tagatom", version, about = "Generates an Atom feed for every tag in a blog")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Builds the tag feeds
    Build {
        /// The project directory, or any directory below it.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// The directory in which to write the feeds.
        #[arg(short, long, env = "TAGATOM_OUTPUT", default_value = "_site")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tagatom::logging::init(cli.verbose);

    match cli.command {
        Command::Build { project, output } => {
            let project = std::fs::canonicalize(&project)?;
            let config = Config::from_directory(&project, &output)?;
            let feeds = build_site(&config)?;
            println!("Wrote {} tag feeds to {}", feeds, output.display());
        }
    }
    Ok(())
}
