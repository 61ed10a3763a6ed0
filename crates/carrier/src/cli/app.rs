use clap::{ArgAction, Parser, Subcommand};

use crate::cli::get::GetArg;

#[derive(Clone, Debug, Parser)]
#[command(name = "carrier", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "g", name = "get", about = "Download a file, resuming a partial one")]
    Get(GetArg),
}
