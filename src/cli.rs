use clap::Parser;
use std::path::PathBuf;

/// Render a pre-computed message analytics document in the terminal
#[derive(Parser, Debug)]
#[command(name = "pulseboard")]
#[command(version)]
#[command(about = "Render a pre-computed message analytics document in the terminal")]
pub struct Cli {
    /// Stats document (JSON) to display
    pub path: PathBuf,

    /// Number of senders to show in the ranking
    #[arg(short = 't', long = "top", default_value_t = 8)]
    pub top: usize,

    /// Don't reload automatically when the file changes on disk
    #[arg(long = "no-watch")]
    pub no_watch: bool,

    /// Print the loaded document verbatim to stdout and exit
    #[arg(short = 'e', long = "export")]
    pub export: bool,

    /// Destination for the in-dashboard export key (default: auto-generated
    /// next to the source file)
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,
}
