//! Command-line interface definitions for keyreplay.

use std::path::PathBuf;

use clap::Parser;
use logging::LogArgs;

/// Command-line interface for the `keyreplay` binary.
#[derive(Parser, Debug)]
#[command(
    name = "keyreplay",
    about = "Replay a scripted key session through the command engine",
    version
)]
pub struct Cli {
    /// Logging controls shared across nebula binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Optional path to a RON settings file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Script to replay; reads stdin when omitted.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,
}
