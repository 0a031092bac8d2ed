#![warn(missing_docs)]

//! Entry point for the `keyreplay` binary.

mod cli;
mod error;
mod replay;
mod script;

use std::{fs, io, process};

use clap::Parser;
use config::Settings;
use tracing::{debug, error};

use crate::{cli::Cli, error::Result, replay::Session};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, load settings and replay the script.
async fn run() -> Result<()> {
    let Cli {
        log,
        config: config_path,
        script: script_path,
    } = Cli::parse();
    logging::init(&log.spec());

    let settings = match config_path {
        Some(path) => config::load_from_path(&path)?,
        None => Settings::default(),
    };
    let text = match script_path {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };
    let directives = script::parse(&text)?;
    debug!(count = directives.len(), "script_loaded");

    let mut session = Session::new(settings);
    let stdout = io::stdout();
    replay::run(&mut session, &directives, &mut stdout.lock()).await
}
