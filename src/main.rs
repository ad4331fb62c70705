//! # sigtree
//!
//! A command-line tool for converting electrophysiology recordings to the
//! sigtree hierarchical store.
//!
//! ## Usage
//!
//! ```bash
//! # Convert a recording (split store plus a -oneda combined store)
//! sigtree convert sub-01.json cap.sfp
//!
//! # Single layout with an explicit output
//! sigtree convert sub-01.json --layout combined -o sub-01.sigtree
//!
//! # Back to recording JSON
//! sigtree export sub-01.sigtree
//!
//! # Inspect a store
//! sigtree info sub-01.sigtree
//! ```

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Usage errors exit with 1
            let _ = e.print();
            std::process::exit(1);
        }
    };

    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
