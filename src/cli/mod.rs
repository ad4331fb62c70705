use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

use sigtree::signal::PhysicalLayout;

mod config;
mod convert;
mod export;
mod info;

/// sigtree - Electrophysiology recordings in a hierarchical data store
#[derive(Parser)]
#[command(name = "sigtree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Physical layout of the signal arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutArg {
    /// One 2-D array for all channels
    Combined,
    /// One 1-D array per channel
    Split,
    /// Write both: the split store and a `-oneda` combined store
    #[default]
    Both,
}

impl LayoutArg {
    /// Layouts to write, in order
    pub fn layouts(self) -> &'static [PhysicalLayout] {
        match self {
            LayoutArg::Combined => &[PhysicalLayout::Combined],
            LayoutArg::Split => &[PhysicalLayout::Split],
            LayoutArg::Both => &[PhysicalLayout::Split, PhysicalLayout::Combined],
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a recording JSON file to a sigtree store
    Convert {
        /// Input recording file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Electrode position file (`name x y z` per line)
        #[arg(value_name = "MONTAGE")]
        montage: Option<PathBuf>,

        /// Output store path (defaults to the input name with .sigtree)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Physical layout of the signal arrays (default: both)
        #[arg(short, long, value_enum)]
        layout: Option<LayoutArg>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Replace existing output files
        #[arg(long)]
        overwrite: bool,

        /// Compression level for ZSTD (1-22, default: 3)
        #[arg(short = 'c', long, hide = true)]
        compression_level: Option<i32>,
    },

    /// Export a sigtree store back to a recording JSON file
    Export {
        /// Input store path
        #[arg(value_name = "STORE")]
        store: PathBuf,

        /// Output recording path (defaults to the store name with .json)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Display the structure of a sigtree store
    Info {
        /// Input store path
        #[arg(value_name = "STORE")]
        store: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            input,
            montage,
            output,
            layout,
            config,
            overwrite,
            compression_level,
        } => convert::run(convert::ConvertArgs {
            input,
            montage,
            output,
            layout,
            config,
            overwrite,
            compression_level,
        }),
        Commands::Export { store, output } => export::run(store, output),
        Commands::Info { store } => info::run(store),
    }
}
