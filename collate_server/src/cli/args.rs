use std::ffi::OsString;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Correction store for the collate review workflow
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(index = 1)]
    pub config_path: Option<OsString>,

    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}
