//! # cgym
//!
//! Entry point for the `cgym` binary.

use anyhow::Result;
use clap::Parser;

use cgym::app::{self, Cli};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    app::run(Cli::parse())
}
