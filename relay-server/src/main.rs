//! Binary crate for the `weather-relay` command.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Running the HTTP relay

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    weather_relay::telemetry::init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
