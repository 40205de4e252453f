mod app;
mod cli;
mod config;
mod logging;
mod ui;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = cli::CliArgs::parse();
    app::run(args)
}
