use anyhow::Context;
use clap::Parser;
use syncmon_node::{logging, run, shutdown::shutdown_signal, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("invalid configuration")?;

    logging::init_logging(&config.log)?;

    run(config, shutdown_signal()).await
}
