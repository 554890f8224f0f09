use std::process;
#[macro_use]
extern crate log;

mod config;
mod features;
mod server;
#[cfg(test)]
mod test_util;

use anyhow::Context;
use clap::Parser;
use config::Config;
use features::Store;

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = run(Config::parse()).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        "Starting with data in {} on {}",
        config.data_dir.display(),
        config.listen
    );
    let store = Store::open(&config.data_dir)
        .with_context(|| format!("Unable to load records from {}", config.data_dir.display()))?;

    server::serve(&config, store).await
}
