use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Small banking demo: users register and transfer funds, bankers watch the activity.
/// Log verbosity is read from RUST_LOG.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about)]
pub struct Config {
    /// Directory holding users.json, bankers.json and transactions.json
    #[clap(long, env = "BANK_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Address the HTTP server listens on
    #[clap(long, env = "BANK_LISTEN", default_value = "127.0.0.1:5000")]
    pub listen: SocketAddr,
}
