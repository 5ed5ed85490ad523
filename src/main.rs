use anyhow::Result;
use fairy_penguin::uci::UciHandler;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // stdout carries the UCI protocol, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut uci = UciHandler::new();
    uci.run()
}
