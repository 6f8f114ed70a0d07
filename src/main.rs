// Entrypoint for the CLI application.
// - Reads the endpoint and an optional per-call timeout from the
//   environment, builds a client and hands it to the UI loop.
// - Logs go to stderr, filtered by RUST_LOG (default: warn).

use std::time::Duration;

use anyhow::Context;
use oshi_client::{history::History, ui::main_menu, CallContext, Client, ClientConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // `OSHI_ENDPOINT` points the client at another instance, e.g. a local one.
    let mut config = ClientConfig::default();
    if let Ok(endpoint) = std::env::var("OSHI_ENDPOINT") {
        config.endpoint = endpoint;
    }

    let cx = match std::env::var("OSHI_TIMEOUT_SECS") {
        Ok(secs) => {
            let secs: u64 = secs.parse().context("OSHI_TIMEOUT_SECS must be a number of seconds")?;
            CallContext::with_timeout(Duration::from_secs(secs))
        }
        Err(_) => CallContext::background(),
    };

    let api = Client::with_config(config).context("Failed to build HTTP client")?;
    let mut history = History::load(History::default_path())?;

    main_menu(&api, cx, &mut history)?;
    Ok(())
}
