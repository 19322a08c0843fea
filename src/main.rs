use shelly_exporter::{config, server};

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// Responsibilities:
// - Initialize logging (RUST_LOG, default "info")
// - Load configuration (first argument, default config.json)
// - Serve /metrics and /probe until shutdown
//
// Any error here, including a failed bind, ends the process with
// a non-zero exit code. Errors inside a probe never reach main.
//
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let cfg = config::load_config(&path)?;

    server::serve(cfg).await
}
