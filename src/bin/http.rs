#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use tracing_subscriber::EnvFilter;
    use worklist::{Worklist, WorklistConfig, http_api};

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WORKLIST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let addr: SocketAddr = std::env::var("WORKLIST_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    let config_path =
        std::env::var("WORKLIST_CONFIG").unwrap_or_else(|_| "worklist.toml".to_string());
    let worklist = Worklist::new(WorklistConfig::load_or_default(config_path)?)?;

    println!("worklist HTTP API listening on http://{addr}");
    http_api::serve(addr, worklist).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
