use tracing_subscriber::EnvFilter;

use job_tracker::cli::commands::serve::{self, ServeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, TRACKER_PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,job_tracker=debug")))
        .init();

    serve::handle(ServeArgs::default()).await
}
