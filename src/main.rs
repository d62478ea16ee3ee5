mod config;
mod console;
mod render;
mod telemetry;

use tokio::io::BufReader;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::console::Console;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; variables may come from the environment.
    let dotenv = dotenvy::dotenv();

    telemetry::init()?;
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) => debug!(error = %e, "no .env loaded"),
    }

    let cfg = AppConfig::from_env()?;
    info!(
        backend = %cfg.api.base_url,
        timeout_secs = cfg.api.timeout_secs,
        state_dir = %cfg.state_dir.display(),
        "starting kb-assistant"
    );

    let mut console = Console::new(&cfg, tokio::io::stdout())?;
    console.run(BufReader::new(tokio::io::stdin())).await
}
