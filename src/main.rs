use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use dripmap::commands::Command;
use dripmap::{HostPage, Session, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init();

    tracing::info!("🚦 DripMap viewer v{} starting...", env!("CARGO_PKG_VERSION"));

    // Settings file from the first argument, else next to the executable
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_from(&PathBuf::from(path))?,
        None => Settings::load()?,
    };
    tracing::info!("📂 Data directory: {}", settings.data_dir.display());

    let mut session = Session::setup(&HostPage::standard(), settings)
        .context("Failed to set up the map page")?;
    session.load().await;

    print_state(&session)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("Ignoring input: {:#}", e);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match command.to_event(session.registry()) {
            Ok(Some(event)) => {
                if let Err(e) = session.dispatch(event) {
                    tracing::warn!("{:#}", e);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{:#}", e),
        }
        print_state(&session)?;
    }

    Ok(())
}

fn print_state(session: &Session) -> Result<()> {
    let json = serde_json::to_string(&session.snapshot()).context("Failed to encode view state")?;
    println!("{}", json);
    Ok(())
}
