//! gatehoused - permission authority daemon.
//!
//! Loads a config, deploys the authority, applies genesis and then serves
//! the JSON-lines operator console on stdin/stdout.

use gatehouse::config::{ClockKind, Config};
use gatehouse::console::Console;
use gatehouse::state::RecordingObserver;
use gatehouse::{AccessManager, Clock, Host, ManualClock, SystemClock};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Events kept for the console between `events` requests.
const EVENT_BACKLOG: usize = 10_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries console responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load_validated(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    let (clock, manual_clock): (Arc<dyn Clock>, Option<Arc<ManualClock>>) =
        match config.authority.clock {
            ClockKind::System => (Arc::new(SystemClock), None),
            ClockKind::Manual => {
                let start = config
                    .authority
                    .start_time
                    .unwrap_or_else(|| SystemClock.now());
                let clock = Arc::new(ManualClock::new(start));
                (clock.clone(), Some(clock))
            }
        };

    info!(
        authority = %config.authority.address,
        admin = %config.authority.admin,
        clock = ?config.authority.clock,
        expiration = config.policy.expiration,
        min_setback = config.policy.min_setback,
        "Starting gatehoused"
    );

    gatehouse::metrics::init();
    if let Some(port) = config.metrics_port {
        tokio::spawn(gatehouse::http::run_http_server(port));
    }

    let host = Arc::new(Host::new(clock.clone()));
    let recorder = Arc::new(RecordingObserver::bounded(EVENT_BACKLOG));
    let authority = Arc::new(AccessManager::new(
        config.authority.address,
        config.authority.admin,
        config.policy,
        clock,
    )?);
    authority.add_observer(recorder.clone());
    host.deploy(authority.address(), authority.clone());

    let calls = gatehouse::genesis::apply(&host, &config)?;
    info!(calls, "Authority ready");

    let mut console = Console::new(host, authority, manual_clock, recorder);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    console.run(stdin, tokio::io::stdout()).await?;

    info!("Console closed, shutting down");
    Ok(())
}
