use anyhow::Result;
use std::sync::Arc;
use tokio::time::Duration;

use pulsegraph::clock::SystemClock;
use pulsegraph::config::DashboardConfig;
use pulsegraph::controller::PollingController;
use pulsegraph::fetch::HttpFetcher;
use pulsegraph::logging::{log, obj, v_str, Domain, Level};
use pulsegraph::render::{sample_table, status_line};
use pulsegraph::session::Session;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = DashboardConfig::from_env()?;
    let fetcher = Arc::new(HttpFetcher::with_timeout(Duration::from_secs(cfg.timeout_secs)));
    let session = Session::new(&cfg, fetcher, Arc::new(SystemClock));
    let mut controller = PollingController::new(session, cfg.interval_ms);
    let mut updates = controller.session().subscribe();

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("url", v_str(&cfg.url)),
            ("path", v_str(&cfg.path)),
            ("interval_ms", json!(cfg.interval_ms)),
            ("capacity", json!(cfg.capacity)),
        ]),
    );

    // Optional bounded run, handy for scripting.
    let run_for = std::env::var("PULSE_RUN_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs);
    let deadline = async {
        match run_for {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    controller.start();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = updates.borrow_and_update().clone();
                println!("{}", status_line(&snap));
            }
            _ = tokio::signal::ctrl_c() => break,
            _ = &mut deadline => break,
        }
    }

    controller.stop();
    let snap = controller.session().snapshot();
    print!("{}", sample_table(&snap));
    log(
        Level::Info,
        Domain::System,
        "shutdown",
        obj(&[
            ("samples", json!(snap.samples.len())),
            ("last_error", snap.last_error.as_deref().map(v_str).unwrap_or(serde_json::Value::Null)),
        ]),
    );
    Ok(())
}
