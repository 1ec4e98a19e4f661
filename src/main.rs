use habit_tracker::{AppState, Config, Storage, Tracker, router};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let storage = Storage::new(config.data_dir.clone());
    fs::create_dir_all(storage.root()).await?;

    let mut tracker = Tracker::open(storage, config.celebration_duration).await;
    match tracker.restore_session().await {
        Some(account) => info!(%account, "resumed previous session"),
        None => info!("no previous session, waiting for login"),
    }

    let app = router(AppState::new(tracker));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
