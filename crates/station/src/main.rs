use anyhow::anyhow;
use axum::serve;
use log::{error, info};
use piwx::{app, build_app_state, get_config_info, get_log_level, setup_logger, HttpResolver};
use piwx_core::fs::create_dir_all;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = get_config_info();
    let log_level = get_log_level(&cli);

    setup_logger()
        .level(log_level)
        .level_for("piwx", log_level)
        .level_for("http_response", log_level)
        .level_for("http_request", log_level)
        .apply()?;

    let db_dir = cli.db_dir();
    let host = cli.host();
    let port = cli.port();

    create_dir_all(&db_dir)?;

    let socket_addr = SocketAddr::from_str(&format!("{}:{}", host, port))
        .map_err(|e| anyhow!("invalid address: {}", e))?;

    let listener = TcpListener::bind(socket_addr)
        .await
        .map_err(|e| anyhow!("error binding to socket: {}", e))?;

    info!("piwx station starting...");
    info!("  Listen: http://{}", socket_addr);
    info!("  Docs:   http://{}/docs", socket_addr);
    info!("  DB dir: {}", db_dir);
    info!("  Zone:   {}", cli.timezone());

    let resolver = Arc::new(HttpResolver::new()?);
    let app_state = build_app_state(
        db_dir,
        cli.credential_digest(),
        cli.current_window_hours(),
        cli.timezone(),
        resolver,
    )
    .await
    .map_err(|e| {
        error!("error building app: {}", e);
        e
    })?;

    let database = app_state.database.clone();
    let app = app(app_state);

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Flush the WAL so the last readings survive the restart.
    database.checkpoint().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
