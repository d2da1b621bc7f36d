use cbt_backend::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    routes::build_router,
    telemetry::init_tracing,
    AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config)?;

    let pool = create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    let app = build_router(AppState::new(pool));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
