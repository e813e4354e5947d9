use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yatube_api::{
    config::{self, InitError},
    server::{self, ServerState},
};

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "yatube_api=debug,\
                yatube_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Could not listen for Ctrl-C");
        return;
    }
    info!("Shutting down");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = config::get_env()?;

    let state = ServerState {
        store: config::connect_store(&env).await?,
        page_size: env.posts_on_page,
    };

    let app = server::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, posts_on_page = env.posts_on_page.get(), "Listening");

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
