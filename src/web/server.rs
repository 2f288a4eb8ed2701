use super::{router::create_router, AppState};

/// Serve the form until the process is stopped.
///
/// Logging is the caller's to set up; the router emits request spans via
/// `TraceLayer`.
pub async fn run_server(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
