//! Local webhook sink for development.
//!
//! Prints every POSTed body followed by a `---` separator and answers with a
//! fixed status, so the poller can be exercised end to end without a real
//! downstream.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "polldancer-sink")]
#[command(about = "Development webhook sink that echoes POSTed payloads", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = 8082)]
    port: u16,

    /// Status code returned to every POST.
    #[arg(short, long, default_value_t = 200)]
    status: u16,
}

async fn receive(State(status): State<StatusCode>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::debug!(content_type, bytes = body.len(), "Payload received");
    println!("{}\n---\n", String::from_utf8_lossy(&body));
    status
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polldancer_sink=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let status = StatusCode::from_u16(cli.status)?;
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;

    let app = Router::new()
        .route("/", post(receive))
        .route("/{*path}", post(receive))
        .with_state(status);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Server running on port {}", cli.port);
    axum::serve(listener, app).await?;
    Ok(())
}
