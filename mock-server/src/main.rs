use mock_server::Auth;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let defaults = Auth::default();
    let auth = Auth {
        key: std::env::var("TRELLO_KEY").unwrap_or(defaults.key),
        token: std::env::var("TRELLO_TOKEN").unwrap_or(defaults.token),
    };
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "mock trello api listening");
    mock_server::run_with(listener, auth).await
}
