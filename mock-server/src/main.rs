use mock_server::{MockState, DEFAULT_API_KEY};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("MOCK_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
    let addr = format!("127.0.0.1:{port}");

    let state = MockState::seeded();
    if api_key != DEFAULT_API_KEY {
        state.set_api_key(&api_key).await;
    }

    let listener = TcpListener::bind(&addr).await?;
    info!("listening on http://{addr}/3/");
    mock_server::run_with_state(listener, state).await
}
