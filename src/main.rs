//! Chat Relay Server - Binary Entry Point

use std::sync::Arc;

use chat_relay::api::http::create_router;
use chat_relay::api::websocket::state::AppState;
use chat_relay::config::RelayConfig;
use chat_relay::relay::ChatService;

#[tokio::main]
async fn main() {
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let bind_addr = config.bind_addr;
    let service = ChatService::start(config);
    let state = Arc::new(AppState::new(Arc::clone(&service)));
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("Failed to bind {}: {}", bind_addr, err);
            std::process::exit(1);
        }
    };

    println!("listening on {}", bind_addr);

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {}", err);
    }

    service.shutdown();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        println!("Shutting down");
    }
}
