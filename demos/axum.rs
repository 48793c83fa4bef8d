/* demos/axum.rs */

use axum::{Router, extract::ConnectInfo, response::Json, routing::get};
use clientip::{ClientIp, ClientIpLayer, IpResolver, LocalAddr};
use serde_json::json;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = create_app();
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    println!("Server starting on http://localhost:3000");
    println!("Test endpoints:");
    println!("  • GET /ip            - client address (left-most X-Forwarded-For)");
    println!("  • GET /public        - public client address");
    println!("  • GET /debug         - connection and header details");
    println!();
    println!("Test with headers:");
    println!("  curl -H 'X-Forwarded-For: 192.168.5.45, 89.5.6.1' http://localhost:3000/ip");
    println!("  curl -H 'X-Forwarded-For: 192.168.5.45, 89.5.6.1' http://localhost:3000/public");
    println!();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

fn create_app() -> Router {
    let client_router = Router::new()
        .route("/", get(ip_handler))
        .layer(ClientIpLayer::new());

    let public_router = Router::new()
        .route("/", get(public_handler))
        .layer(ClientIpLayer::public());

    Router::new()
        .nest("/ip", client_router)
        .nest("/public", public_router)
        .route("/debug", get(debug_handler))
}

/// Handler that returns the client address in JSON format
async fn ip_handler(client_ip: ClientIp) -> Json<serde_json::Value> {
    Json(json!({
        "client_ip": client_ip.as_str(),
        "is_local": client_ip.as_str().is_local(),
        "resolution": "client",
    }))
}

/// Handler that only reports public addresses
async fn public_handler(req: axum::extract::Request) -> Json<serde_json::Value> {
    match req.extensions().get::<ClientIp>() {
        Some(ip) => Json(json!({
            "public_ip": ip.as_str(),
            "ip_version": match ip.ip() {
                Some(std::net::IpAddr::V4(_)) => "IPv4",
                Some(std::net::IpAddr::V6(_)) => "IPv6",
                None => "unknown",
            },
        })),
        None => Json(json!({"error": "No public client address"})),
    }
}

/// Debug handler showing both resolutions side by side
async fn debug_handler(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: axum::http::HeaderMap,
) -> Json<serde_json::Value> {
    let mut req = clientip::RequestParts::new(addr.to_string());
    for name in [clientip::X_FORWARDED_FOR, clientip::X_REAL_IP] {
        if let Some(value) = headers.get(name).and_then(|value| value.to_str().ok()) {
            req = req.with_header(name, value);
        }
    }

    let resolver = IpResolver::new();
    Json(json!({
        "connection_info": {
            "remote_addr": addr.to_string(),
            "remote_ip": resolver.remote_ip(&req),
        },
        "ip_related_headers": req.headers,
        "client_ip": resolver.client_ip(&req),
        "client_public_ip": resolver.client_public_ip(&req),
    }))
}
