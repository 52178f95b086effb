#![allow(dead_code)]

use annotator_core::{CoreConfig, SessionContext};
use axum::Router;
use tempfile::TempDir;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn config(api_url: &str, dir: &TempDir) -> CoreConfig {
    let mut config = CoreConfig::new(api_url, dir.path());
    config.api_key = Some("test-key".to_string());
    config
}

pub async fn session(router: Router) -> (SessionContext, TempDir) {
    let url = serve(router).await;
    let dir = TempDir::new().unwrap();
    let ctx = SessionContext::connect(config(&url, &dir)).unwrap();
    (ctx, dir)
}
