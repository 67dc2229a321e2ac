// market-client/tests/support/mod.rs
// In-process stub backend

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use market_client::{ClientConfig, NetworkHttpClient, SessionContext, TokenStore};

/// Serve a router on an ephemeral port, returning its base URL
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing listens on
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn client(base_url: &str, store: Arc<dyn TokenStore>) -> Arc<NetworkHttpClient> {
    let config = ClientConfig::new(base_url).with_timeout(5);
    Arc::new(NetworkHttpClient::new(config, SessionContext::new(store)).unwrap())
}

pub fn ephemeral_client(base_url: &str) -> Arc<NetworkHttpClient> {
    client(base_url, Arc::new(market_client::MemoryTokenStore::new()))
}

/// Request counter shared with handlers
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("market_client=debug")
        .with_test_writer()
        .try_init();
}
