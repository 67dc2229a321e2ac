// market-client/tests/list_controller.rs
// List controller against a stub backend

mod support;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use market_client::{
    ClientError, FetchOutcome, FileTokenStore, ListController, PageSize, SessionPhase,
    SortDirection, TokenStore,
};
use serde_json::{json, Value};
use shared::models::{Affiliate, Voucher};
use support::Hits;

#[derive(Clone)]
struct Backend {
    hits: Hits,
    total: Arc<AtomicU64>,
}

impl Backend {
    fn new(total: u64) -> Self {
        Self {
            hits: Hits::default(),
            total: Arc::new(AtomicU64::new(total)),
        }
    }
}

fn param(params: &HashMap<String, String>, key: &str) -> u64 {
    params.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Affiliates `1..=total`, sliced by limit/offset
///
/// `q=slow` answers late, `q=boom` fails, any other `q` names every row.
async fn list_affiliates(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    backend.hits.bump();
    let q = params.get("q").cloned().unwrap_or_default();
    if q == "slow" {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    if q == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "db down" })));
    }

    let total = backend.total.load(Ordering::SeqCst);
    let limit = param(&params, "limit").max(1);
    let offset = param(&params, "offset");
    let rows: Vec<Value> = (offset + 1..=total)
        .take(limit as usize)
        .map(|id| {
            let name = if q.is_empty() { format!("Affiliate {}", id) } else { q.clone() };
            json!({ "id": id, "name_affiliate": name, "status": 1 })
        })
        .collect();
    (StatusCode::OK, Json(json!({ "affiliates": rows, "pagination": { "total": total } })))
}

/// Echoes the Authorization header as the row name
async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    Json(json!({
        "affiliates": [{ "id": 1, "name_affiliate": auth }],
        "vouchers": [{ "id_voucher": 1, "name_voucher": auth }],
        "total": 1,
    }))
}

async fn unauthorized() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Token expired" })))
}

async fn setup(total: u64) -> (ListController<Affiliate, market_client::NetworkHttpClient>, Backend) {
    support::init_tracing();
    let backend = Backend::new(total);
    let app = Router::new()
        .route("/affiliate/list-affiliate", get(list_affiliates))
        .with_state(backend.clone());
    let base = support::serve(app).await;
    (ListController::new(support::ephemeral_client(&base)), backend)
}

#[tokio::test]
async fn test_last_issued_request_wins() {
    let (list, _) = setup(5).await;

    let slow = list.set_filter("slow");
    let fast = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        list.set_filter("fast").await
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap(), FetchOutcome::Stale);
    assert_eq!(fast.unwrap(), FetchOutcome::Applied);

    let state = list.state();
    assert_eq!(state.query.filter_text, "fast");
    assert!(!state.is_loading);
    assert!(state.rows.iter().all(|r| r.name_affiliate == "fast"));
}

#[tokio::test]
async fn test_last_page_of_paginated_list() {
    let (list, _) = setup(28).await;

    assert_eq!(list.refresh().await.unwrap(), FetchOutcome::Applied);
    assert_eq!(list.state().total_count, 28);
    assert_eq!(list.state().rows.len(), 10);

    list.go_to_page(3).await.unwrap();
    let state = list.state();
    assert_eq!(state.query.offset, 20);
    assert_eq!(state.rows.len(), 8);
    assert_eq!(state.page_number(), 3);
    assert_eq!(state.page_count(), 3);
    assert!(!state.has_next());
    assert!(state.has_prev());
    assert_eq!(state.rows[0].id, 21);
}

#[tokio::test]
async fn test_paging_is_clamped() {
    let (list, backend) = setup(28).await;
    list.refresh().await.unwrap();

    assert_eq!(list.prev_page().await.unwrap(), FetchOutcome::Unchanged);
    list.go_to_page(99).await.unwrap();
    assert_eq!(list.state().query.offset, 20);

    let before = backend.hits.get();
    assert_eq!(list.next_page().await.unwrap(), FetchOutcome::Unchanged);
    assert_eq!(backend.hits.get(), before);

    list.prev_page().await.unwrap();
    assert_eq!(list.state().query.offset, 10);
    assert_eq!(list.state().rows[0].id, 11);
}

#[tokio::test]
async fn test_out_of_range_pages_clamp() {
    let (list, _) = setup(28).await;
    list.refresh().await.unwrap();

    list.go_to_page(u64::MAX).await.unwrap();
    assert_eq!(list.state().query.offset, 20);
    assert_eq!(list.state().rows.len(), 8);
    assert_eq!(list.next_page().await.unwrap(), FetchOutcome::Unchanged);

    list.go_to_page(0).await.unwrap();
    assert_eq!(list.state().query.offset, 0);

    list.set_page_size(PageSize::Fifty).await.unwrap();
    assert_eq!(list.go_to_page(u64::MAX).await.unwrap(), FetchOutcome::Unchanged);
    assert_eq!(list.state().query.offset, 0);

    let mut far = list.state().query;
    far.offset = u64::MAX;
    list.set_query(far).await.unwrap();
    assert_eq!(list.state().query.offset, 0);
    assert_eq!(list.state().rows.len(), 28);
}

#[tokio::test]
async fn test_input_changes_reset_offset() {
    let (list, _) = setup(28).await;
    list.refresh().await.unwrap();
    list.go_to_page(3).await.unwrap();

    list.set_page_size(PageSize::Twenty).await.unwrap();
    let state = list.state();
    assert_eq!(state.query.offset, 0);
    assert_eq!(state.rows.len(), 20);
    assert_eq!(state.page_count(), 2);

    list.next_page().await.unwrap();
    assert_eq!(list.state().query.offset, 20);
    list.set_status(Some("active")).await.unwrap();
    assert_eq!(list.state().query.offset, 0);
    assert_eq!(list.state().query.status.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_unchanged_input_fetches_nothing() {
    let (list, backend) = setup(3).await;
    list.set_filter("abc").await.unwrap();
    let hits = backend.hits.get();

    assert_eq!(list.set_filter("abc").await.unwrap(), FetchOutcome::Unchanged);
    assert_eq!(backend.hits.get(), hits);

    assert_eq!(list.refresh().await.unwrap(), FetchOutcome::Applied);
    assert_eq!(backend.hits.get(), hits + 1);
}

#[tokio::test]
async fn test_failed_fetch_keeps_last_rows() {
    let (list, _) = setup(4).await;
    list.refresh().await.unwrap();
    assert_eq!(list.state().rows.len(), 4);

    let err = list.set_filter("boom").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 500, .. }));

    let state = list.state();
    assert_eq!(state.rows.len(), 4);
    assert_eq!(state.rows[0].name_affiliate, "Affiliate 1");
    assert_eq!(state.error_message.as_deref(), Some("db down"));
    assert!(!state.is_loading);

    list.set_filter("").await.unwrap();
    assert!(list.state().error_message.is_none());
}

#[tokio::test]
async fn test_shrinking_total_refetches_last_page() {
    let (list, backend) = setup(28).await;
    list.refresh().await.unwrap();
    list.go_to_page(3).await.unwrap();

    backend.total.store(15, Ordering::SeqCst);
    assert_eq!(list.refresh().await.unwrap(), FetchOutcome::Applied);

    let state = list.state();
    assert_eq!(state.total_count, 15);
    assert_eq!(state.query.offset, 10);
    assert_eq!(state.rows.len(), 5);
    assert_eq!(state.rows[0].id, 11);
}

#[tokio::test]
async fn test_invalid_sort_rejected_without_request() {
    let (list, backend) = setup(3).await;

    let err = list.set_sort("password", SortDirection::Asc).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidQuery(_)));
    let err = list.set_extra_filter("vendorId", Some("1".into())).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidQuery(_)));
    assert_eq!(backend.hits.get(), 0);

    list.toggle_sort("name_affiliate").await.unwrap();
    let sort = list.state().query.sort.unwrap();
    assert_eq!(sort.field, "name_affiliate");
    assert_eq!(sort.direction, SortDirection::Asc);
    list.toggle_sort("name_affiliate").await.unwrap();
    assert_eq!(list.state().query.sort.unwrap().direction, SortDirection::Desc);
}

#[tokio::test]
async fn test_close_cancels_in_flight_fetch() {
    let (list, _) = setup(3).await;

    let pending = {
        let list = list.clone();
        tokio::spawn(async move { list.set_filter("slow").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    list.close();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(ClientError::Cancelled)));
    assert!(list.state().rows.is_empty());
    assert!(matches!(list.refresh().await, Err(ClientError::Cancelled)));
}

#[tokio::test]
async fn test_auth_header_per_group_read_at_call_time() {
    support::init_tracing();
    let app = Router::new()
        .route("/affiliate/list-affiliate", get(echo_auth))
        .route("/voucher/list-voucher", get(echo_auth));
    let base = support::serve(app).await;
    let http = support::ephemeral_client(&base);

    let affiliates: ListController<Affiliate, _> = ListController::new(http.clone());
    let vouchers: ListController<Voucher, _> = ListController::new(http.clone());

    affiliates.refresh().await.unwrap();
    assert_eq!(affiliates.state().rows[0].name_affiliate, "");

    use market_client::HttpClient;
    http.session().set_token("tok-1").unwrap();

    affiliates.refresh().await.unwrap();
    vouchers.refresh().await.unwrap();
    assert_eq!(affiliates.state().rows[0].name_affiliate, "Bearer tok-1");
    assert_eq!(vouchers.state().rows[0].name_voucher, "tok-1");
}

#[tokio::test]
async fn test_unauthorized_response_ends_session() {
    support::init_tracing();
    let dir = tempfile::TempDir::new().unwrap();
    let store = FileTokenStore::new(dir.path().join("session.json"));
    store.save("stale-token").unwrap();

    let app = Router::new().route("/affiliate/list-affiliate", get(unauthorized));
    let base = support::serve(app).await;
    let http = support::client(&base, Arc::new(store.clone()));

    use market_client::HttpClient;
    let mut watcher = http.session().subscribe();
    assert_eq!(http.session().token().as_deref(), Some("stale-token"));

    let list: ListController<Affiliate, _> = ListController::new(http.clone());
    let err = list.refresh().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));

    assert!(watcher.has_changed().unwrap());
    let session = watcher.borrow_and_update().clone();
    assert_eq!(session.phase, SessionPhase::Anonymous);
    assert!(http.session().token().is_none());
    assert!(!store.exists());
    assert_eq!(
        list.state().error_message.as_deref(),
        Some("Session expired, please log in again")
    );
}

#[tokio::test]
async fn test_set_query_fetches_once_and_clamps() {
    let (list, backend) = setup(28).await;

    let mut query = list.state().query;
    query.filter_text = "x".into();
    query.status = Some("suspended".into());
    query.page_size = PageSize::Twenty;
    query.offset = 60;
    list.set_query(query).await.unwrap();

    // One fetch past the end, one refetch of the clamped page
    assert_eq!(backend.hits.get(), 2);
    let state = list.state();
    assert_eq!(state.query.offset, 20);
    assert_eq!(state.query.status.as_deref(), Some("0"));
    assert_eq!(state.rows.len(), 8);

    let mut bad = list.state().query;
    bad.extra.insert("vendorId".into(), "3".into());
    assert!(matches!(list.set_query(bad).await, Err(ClientError::InvalidQuery(_))));
    assert_eq!(backend.hits.get(), 2);
}
