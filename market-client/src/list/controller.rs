//! Paginated list controller
//!
//! One instance backs one entity screen. Every input change issues a fetch
//! tagged with a sequence number; a response is applied only if its number
//! is still the latest issued, so rapid typing or paging can never leave
//! rows from an older combination of inputs on screen.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use shared::ListPage;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::query::{clamp_offset, page_count, ListQuery, PageSize, SortDirection, SortSpec};
use crate::error::{ClientError, ClientResult, ErrorContext};
use crate::http::HttpClient;
use crate::resources::Resource;

/// What happened to the fetch a call issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the state
    Applied,
    /// A newer request was issued meanwhile; the response was dropped
    Stale,
    /// Inputs did not change, nothing was fetched
    Unchanged,
}

/// Observable list state
#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub query: ListQuery,
    pub total_count: u64,
    /// Rows of the most recently settled fetch
    pub rows: Vec<T>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl<T> ListState<T> {
    fn new(query: ListQuery) -> Self {
        Self {
            query,
            total_count: 0,
            rows: Vec::new(),
            is_loading: false,
            error_message: None,
        }
    }

    pub fn page_number(&self) -> u64 {
        self.query.page_number()
    }

    pub fn page_count(&self) -> u64 {
        page_count(self.total_count, self.query.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page_number() < self.page_count()
    }

    pub fn has_prev(&self) -> bool {
        self.query.offset > 0
    }
}

enum Settle {
    Applied,
    Stale,
    Failed(ClientError),
    Refetch(u64, ListQuery),
}

struct Inner<R, C> {
    http: Arc<C>,
    state: watch::Sender<ListState<R>>,
    /// Sequence number of the latest issued request
    latest: AtomicU64,
    cancel: CancellationToken,
}

/// List query controller for one resource
pub struct ListController<R: Resource, C: HttpClient> {
    inner: Arc<Inner<R, C>>,
}

impl<R: Resource, C: HttpClient> Clone for ListController<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Resource, C: HttpClient> ListController<R, C> {
    pub fn new(http: Arc<C>) -> Self {
        let query = ListQuery::for_schema(&R::list_schema());
        let (state, _) = watch::channel(ListState::new(query));
        Self {
            inner: Arc::new(Inner {
                http,
                state,
                latest: AtomicU64::new(0),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn state(&self) -> ListState<R> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<R>> {
        self.inner.state.subscribe()
    }

    /// Unmount: cancel in-flight fetches and ignore everything after
    pub fn close(&self) {
        if !self.inner.cancel.is_cancelled() {
            tracing::debug!(resource = R::NAME, "List controller closed");
            self.inner.cancel.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ========== Inputs ==========

    /// Refetch the current page
    pub async fn refresh(&self) -> ClientResult<FetchOutcome> {
        self.update(true, |_, _| Ok(())).await
    }

    pub async fn set_filter(&self, text: impl Into<String>) -> ClientResult<FetchOutcome> {
        let text = text.into();
        self.update(false, move |_, q| {
            if q.filter_text != text {
                q.filter_text = text;
                q.offset = 0;
            }
            Ok(())
        })
        .await
    }

    /// Set or clear the status filter; the value is checked against the schema
    pub async fn set_status(&self, status: Option<&str>) -> ClientResult<FetchOutcome> {
        let status = status
            .map(|s| R::list_schema().status_filter.normalize(s))
            .transpose()?;
        self.update(false, move |_, q| {
            if q.status != status {
                q.status = status;
                q.offset = 0;
            }
            Ok(())
        })
        .await
    }

    pub async fn set_sort(&self, field: &str, direction: SortDirection) -> ClientResult<FetchOutcome> {
        if !R::list_schema().is_sortable(field) {
            return Err(ClientError::InvalidQuery(format!(
                "{} cannot be sorted by '{}'",
                R::NAME,
                field
            )));
        }
        let sort = Some(SortSpec {
            field: field.to_string(),
            direction,
        });
        self.update(false, move |_, q| {
            if q.sort != sort {
                q.sort = sort;
                q.offset = 0;
            }
            Ok(())
        })
        .await
    }

    /// Column-header click: same field flips direction, a new field sorts ascending
    pub async fn toggle_sort(&self, field: &str) -> ClientResult<FetchOutcome> {
        let direction = match &self.inner.state.borrow().query.sort {
            Some(sort) if sort.field == field => sort.direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.set_sort(field, direction).await
    }

    pub async fn set_page_size(&self, size: PageSize) -> ClientResult<FetchOutcome> {
        self.update(false, move |_, q| {
            if q.page_size != size {
                q.page_size = size;
                q.offset = 0;
            }
            Ok(())
        })
        .await
    }

    /// Resource-specific filter such as `payment` or `from` on orders
    pub async fn set_extra_filter(
        &self,
        key: &str,
        value: Option<String>,
    ) -> ClientResult<FetchOutcome> {
        if !R::list_schema().extra_filters.contains(&key) {
            return Err(ClientError::InvalidQuery(format!(
                "{} has no filter '{}'",
                R::NAME,
                key
            )));
        }
        let key = key.to_string();
        let value = value.filter(|v| !v.trim().is_empty());
        self.update(false, move |_, q| {
            if q.extra.get(&key) != value.as_ref() {
                match value {
                    Some(v) => q.extra.insert(key, v),
                    None => q.extra.remove(&key),
                };
                q.offset = 0;
            }
            Ok(())
        })
        .await
    }

    /// Replace every input at once with a single fetch
    ///
    /// An offset past the last page is clamped once the total is known.
    pub async fn set_query(&self, mut query: ListQuery) -> ClientResult<FetchOutcome> {
        let schema = R::list_schema();
        if let Some(sort) = &query.sort
            && !schema.is_sortable(&sort.field)
        {
            return Err(ClientError::InvalidQuery(format!(
                "{} cannot be sorted by '{}'",
                R::NAME,
                sort.field
            )));
        }
        if let Some(key) = query.extra.keys().find(|k| !schema.extra_filters.contains(&k.as_str())) {
            return Err(ClientError::InvalidQuery(format!(
                "{} has no filter '{}'",
                R::NAME,
                key
            )));
        }
        query.status = query
            .status
            .map(|s| schema.status_filter.normalize(&s))
            .transpose()?;
        let size = query.page_size.get();
        query.offset = query.offset / size * size;
        self.update(false, move |_, q| {
            *q = query;
            Ok(())
        })
        .await
    }

    pub async fn next_page(&self) -> ClientResult<FetchOutcome> {
        self.update(false, |state, q| {
            let size = q.page_size;
            q.offset = clamp_offset(q.offset.saturating_add(size.get()), state.total_count, size);
            Ok(())
        })
        .await
    }

    pub async fn prev_page(&self) -> ClientResult<FetchOutcome> {
        self.update(false, |state, q| {
            let size = q.page_size;
            q.offset = clamp_offset(q.offset.saturating_sub(size.get()), state.total_count, size);
            Ok(())
        })
        .await
    }

    /// Jump to a 1-based page, clamped into range
    pub async fn go_to_page(&self, page: u64) -> ClientResult<FetchOutcome> {
        self.update(false, move |state, q| {
            let size = q.page_size;
            let wanted = page.saturating_sub(1).saturating_mul(size.get());
            q.offset = clamp_offset(wanted, state.total_count, size);
            Ok(())
        })
        .await
    }

    // ========== Fetch lifecycle ==========

    async fn update<F>(&self, force: bool, change: F) -> ClientResult<FetchOutcome>
    where
        F: FnOnce(&ListState<R>, &mut ListQuery) -> ClientResult<()>,
    {
        match self.issue(force, change)? {
            Some((seq, query)) => self.run(seq, query).await,
            None => Ok(FetchOutcome::Unchanged),
        }
    }

    /// Apply an input change and allocate a sequence number, atomically
    /// with respect to settling responses
    fn issue<F>(&self, force: bool, change: F) -> ClientResult<Option<(u64, ListQuery)>>
    where
        F: FnOnce(&ListState<R>, &mut ListQuery) -> ClientResult<()>,
    {
        if self.is_closed() {
            return Err(ClientError::Cancelled);
        }

        let mut issued = Ok(None);
        self.inner.state.send_if_modified(|state| {
            let mut next = state.query.clone();
            if let Err(e) = change(&*state, &mut next) {
                issued = Err(e);
                return false;
            }
            if !force && next == state.query {
                return false;
            }
            let seq = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
            state.query = next.clone();
            state.is_loading = true;
            issued = Ok(Some((seq, next)));
            true
        });
        issued
    }

    async fn run(&self, mut seq: u64, mut query: ListQuery) -> ClientResult<FetchOutcome> {
        loop {
            tracing::debug!(resource = R::NAME, seq, offset = query.offset, "Fetching list page");
            let result = tokio::select! {
                _ = self.inner.cancel.cancelled() => return Err(ClientError::Cancelled),
                result = self.fetch_page(&query) => result,
            };

            match self.settle(seq, result) {
                Settle::Applied => return Ok(FetchOutcome::Applied),
                Settle::Stale => {
                    tracing::debug!(resource = R::NAME, seq, "Discarding stale list response");
                    return Ok(FetchOutcome::Stale);
                }
                Settle::Failed(e) => return Err(e),
                Settle::Refetch(next_seq, next_query) => {
                    tracing::debug!(
                        resource = R::NAME,
                        offset = next_query.offset,
                        "Offset past the last page, refetching"
                    );
                    seq = next_seq;
                    query = next_query;
                }
            }
        }
    }

    fn settle(&self, seq: u64, result: ClientResult<ListPage<R>>) -> Settle {
        let mut settle = Settle::Stale;
        self.inner.state.send_if_modified(|state| {
            if self.is_closed() || self.inner.latest.load(Ordering::SeqCst) != seq {
                return false;
            }
            match result {
                Ok(page) => {
                    let size = state.query.page_size;
                    let clamped = clamp_offset(state.query.offset, page.total, size);
                    state.total_count = page.total;
                    state.error_message = None;
                    if clamped != state.query.offset {
                        let next_seq = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
                        state.query.offset = clamped;
                        settle = Settle::Refetch(next_seq, state.query.clone());
                    } else {
                        state.rows = page.rows;
                        state.is_loading = false;
                        settle = Settle::Applied;
                    }
                }
                Err(e) => {
                    // Rows stay as the last successful page
                    state.is_loading = false;
                    state.error_message = Some(e.user_message(ErrorContext::Fetch));
                    tracing::warn!(resource = R::NAME, error = %e, "List fetch failed");
                    settle = Settle::Failed(e);
                }
            }
            true
        });
        settle
    }

    async fn fetch_page(&self, query: &ListQuery) -> ClientResult<ListPage<R>> {
        let endpoint = R::list_endpoint();
        let params = query.to_params(&endpoint);
        let body: serde_json::Value = self
            .inner
            .http
            .get(endpoint.group, endpoint.path, &params)
            .await?;
        Ok(ListPage::from_response(body, endpoint.rows_key)?.decode::<R>()?)
    }
}
