//! List query controller

mod controller;
mod query;

pub use controller::{FetchOutcome, ListController, ListState};
pub use query::{
    clamp_offset, last_page_offset, page_count, ListEndpoint, ListQuery, ListSchema, PageSize,
    Pagination, SortDirection, SortSpec, StatusFilter,
};
