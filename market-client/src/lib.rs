//! Market Client - headless core of the marketplace admin console
//!
//! Every entity screen of the console is driven by the same pieces:
//! an HTTP adapter bound to the session, a paginated list controller,
//! a mutation controller for the create/edit modal, a detail view and
//! CSV export. Resources plug in through [`Resource`] and [`Editable`].

pub mod config;
pub mod detail;
pub mod error;
pub mod export;
pub mod http;
pub mod list;
pub mod mutation;
pub mod orders;
pub mod resources;
pub mod session;
pub mod totals;

pub use config::{ApiGroup, AuthScheme, ClientConfig, EndpointGroup};
pub use detail::DetailView;
pub use error::{ClientError, ClientResult, ErrorContext};
pub use export::{export_filename, to_csv, write_export, Column};
pub use http::{HttpClient, NetworkHttpClient};
pub use list::{
    FetchOutcome, ListController, ListEndpoint, ListQuery, ListSchema, ListState, PageSize,
    Pagination, SortDirection, StatusFilter,
};
pub use mutation::{
    FormMode, FormSchema, MutationController, MutationEndpoint, MutationFormState,
    SubmitOutcome, ValidationErrors,
};
pub use orders::{LineItemDraft, OrderComposer, OrderDraft, OrderReceipt};
pub use resources::{Editable, Resource};
pub use session::{
    FileTokenStore, MemoryTokenStore, SessionContext, SessionPhase, SessionState, SessionStore,
    TokenStore,
};

// Re-export shared types for convenience
pub use shared::{Identity, LoginRequest, Role};
