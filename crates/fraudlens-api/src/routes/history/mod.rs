//! History routes - Transaction list, search, sort, pagination
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_history, htmx_history_dismiss, htmx_history_list, htmx_history_reload};
pub use page::page_history;
