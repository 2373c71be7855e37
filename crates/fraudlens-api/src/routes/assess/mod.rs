//! Assessment routes - Transaction check form and verdict
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_assessment, htmx_assess_dismiss, htmx_assess_field, htmx_assess_reset, htmx_assess_submit};
pub use page::page_assess;
