//! Route modules for the host
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints and HTMX fragments
//! - page.rs: Full page rendering

pub mod assess;
pub mod history;
