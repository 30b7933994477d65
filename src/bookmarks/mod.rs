//! Read-only bookmark endpoints

pub mod handlers;
pub mod service;

pub use handlers::{get_bookmark, list_bookmarks};
pub use service::{BOOKMARK_NOT_FOUND, BookmarkService};
