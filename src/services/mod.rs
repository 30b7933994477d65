pub mod store;

pub use store::{BookmarkStore, InMemoryBookmarkStore, SqliteBookmarkStore, StoreError};
