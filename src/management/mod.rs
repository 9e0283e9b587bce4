mod archive;
mod auth;
mod sync;

pub use archive::FeedArchive;
pub use auth::TokenManager;
pub use sync::SyncEngine;
pub use sync::map_item;
pub use sync::map_items;
pub use sync::store_new_records;
