mod client;
mod models;

pub use client::JellyfinClient;
pub use models::{Item, ItemKind, Library, LibraryKind};

use crate::error::{FetchError, Result};

/// Read and delete operations the relocation engine needs from the media server
pub trait Catalog {
    fn list_libraries(&self) -> std::result::Result<Vec<Library>, FetchError>;

    /// Played items of a library, in catalog order
    fn list_watched_items(&self, library_id: &str) -> std::result::Result<Vec<Item>, FetchError>;

    /// Season numbers known for a library (may repeat across shows)
    fn list_seasons(&self, library_id: &str) -> std::result::Result<Vec<u32>, FetchError>;

    fn delete_item(&self, item_id: &str) -> Result<()>;
}
