//! Collaborator interfaces: page fetching and record persistence.

pub mod fetcher;
pub mod store;

pub use fetcher::{CatalogFetcher, FetchedPage};
pub use store::RecordStore;
