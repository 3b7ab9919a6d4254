//! Storage infrastructure - Blob store adapters and snapshot persistence

mod factory;
mod filesystem;
mod http;
mod in_memory;
mod snapshot;

pub use factory::{BlobStoreFactory, StorageType};
pub use filesystem::FileSystemBlobStore;
pub use http::HttpBlobStore;
pub use in_memory::InMemoryBlobStore;
pub use snapshot::{encode_snapshot, SnapshotStore};
