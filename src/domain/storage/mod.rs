//! Storage domain - durable blob storage contract

mod blob_store;

pub use blob_store::BlobStore;

#[cfg(test)]
pub use blob_store::MockBlobStore;
