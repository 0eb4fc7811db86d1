pub mod batch;
pub mod http_store;
pub mod reconcile;
pub mod store;
pub mod transcripts;

#[cfg(test)]
pub mod memory_store;
