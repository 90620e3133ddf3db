//! Resource catalog domain

mod service;
mod storage;

pub use service::{ResourceError, ResourceService};
pub use storage::FileStore;
