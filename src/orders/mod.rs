//! Order domain

mod expiry;
mod service;

pub use expiry::expiry_sweeper;
pub use service::{OrderError, OrderService};
