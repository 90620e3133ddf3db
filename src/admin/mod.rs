//! Admin console domain

mod service;

pub use service::{AdminError, AdminService};
