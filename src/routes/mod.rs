//! Route definitions for the Tradepost API

mod admin;
mod auth;
mod config;
mod orders;
mod payments;
mod resources;
mod users;
mod webhooks;

pub use admin::admin_routes;
pub use auth::auth_routes;
pub use config::config_routes;
pub use orders::order_routes;
pub use payments::payment_routes;
pub use resources::resource_routes;
pub use users::user_routes;
pub use webhooks::webhook_routes;
