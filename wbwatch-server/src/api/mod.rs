//! HTTP API handlers for wbwatch-server

pub mod auth;
pub mod error;
pub mod health;
pub mod products;
pub mod subscribe;

pub use auth::{auth_middleware, login};
pub use error::ApiError;
pub use health::health_routes;
pub use products::get_product;
pub use subscribe::subscribe_product;
