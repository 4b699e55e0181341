//! Database module
//!
//! Pool initialization, schema creation, and row models shared by the
//! service crate.

pub mod init;
pub mod models;

pub use init::init_database;
