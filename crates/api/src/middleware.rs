/// Admin authentication
pub mod auth;
/// Error to response mapping
pub mod error_handling;
