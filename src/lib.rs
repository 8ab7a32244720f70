// Library exports for postboard
// This allows integration tests and the binary to share the same modules

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod listing;
pub mod routes;
pub mod seed;
pub mod state;
pub mod validation;
