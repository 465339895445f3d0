pub mod analysis;
pub mod config;
pub mod errors;
pub mod routes;
pub mod state;
