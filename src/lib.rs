pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod playlist;
pub mod registry;
pub mod services;
pub mod sources;
pub mod utils;
