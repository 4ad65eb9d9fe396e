pub mod config;
pub mod fixture;
pub mod progress;
pub mod transfer;
pub mod transport;
pub mod types;
