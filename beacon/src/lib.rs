pub mod api;
pub mod assets;
pub mod client;
pub mod config;
pub mod hit;
pub mod prometheus;
pub mod relay;
pub mod router;
pub mod server;
pub mod sink;
