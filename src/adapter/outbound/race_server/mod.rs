//! Race server integration: WebSocket push channel and REST API.

pub mod client;
pub mod dto;
pub mod stream;

pub use client::RaceServerClient;
pub use stream::WebSocketPushStream;
