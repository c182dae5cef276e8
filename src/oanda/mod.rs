//! OANDA module - live execution sink over the v20 REST API

pub mod client;
pub mod messages;

pub use client::OandaClient;
pub use messages::OrderRequest;
