//! Deriv broker adapter.
//!
//! Talks to the Deriv WebSocket API v3: authorizes with an API token, reads
//! account details and pulls candle history with `ticks_history`.
//! Requests and responses are paired by `req_id`.

pub mod client;
pub mod protocol;

pub use client::{DerivClient, DerivClientFactory, DerivConfig};
