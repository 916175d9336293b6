//! Upstream client - single GET requests against the exchange REST API

mod client;
mod mock;
mod query;
mod transport;

pub use client::{
    BinanceClient, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, Endpoint, KlinesQuery, RollingWindowQuery,
    TRADES_LIMIT, TickerType,
};
pub use mock::MockTransport;
pub use query::{QueryParams, QueryValue, normalize};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport, UpstreamRequest};
