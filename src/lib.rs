//! binance-tools - Binance public market-data exposed as callable tools
//!
//! A thin upstream client for the read-only `/api/v3` endpoints, a fixed
//! catalog of twelve tools mapped onto it, and a stdio server that lets a
//! conversational agent list and invoke those tools.

pub mod error;
pub mod ipc;
pub mod tools;
pub mod upstream;

pub use error::{GatewayError, Result};
