//! Tool gateway - resolves a tool call to one upstream request
//!
//! The upstream JSON is re-encoded to a string exactly once, here, so every
//! tool in the catalog returns the same output shape.

use log::{debug, info, warn};
use serde_json::Value;

use crate::error::{GatewayError, Result};
use crate::upstream::{BinanceClient, Endpoint, KlinesQuery, RollingWindowQuery, TickerType};

use super::args::ToolArgs;
use super::catalog::{ToolCatalog, ToolName};
use super::definition::ToolDefinition;

/// Successful tool output: the upstream body as a JSON string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub tool: ToolName,
    pub content: String,
}

impl ToolOutput {
    fn encode(tool: ToolName, payload: &Value) -> Result<Self> {
        Ok(Self {
            tool,
            content: serde_json::to_string(payload)?,
        })
    }
}

/// Translates tool invocations into upstream calls
#[derive(Clone)]
pub struct ToolGateway {
    client: BinanceClient,
    catalog: ToolCatalog,
}

impl ToolGateway {
    /// Create a gateway exposing the plain catalog
    pub fn new(client: BinanceClient) -> Self {
        Self {
            client,
            catalog: ToolCatalog::new(),
        }
    }

    /// Replace the catalog (e.g. to advertise prefixed names)
    pub fn with_catalog(mut self, catalog: ToolCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Definitions of every tool, in catalog order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.catalog.definitions()
    }

    /// Invoke a tool by its advertised name
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<ToolOutput> {
        let tool = self
            .catalog
            .resolve(name)
            .ok_or_else(|| GatewayError::UnknownTool(name.to_string()))?;

        let args = ToolArgs::parse(tool.spec(), arguments)?;
        info!("Invoking {} ({})", tool, tool.spec().endpoint);

        match self.dispatch(tool.spec().endpoint, &args).await {
            Ok(payload) => {
                let output = ToolOutput::encode(tool, &payload)?;
                debug!("{} returned {} bytes", tool, output.content.len());
                Ok(output)
            }
            Err(e) => {
                warn!("{} failed: {}", tool, e);
                Err(e)
            }
        }
    }

    /// Route on the endpoint recorded in the tool's catalog entry
    async fn dispatch(&self, endpoint: Endpoint, args: &ToolArgs) -> Result<Value> {
        match endpoint {
            // Shared by the single-symbol and all-symbols tools; the schema decides which
            Endpoint::ExchangeInfo => self.client.exchange_info(args.text("symbol")).await,
            Endpoint::Klines => {
                let query = KlinesQuery {
                    symbol: args.require_text("symbol")?.to_string(),
                    interval: args.require_text("interval")?.to_string(),
                    start_time: args.integer("startTime"),
                    end_time: args.integer("endTime"),
                    limit: args.integer("limit"),
                };
                self.client.klines(&query).await
            }
            Endpoint::AggTrades => self.client.agg_trades(args.require_text("symbol")?).await,
            Endpoint::HistoricalTrades => {
                self.client
                    .historical_trades(args.require_text("symbol")?)
                    .await
            }
            Endpoint::Depth => self.client.depth(args.require_text("symbol")?).await,
            Endpoint::AvgPrice => self.client.avg_price(args.require_text("symbol")?).await,
            Endpoint::Ticker24hr => self.client.ticker_24hr(args.require_text("symbol")?).await,
            Endpoint::TickerTradingDay => {
                let symbols = args.require_list("symbols")?;
                self.client.ticker_trading_day(&symbols).await
            }
            Endpoint::TickerPrice => {
                let symbols = args.list("symbols");
                self.client
                    .ticker_price(args.text("symbol"), symbols.as_deref())
                    .await
            }
            Endpoint::TickerBookTicker => {
                let symbols = args.list("symbols");
                self.client
                    .ticker_book_ticker(args.text("symbol"), symbols.as_deref())
                    .await
            }
            Endpoint::TickerRollingWindow => {
                let query = RollingWindowQuery {
                    symbol: args.text("symbol").map(str::to_string),
                    symbols: args.list("symbols"),
                    window_size: args.text("windowSize").map(str::to_string),
                    ticker_type: args.text("type").map(str::parse::<TickerType>).transpose()?,
                };
                self.client.ticker_rolling_window(&query).await
            }
        }
    }
}
