//! The fixed tool catalog
//!
//! Twelve tools, each bound to exactly one upstream endpoint. The catalog
//! is static; the only runtime knob is an optional name prefix.

use std::fmt;

use crate::upstream::Endpoint;

use super::definition::{ParamKind, ParamSpec, ToolDefinition, ToolSpec};

const SYMBOL: ParamSpec = ParamSpec::required(
    "symbol",
    ParamKind::String,
    "The symbol to query (e.g. \"BTCUSDT\")",
);
const SYMBOLS: ParamSpec = ParamSpec::required(
    "symbols",
    ParamKind::StringList,
    "List of symbols to query (e.g. [\"BTCUSDT\", \"ETHUSDT\"])",
);
const OPT_SYMBOL: ParamSpec = ParamSpec::optional(
    "symbol",
    ParamKind::String,
    "Optional single symbol to query",
);
const OPT_SYMBOLS: ParamSpec = ParamSpec::optional(
    "symbols",
    ParamKind::StringList,
    "Optional list of symbols to query",
);
const INTERVAL: ParamSpec = ParamSpec::required(
    "interval",
    ParamKind::String,
    "The interval for the kline data (e.g. \"1m\", \"1h\", \"1d\")",
);
const START_TIME: ParamSpec = ParamSpec::optional(
    "startTime",
    ParamKind::Integer,
    "Optional start time in milliseconds",
);
const END_TIME: ParamSpec = ParamSpec::optional(
    "endTime",
    ParamKind::Integer,
    "Optional end time in milliseconds",
);
const LIMIT: ParamSpec = ParamSpec::optional(
    "limit",
    ParamKind::Integer,
    "Optional limit of records to return",
);
const WINDOW_SIZE: ParamSpec = ParamSpec::optional(
    "windowSize",
    ParamKind::String,
    "Optional window size, e.g. \"1d\"",
);
const TICKER_TYPE: ParamSpec = ParamSpec::optional(
    "type",
    ParamKind::Choice(&["FULL", "MINI"]),
    "Optional type of response, either \"FULL\" or \"MINI\"",
);

static EXCHANGE_INFO_OF_A_SYMBOL: ToolSpec = ToolSpec {
    name: "ExchangeInfoOfASymbol",
    description: "Get exchange information for a specific symbol.",
    endpoint: Endpoint::ExchangeInfo,
    params: &[SYMBOL],
};

static EXCHANGE_INFO_OF_ALL_SYMBOLS: ToolSpec = ToolSpec {
    name: "ExchangeInfoOfAllSymbols",
    description: "Get exchange information for all symbols.",
    endpoint: Endpoint::ExchangeInfo,
    params: &[],
};

static GET_TRADE_DATA: ToolSpec = ToolSpec {
    name: "GetTradeData",
    description: "Get kline/candlestick data for a symbol.",
    endpoint: Endpoint::Klines,
    params: &[SYMBOL, INTERVAL, START_TIME, END_TIME, LIMIT],
};

static AGG_TRADES: ToolSpec = ToolSpec {
    name: "AggTrades",
    description: "Get the 20 most recent aggregate trades for a symbol.",
    endpoint: Endpoint::AggTrades,
    params: &[SYMBOL],
};

static TRADE_HISTORY: ToolSpec = ToolSpec {
    name: "TradeHistory",
    description: "Get the 20 most recent trades for a symbol.",
    endpoint: Endpoint::HistoricalTrades,
    params: &[SYMBOL],
};

static DEPTH: ToolSpec = ToolSpec {
    name: "Depth",
    description: "Get order book depth for a symbol.",
    endpoint: Endpoint::Depth,
    params: &[SYMBOL],
};

static CURRENT_AVG_PRICE: ToolSpec = ToolSpec {
    name: "CurrentAvgPrice",
    description: "Get current average price for a symbol.",
    endpoint: Endpoint::AvgPrice,
    params: &[SYMBOL],
};

static PRICE_TICKER_IN_24HR: ToolSpec = ToolSpec {
    name: "PriceTickerIn24Hr",
    description: "Get 24hr price change statistics for a symbol.",
    endpoint: Endpoint::Ticker24hr,
    params: &[SYMBOL],
};

static TRADING_DAY_TICKER: ToolSpec = ToolSpec {
    name: "TradingDayTicker",
    description: "Get trading day price change statistics for a list of symbols.",
    endpoint: Endpoint::TickerTradingDay,
    params: &[SYMBOLS],
};

static SYMBOL_PRICE_TICKER: ToolSpec = ToolSpec {
    name: "SymbolPriceTicker",
    description: "Get the latest price for a symbol, a list of symbols, or all symbols.",
    endpoint: Endpoint::TickerPrice,
    params: &[OPT_SYMBOL, OPT_SYMBOLS],
};

static SYMBOL_ORDER_BOOK_TICKER: ToolSpec = ToolSpec {
    name: "SymbolOrderBookTicker",
    description: "Get the best bid/ask for a symbol, a list of symbols, or all symbols.",
    endpoint: Endpoint::TickerBookTicker,
    params: &[OPT_SYMBOL, OPT_SYMBOLS],
};

static ROLLING_WINDOW_TICKER: ToolSpec = ToolSpec {
    name: "RollingWindowTicker",
    description: "Get rolling window price change statistics.",
    endpoint: Endpoint::TickerRollingWindow,
    params: &[OPT_SYMBOL, OPT_SYMBOLS, WINDOW_SIZE, TICKER_TYPE],
};

/// Identifies one tool of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ExchangeInfoOfASymbol,
    ExchangeInfoOfAllSymbols,
    GetTradeData,
    AggTrades,
    TradeHistory,
    Depth,
    CurrentAvgPrice,
    PriceTickerIn24Hr,
    TradingDayTicker,
    SymbolPriceTicker,
    SymbolOrderBookTicker,
    RollingWindowTicker,
}

impl ToolName {
    /// Every tool, in catalog order
    pub const ALL: [ToolName; 12] = [
        Self::ExchangeInfoOfASymbol,
        Self::ExchangeInfoOfAllSymbols,
        Self::GetTradeData,
        Self::AggTrades,
        Self::TradeHistory,
        Self::Depth,
        Self::CurrentAvgPrice,
        Self::PriceTickerIn24Hr,
        Self::TradingDayTicker,
        Self::SymbolPriceTicker,
        Self::SymbolOrderBookTicker,
        Self::RollingWindowTicker,
    ];

    pub fn spec(&self) -> &'static ToolSpec {
        match self {
            Self::ExchangeInfoOfASymbol => &EXCHANGE_INFO_OF_A_SYMBOL,
            Self::ExchangeInfoOfAllSymbols => &EXCHANGE_INFO_OF_ALL_SYMBOLS,
            Self::GetTradeData => &GET_TRADE_DATA,
            Self::AggTrades => &AGG_TRADES,
            Self::TradeHistory => &TRADE_HISTORY,
            Self::Depth => &DEPTH,
            Self::CurrentAvgPrice => &CURRENT_AVG_PRICE,
            Self::PriceTickerIn24Hr => &PRICE_TICKER_IN_24HR,
            Self::TradingDayTicker => &TRADING_DAY_TICKER,
            Self::SymbolPriceTicker => &SYMBOL_PRICE_TICKER,
            Self::SymbolOrderBookTicker => &SYMBOL_ORDER_BOOK_TICKER,
            Self::RollingWindowTicker => &ROLLING_WINDOW_TICKER,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.spec().name
    }

    /// Parse an unprefixed tool name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The advertised tool set
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    prefix: String,
}

impl ToolCatalog {
    /// Catalog advertising the plain tool names
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog advertising every tool as `<prefix><Name>`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Name under which a tool is advertised
    pub fn advertised_name(&self, tool: ToolName) -> String {
        format!("{}{}", self.prefix, tool.as_str())
    }

    /// Resolve an advertised name back to a tool
    pub fn resolve(&self, name: &str) -> Option<ToolName> {
        name.strip_prefix(self.prefix.as_str()).and_then(ToolName::from_name)
    }

    /// Advertised names, in catalog order
    pub fn list(&self) -> Vec<String> {
        ToolName::ALL.iter().map(|t| self.advertised_name(*t)).collect()
    }

    /// Definitions for every tool, in catalog order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        ToolName::ALL
            .iter()
            .map(|t| t.spec().to_definition(self.advertised_name(*t)))
            .collect()
    }

    pub fn len(&self) -> usize {
        ToolName::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}
