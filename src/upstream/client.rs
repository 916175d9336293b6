//! Binance public market-data client
//!
//! One method per upstream endpoint. Every method builds its query through
//! `normalize`, performs exactly one GET, and returns the decoded JSON body.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use crate::error::{GatewayError, Result};

use super::query::{QueryValue, normalize};
use super::transport::{HttpTransport, ReqwestTransport, UpstreamRequest};

/// Binance spot API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com/api/v3/";

/// Default per-request deadline
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Fixed page size for the trade listing endpoints
pub const TRADES_LIMIT: i64 = 20;

/// Upstream REST resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ExchangeInfo,
    Klines,
    AggTrades,
    HistoricalTrades,
    Depth,
    AvgPrice,
    Ticker24hr,
    TickerTradingDay,
    TickerPrice,
    TickerBookTicker,
    TickerRollingWindow,
}

impl Endpoint {
    /// Path relative to the API base
    pub fn path(&self) -> &'static str {
        match self {
            Self::ExchangeInfo => "exchangeInfo",
            Self::Klines => "klines",
            Self::AggTrades => "aggTrades",
            Self::HistoricalTrades => "historicalTrades",
            Self::Depth => "depth",
            Self::AvgPrice => "avgPrice",
            Self::Ticker24hr => "ticker/24hr",
            Self::TickerTradingDay => "ticker/tradingDay",
            Self::TickerPrice => "ticker/price",
            Self::TickerBookTicker => "ticker/bookTicker",
            Self::TickerRollingWindow => "ticker",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Response flavour for the rolling window ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerType {
    Full,
    Mini,
}

impl TickerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Mini => "MINI",
        }
    }
}

impl FromStr for TickerType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FULL" => Ok(Self::Full),
            "MINI" => Ok(Self::Mini),
            other => Err(GatewayError::InvalidArgument(format!(
                "type must be FULL or MINI, got '{}'",
                other
            ))),
        }
    }
}

/// Kline/candlestick query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KlinesQuery {
    pub symbol: String,
    pub interval: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub limit: Option<i64>,
}

impl KlinesQuery {
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            ..Default::default()
        }
    }
}

/// Rolling window price change statistics query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollingWindowQuery {
    pub symbol: Option<String>,
    pub symbols: Option<Vec<String>>,
    pub window_size: Option<String>,
    pub ticker_type: Option<TickerType>,
}

/// Configuration for the upstream client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stateless market-data client; cheap to clone and safe to share
#[derive(Clone)]
pub struct BinanceClient {
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
}

impl BinanceClient {
    /// Create a client backed by reqwest
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.user_agent)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(transport: Arc<dyn HttpTransport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint.path())
    }

    /// Build the request for an endpoint without sending it
    pub fn build_request<'a, I>(&self, endpoint: Endpoint, params: I) -> Result<UpstreamRequest>
    where
        I: IntoIterator<Item = (&'a str, QueryValue)>,
    {
        Ok(UpstreamRequest {
            endpoint: endpoint.path().to_string(),
            url: self.endpoint_url(endpoint),
            query: normalize(params)?,
            timeout: self.config.timeout,
        })
    }

    async fn fetch<'a, I>(&self, endpoint: Endpoint, params: I) -> Result<Value>
    where
        I: IntoIterator<Item = (&'a str, QueryValue)>,
    {
        let request = self.build_request(endpoint, params)?;
        debug!("Requesting {} with {:?}", endpoint, request.query);

        let response = self.transport.get(&request).await?;
        if !response.is_success() {
            warn!("{} returned HTTP {}", endpoint, response.status);
            return Err(GatewayError::UpstreamHttp {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body)
            .map_err(|e| GatewayError::Decode(format!("{} returned invalid JSON: {}", endpoint, e)))
    }

    /// Exchange metadata, for one symbol or all of them
    pub async fn exchange_info(&self, symbol: Option<&str>) -> Result<Value> {
        self.fetch(Endpoint::ExchangeInfo, [("symbol", QueryValue::from(symbol))])
            .await
    }

    /// Kline/candlestick bars
    pub async fn klines(&self, query: &KlinesQuery) -> Result<Value> {
        self.fetch(
            Endpoint::Klines,
            [
                ("symbol", QueryValue::from(query.symbol.as_str())),
                ("interval", QueryValue::from(query.interval.as_str())),
                ("startTime", QueryValue::from(query.start_time)),
                ("endTime", QueryValue::from(query.end_time)),
                ("limit", QueryValue::from(query.limit)),
            ],
        )
        .await
    }

    /// Compressed aggregate trades, newest page
    pub async fn agg_trades(&self, symbol: &str) -> Result<Value> {
        self.fetch(
            Endpoint::AggTrades,
            [
                ("symbol", QueryValue::from(symbol)),
                ("limit", QueryValue::from(TRADES_LIMIT)),
            ],
        )
        .await
    }

    /// Older market trades
    pub async fn historical_trades(&self, symbol: &str) -> Result<Value> {
        self.fetch(
            Endpoint::HistoricalTrades,
            [
                ("symbol", QueryValue::from(symbol)),
                ("limit", QueryValue::from(TRADES_LIMIT)),
            ],
        )
        .await
    }

    /// Order book
    pub async fn depth(&self, symbol: &str) -> Result<Value> {
        self.fetch(Endpoint::Depth, [("symbol", QueryValue::from(symbol))]).await
    }

    /// Current average price
    pub async fn avg_price(&self, symbol: &str) -> Result<Value> {
        self.fetch(Endpoint::AvgPrice, [("symbol", QueryValue::from(symbol))]).await
    }

    /// 24hr rolling price change statistics
    pub async fn ticker_24hr(&self, symbol: &str) -> Result<Value> {
        self.fetch(Endpoint::Ticker24hr, [("symbol", QueryValue::from(symbol))])
            .await
    }

    /// Trading day statistics; `symbols` is always sent as a JSON array
    pub async fn ticker_trading_day(&self, symbols: &[String]) -> Result<Value> {
        self.fetch(Endpoint::TickerTradingDay, [("symbols", QueryValue::from(symbols))])
            .await
    }

    /// Latest price for one, several, or all symbols
    pub async fn ticker_price(&self, symbol: Option<&str>, symbols: Option<&[String]>) -> Result<Value> {
        self.fetch(
            Endpoint::TickerPrice,
            [
                ("symbol", QueryValue::from(symbol)),
                ("symbols", QueryValue::from(symbols)),
            ],
        )
        .await
    }

    /// Best bid/ask for one, several, or all symbols
    pub async fn ticker_book_ticker(&self, symbol: Option<&str>, symbols: Option<&[String]>) -> Result<Value> {
        self.fetch(
            Endpoint::TickerBookTicker,
            [
                ("symbol", QueryValue::from(symbol)),
                ("symbols", QueryValue::from(symbols)),
            ],
        )
        .await
    }

    /// Rolling window price change statistics
    pub async fn ticker_rolling_window(&self, query: &RollingWindowQuery) -> Result<Value> {
        self.fetch(
            Endpoint::TickerRollingWindow,
            [
                ("symbol", QueryValue::from(query.symbol.as_deref())),
                ("symbols", QueryValue::from(query.symbols.as_deref())),
                ("windowSize", QueryValue::from(query.window_size.as_deref())),
                ("type", QueryValue::from(query.ticker_type.map(|t| t.as_str()))),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::MockTransport;
    use serde_json::json;

    fn client_with(mock: &Arc<MockTransport>) -> BinanceClient {
        BinanceClient::with_transport(mock.clone(), ClientConfig::default())
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::ExchangeInfo.path(), "exchangeInfo");
        assert_eq!(Endpoint::Ticker24hr.path(), "ticker/24hr");
        assert_eq!(Endpoint::TickerTradingDay.path(), "ticker/tradingDay");
        assert_eq!(Endpoint::TickerRollingWindow.path(), "ticker");
    }

    #[test]
    fn test_ticker_type_parse() {
        assert_eq!("FULL".parse::<TickerType>().unwrap(), TickerType::Full);
        assert_eq!("MINI".parse::<TickerType>().unwrap(), TickerType::Mini);
        assert!("mini".parse::<TickerType>().is_err());
    }

    #[test]
    fn test_build_request_joins_base_url() {
        let mock = Arc::new(MockTransport::new());
        let config = ClientConfig::default().with_base_url("http://localhost:9000/api/v3");
        let client = BinanceClient::with_transport(mock, config);

        let request = client.build_request(Endpoint::Depth, [("symbol", QueryValue::from("BTCUSDT"))]).unwrap();
        assert_eq!(request.url, "http://localhost:9000/api/v3/depth");
        assert_eq!(request.endpoint, "depth");
    }

    #[test]
    fn test_build_request_carries_timeout() {
        let mock = Arc::new(MockTransport::new());
        let config = ClientConfig::default().with_timeout(Duration::from_millis(750));
        let client = BinanceClient::with_transport(mock, config);

        let request = client
            .build_request(Endpoint::AvgPrice, Vec::<(&str, QueryValue)>::new())
            .unwrap();
        assert_eq!(request.timeout, Duration::from_millis(750));
    }

    #[tokio::test]
    async fn test_exchange_info_without_symbol_sends_no_query() {
        let mock = Arc::new(MockTransport::new());
        client_with(&mock).exchange_info(None).await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.url, "https://api.binance.com/api/v3/exchangeInfo");
        assert!(request.query.is_empty());
    }

    #[tokio::test]
    async fn test_klines_forwards_only_present_params() {
        let mock = Arc::new(MockTransport::new());
        let mut query = KlinesQuery::new("BTCUSDT", "1m");
        query.limit = Some(10);
        client_with(&mock).klines(&query).await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.param_names(), vec!["symbol", "interval", "limit"]);
        assert_eq!(request.param("limit"), Some("10"));
    }

    #[tokio::test]
    async fn test_trade_endpoints_pin_limit() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        client.agg_trades("ETHUSDT").await.unwrap();
        client.historical_trades("ETHUSDT").await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].endpoint, "aggTrades");
        assert_eq!(requests[1].endpoint, "historicalTrades");
        for request in requests {
            assert_eq!(request.param("limit"), Some("20"));
        }
    }

    #[tokio::test]
    async fn test_rolling_window_encodes_type() {
        let mock = Arc::new(MockTransport::new());
        let query = RollingWindowQuery {
            symbols: Some(vec!["BTCUSDT".to_string()]),
            window_size: Some("7d".to_string()),
            ticker_type: Some(TickerType::Mini),
            ..Default::default()
        };
        client_with(&mock).ticker_rolling_window(&query).await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.endpoint, "ticker");
        assert_eq!(request.param_names(), vec!["symbols", "windowSize", "type"]);
        assert_eq!(request.param("symbols"), Some(r#"["BTCUSDT"]"#));
        assert_eq!(request.param("type"), Some("MINI"));
    }

    #[tokio::test]
    async fn test_returns_decoded_body() {
        let mock = Arc::new(MockTransport::with_json(json!({"mins": 5, "price": "9.35751834"})));
        let value = client_with(&mock).avg_price("LTCBTC").await.unwrap();
        assert_eq!(value["mins"], 5);
        assert_eq!(value["price"], "9.35751834");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let mock = Arc::new(MockTransport::with_status(400, r#"{"code":-1121,"msg":"Invalid symbol."}"#));
        let err = client_with(&mock).depth("NOPE").await.unwrap_err();

        match err {
            GatewayError::UpstreamHttp { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid symbol"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let mock = Arc::new(MockTransport::with_status(200, "<html>maintenance</html>"));
        let err = client_with(&mock).ticker_24hr("BTCUSDT").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
        assert!(err.to_string().contains("ticker/24hr"));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mock = Arc::new(MockTransport::failing("dns error: no such host"));
        let err = client_with(&mock).exchange_info(Some("BTCUSDT")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
        assert_eq!(mock.requests().len(), 1);
    }
}
