//! Tool server - serves the gateway over a byte stream
//!
//! Provides:
//! - Request routing for the tool protocol methods
//! - A serve loop over any AsyncRead/AsyncWrite pair (stdio in production)
//! - Concurrent dispatch with responses written as calls complete

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::error::{GatewayError, Result};
use crate::tools::ToolGateway;

use super::codec::NdJsonCodec;
use super::messages::{CallToolParams, CallToolResult, ListToolsResult, Methods, RpcError, RpcRequest, RpcResponse, ServerInfo};

/// Capacity of the outbound response queue
const RESPONSE_CHANNEL_CAPACITY: usize = 64;

/// Serves tool calls for one connected caller
pub struct ToolServer {
    gateway: ToolGateway,
    info: ServerInfo,
}

impl ToolServer {
    /// Create a server with the default identity
    pub fn new(gateway: ToolGateway) -> Self {
        Self::with_info(gateway, ServerInfo::default())
    }

    pub fn with_info(gateway: ToolGateway, info: ServerInfo) -> Self {
        Self { gateway, info }
    }

    /// Route a single message; notifications yield no response
    pub async fn handle(&self, request: RpcRequest) -> Option<RpcResponse> {
        debug!("Received {} (id: {:?})", request.method, request.id);

        let outcome = match request.method.as_str() {
            Methods::INITIALIZE => Ok(self.info.initialize_result()),
            Methods::PING => Ok(json!({})),
            Methods::TOOLS_LIST => self.list_tools(),
            Methods::TOOLS_CALL => self.call_tool(request.params).await,
            method if method.starts_with("notifications/") => {
                debug!("Ignoring notification {}", method);
                return None;
            }
            method => Err(RpcError::method_not_found(method)),
        };

        let id = request.id?;
        Some(match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(err) => RpcResponse::error(id, err),
        })
    }

    fn list_tools(&self) -> std::result::Result<Value, RpcError> {
        let result = ListToolsResult {
            tools: self.gateway.definitions(),
        };
        serde_json::to_value(result).map_err(|e| RpcError::internal_error(e.to_string()))
    }

    async fn call_tool(&self, params: Value) -> std::result::Result<Value, RpcError> {
        let params: CallToolParams =
            serde_json::from_value(params).map_err(|e| RpcError::invalid_params(format!("Invalid tools/call params: {}", e)))?;

        let result = match self.gateway.invoke(&params.name, params.arguments).await {
            Ok(output) => CallToolResult::success(output),
            Err(GatewayError::UnknownTool(name)) => {
                return Err(RpcError::invalid_params(format!("Unknown tool: {}", name)));
            }
            Err(e) => CallToolResult::failure(&e),
        };

        serde_json::to_value(result).map_err(|e| RpcError::internal_error(e.to_string()))
    }

    /// Decode a raw frame and route it
    async fn handle_frame(&self, frame: Value) -> Option<RpcResponse> {
        let id = frame.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<RpcRequest>(frame) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(RpcResponse::error(id, RpcError::invalid_request(e.to_string()))),
        }
    }

    /// Serve until the reader reaches EOF; in-flight calls are drained first
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut frames = FramedRead::new(reader, NdJsonCodec::<Value>::new());
        let mut sink = FramedWrite::new(writer, NdJsonCodec::<RpcResponse>::new());
        let (tx, mut rx) = mpsc::channel::<RpcResponse>(RESPONSE_CHANNEL_CAPACITY);

        let writer_task = tokio::spawn(async move {
            while let Some(response) = rx.recv().await {
                if let Err(e) = sink.send(response).await {
                    error!("Failed to write response: {}", e);
                    return Err(e);
                }
            }
            Ok(())
        });

        let mut in_flight = JoinSet::new();
        let mut read_error = None;

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(Ok(message)) => {
                    let server = Arc::clone(&self);
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        if let Some(response) = server.handle_frame(message).await {
                            let _ = tx.send(response).await;
                        }
                    });
                    reap_finished(&mut in_flight);
                }
                Ok(Err(e)) => {
                    warn!("Discarding unparseable message: {}", e);
                    let _ = tx.send(RpcResponse::error(Value::Null, RpcError::parse_error(e.to_string()))).await;
                }
                Err(e) => {
                    error!("Input stream failed: {}", e);
                    read_error = Some(e);
                    break;
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            log_join_failure(joined);
        }
        drop(tx);

        writer_task
            .await
            .map_err(|e| GatewayError::Io(std::io::Error::other(e)))??;

        match read_error {
            Some(e) => Err(e.into()),
            None => {
                info!("Input closed, server stopping");
                Ok(())
            }
        }
    }

    /// Serve over the process's stdin/stdout
    pub async fn serve_stdio(self: Arc<Self>) -> Result<()> {
        info!("Serving {} v{} on stdio", self.info.name, self.info.version);
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }
}

/// Drop completed calls so the set only holds work still running
fn reap_finished(in_flight: &mut JoinSet<()>) {
    while let Some(joined) = in_flight.try_join_next() {
        log_join_failure(joined);
    }
}

fn log_join_failure(joined: std::result::Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("Tool call task failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{BinanceClient, ClientConfig, MockTransport};
    use tokio::io::AsyncReadExt;

    fn server(mock: MockTransport) -> ToolServer {
        let client = BinanceClient::with_transport(Arc::new(mock), ClientConfig::default());
        ToolServer::new(ToolGateway::new(client))
    }

    async fn call(server: &ToolServer, params: Value) -> RpcResponse {
        server
            .handle(RpcRequest::new(1, Methods::TOOLS_CALL, params))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = server(MockTransport::new())
            .handle(RpcRequest::new(0, Methods::INITIALIZE, json!({})))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "TradeAssistant");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let srv = server(MockTransport::new());
        assert!(srv.handle(RpcRequest::notification(Methods::INITIALIZED)).await.is_none());
        assert!(srv.handle(RpcRequest::notification("notifications/cancelled")).await.is_none());
    }

    #[tokio::test]
    async fn test_ping() {
        let response = server(MockTransport::new())
            .handle(RpcRequest::new("p", Methods::PING, Value::Null))
            .await
            .unwrap();
        assert_eq!(response.id, json!("p"));
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_null_id_gets_a_response() {
        let srv = server(MockTransport::new());
        let frame = json!({"jsonrpc": "2.0", "id": null, "method": "ping"});

        let response = srv.handle_frame(frame).await.unwrap();
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = server(MockTransport::new())
            .handle(RpcRequest::new(2, Methods::TOOLS_LIST, Value::Null))
            .await
            .unwrap();

        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 12);
        assert_eq!(tools[2]["name"], "GetTradeData");
        assert_eq!(tools[2]["inputSchema"]["required"], json!(["symbol", "interval"]));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = server(MockTransport::new())
            .handle(RpcRequest::new(3, "resources/list", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let srv = server(MockTransport::with_json(json!({"mins": 5, "price": "1.5"})));
        let response = call(&srv, json!({"name": "CurrentAvgPrice", "arguments": {"symbol": "BNBBTC"}})).await;

        let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert!(!result.is_error);
        assert_eq!(result.text(), Some(r#"{"mins":5,"price":"1.5"}"#));
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_protocol_error() {
        let srv = server(MockTransport::new());
        let response = call(&srv, json!({"name": "Withdraw", "arguments": {}})).await;
        let err = response.error.unwrap();
        assert_eq!(err.code, -32602);
        assert!(err.message.contains("Withdraw"));
    }

    #[tokio::test]
    async fn test_tools_call_bad_params() {
        let srv = server(MockTransport::new());
        let response = call(&srv, json!({"arguments": {}})).await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_tools_call_upstream_failure_is_tool_error() {
        let srv = server(MockTransport::with_status(451, "{}"));
        let response = call(&srv, json!({"name": "Depth", "arguments": {"symbol": "BTCUSDT"}})).await;

        let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert!(result.is_error);
        assert_eq!(result.error_kind.as_deref(), Some("UpstreamHTTPError"));
        assert_eq!(result.status, Some(451));
    }

    #[tokio::test]
    async fn test_tools_call_invalid_argument_is_tool_error() {
        let srv = server(MockTransport::new());
        let response = call(&srv, json!({"name": "Depth", "arguments": {}})).await;

        let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert!(result.is_error);
        assert_eq!(result.error_kind.as_deref(), Some("InvalidArgument"));
    }

    #[tokio::test]
    async fn test_reap_finished_empties_completed_calls() {
        let mut in_flight = JoinSet::new();
        for _ in 0..500 {
            in_flight.spawn(async {});
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        reap_finished(&mut in_flight);
        assert!(in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_reap_finished_keeps_running_calls() {
        let mut in_flight = JoinSet::new();
        in_flight.spawn(async {});
        in_flight.spawn(std::future::pending::<()>());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        reap_finished(&mut in_flight);
        assert_eq!(in_flight.len(), 1);
        in_flight.abort_all();
    }

    #[tokio::test]
    async fn test_serve_over_stream() {
        let srv = Arc::new(server(MockTransport::with_json(json!({"price": "2.0"}))));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "this is not json\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"SymbolPriceTicker","arguments":{"symbol":"ETHBTC"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3}"#,
            "\n",
        );

        let (mut client, server_end) = tokio::io::duplex(64 * 1024);
        srv.serve(input.as_bytes(), server_end).await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();

        let responses: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 4);

        let by_id = |id: Value| responses.iter().find(|r| r["id"] == id).cloned().unwrap();
        assert_eq!(by_id(json!(1))["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(by_id(json!(2))["result"]["content"][0]["text"], r#"{"price":"2.0"}"#);
        assert_eq!(by_id(json!(3))["error"]["code"], -32600);
        assert_eq!(by_id(Value::Null)["error"]["code"], -32700);
    }
}
