//! Argument validation against a tool's parameter schema
//!
//! Only shape is checked here: types, required keys, unknown keys and enum
//! membership. Values are otherwise passed through untouched.

use serde_json::{Map, Value};

use crate::error::{GatewayError, Result};

use super::definition::{ParamKind, ParamSpec, ToolSpec};

/// Validated arguments for a single invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArgs {
    tool: &'static str,
    values: Map<String, Value>,
}

impl ToolArgs {
    /// Validate raw arguments; `null` values count as absent
    pub fn parse(spec: &'static ToolSpec, input: Value) -> Result<Self> {
        let raw = match input {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(GatewayError::InvalidArgument(format!(
                    "{}: arguments must be an object, got {}",
                    spec.name,
                    type_name(&other)
                )));
            }
        };

        if let Some(unknown) = raw.keys().find(|key| spec.param(key).is_none()) {
            return Err(GatewayError::InvalidArgument(format!(
                "{}: unexpected argument '{}'",
                spec.name, unknown
            )));
        }

        let mut values = Map::new();
        for param in spec.params {
            match raw.get(param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(GatewayError::InvalidArgument(format!(
                            "{}: missing required argument '{}'",
                            spec.name, param.name
                        )));
                    }
                }
                Some(value) => {
                    let coerced = coerce(spec.name, param, value)?;
                    values.insert(param.name.to_string(), coerced);
                }
            }
        }

        Ok(Self {
            tool: spec.name,
            values,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Optional string argument
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// Optional integer argument
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    /// Optional list argument
    pub fn list(&self, name: &str) -> Option<Vec<String>> {
        self.values.get(name).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }

    pub fn require_text(&self, name: &str) -> Result<&str> {
        self.text(name).ok_or_else(|| self.missing(name))
    }

    pub fn require_list(&self, name: &str) -> Result<Vec<String>> {
        self.list(name).ok_or_else(|| self.missing(name))
    }

    fn missing(&self, name: &str) -> GatewayError {
        GatewayError::InvalidArgument(format!("{}: missing required argument '{}'", self.tool, name))
    }
}

fn coerce(tool: &str, param: &ParamSpec, value: &Value) -> Result<Value> {
    let mismatch = |expected: &str| {
        GatewayError::InvalidArgument(format!(
            "{}: argument '{}' must be {}, got {}",
            tool,
            param.name,
            expected,
            type_name(value)
        ))
    };

    match param.kind {
        ParamKind::String => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(mismatch("a string")),
        },
        ParamKind::Integer => match value {
            Value::Number(n) => n.as_i64().map(Value::from).ok_or_else(|| mismatch("an integer")),
            // Callers frequently quote numbers
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| mismatch("an integer")),
            _ => Err(mismatch("an integer")),
        },
        ParamKind::StringList => match value {
            Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
            _ => Err(mismatch("an array of strings")),
        },
        ParamKind::Choice(options) => match value.as_str() {
            Some(s) if options.contains(&s) => Ok(value.clone()),
            Some(s) => Err(GatewayError::InvalidArgument(format!(
                "{}: argument '{}' must be one of {}, got '{}'",
                tool,
                param.name,
                options.join(", "),
                s
            ))),
            None => Err(mismatch("a string")),
        },
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolName;
    use serde_json::json;

    fn parse(tool: ToolName, input: Value) -> Result<ToolArgs> {
        ToolArgs::parse(tool.spec(), input)
    }

    fn invalid(result: Result<ToolArgs>) -> String {
        match result {
            Err(GatewayError::InvalidArgument(msg)) => msg,
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_null_input_is_empty() {
        let args = parse(ToolName::ExchangeInfoOfAllSymbols, Value::Null).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_non_object_rejected() {
        let msg = invalid(parse(ToolName::Depth, json!(["BTCUSDT"])));
        assert!(msg.contains("arguments must be an object"));
    }

    #[test]
    fn test_missing_required() {
        let msg = invalid(parse(ToolName::GetTradeData, json!({"symbol": "BTCUSDT"})));
        assert_eq!(msg, "GetTradeData: missing required argument 'interval'");
    }

    #[test]
    fn test_required_null_is_missing() {
        let msg = invalid(parse(ToolName::Depth, json!({"symbol": null})));
        assert!(msg.contains("missing required argument 'symbol'"));
    }

    #[test]
    fn test_unknown_argument_rejected() {
        let msg = invalid(parse(ToolName::Depth, json!({"symbol": "BTCUSDT", "limit": 5})));
        assert_eq!(msg, "Depth: unexpected argument 'limit'");
    }

    #[test]
    fn test_optional_null_is_absent() {
        let args = parse(ToolName::SymbolPriceTicker, json!({"symbol": null, "symbols": null})).unwrap();
        assert!(args.is_empty());
        assert!(args.text("symbol").is_none());
        assert!(args.list("symbols").is_none());
    }

    #[test]
    fn test_integer_accepts_numbers_and_numeric_strings() {
        let args = parse(
            ToolName::GetTradeData,
            json!({"symbol": "BTCUSDT", "interval": "1h", "startTime": 1000, "endTime": "2000"}),
        )
        .unwrap();
        assert_eq!(args.integer("startTime"), Some(1000));
        assert_eq!(args.integer("endTime"), Some(2000));
        assert_eq!(args.integer("limit"), None);
    }

    #[test]
    fn test_integer_rejects_fractions_and_words() {
        let msg = invalid(parse(
            ToolName::GetTradeData,
            json!({"symbol": "BTCUSDT", "interval": "1h", "limit": 2.5}),
        ));
        assert!(msg.contains("'limit' must be an integer"));

        let msg = invalid(parse(
            ToolName::GetTradeData,
            json!({"symbol": "BTCUSDT", "interval": "1h", "limit": "ten"}),
        ));
        assert!(msg.contains("got a string"));
    }

    #[test]
    fn test_string_rejects_number() {
        let msg = invalid(parse(ToolName::CurrentAvgPrice, json!({"symbol": 42})));
        assert_eq!(msg, "CurrentAvgPrice: argument 'symbol' must be a string, got a number");
    }

    #[test]
    fn test_list_requires_array_of_strings() {
        let args = parse(ToolName::TradingDayTicker, json!({"symbols": ["BTCUSDT", "BNBUSDT"]})).unwrap();
        assert_eq!(args.require_list("symbols").unwrap(), vec!["BTCUSDT", "BNBUSDT"]);

        let msg = invalid(parse(ToolName::TradingDayTicker, json!({"symbols": "BTCUSDT"})));
        assert!(msg.contains("must be an array of strings"));

        let msg = invalid(parse(ToolName::TradingDayTicker, json!({"symbols": ["BTCUSDT", 1]})));
        assert!(msg.contains("must be an array of strings"));
    }

    #[test]
    fn test_choice_membership() {
        let args = parse(ToolName::RollingWindowTicker, json!({"symbol": "BTCUSDT", "type": "MINI"})).unwrap();
        assert_eq!(args.text("type"), Some("MINI"));

        let msg = invalid(parse(ToolName::RollingWindowTicker, json!({"type": "COMPACT"})));
        assert_eq!(
            msg,
            "RollingWindowTicker: argument 'type' must be one of FULL, MINI, got 'COMPACT'"
        );
    }

    #[test]
    fn test_require_text_reports_tool() {
        let args = parse(ToolName::SymbolPriceTicker, json!({})).unwrap();
        let err = args.require_text("symbol").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: SymbolPriceTicker: missing required argument 'symbol'"
        );
    }
}
