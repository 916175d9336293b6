//! Tool definitions and parameter schemas
//!
//! Each tool declares an ordered list of typed parameters. The JSON schema
//! advertised to callers is derived from that list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::upstream::Endpoint;

/// Shape of a single tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    /// Array-capable: sent upstream as a JSON array string
    StringList,
    /// String restricted to a fixed set of values
    Choice(&'static [&'static str]),
}

impl ParamKind {
    /// JSON schema fragment for this kind
    pub fn json_schema(&self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::StringList => json!({ "type": "array", "items": { "type": "string" } }),
            Self::Choice(options) => json!({ "type": "string", "enum": options }),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::StringList)
    }
}

/// A declared tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }

    fn json_schema(&self) -> Value {
        let mut schema = self.kind.json_schema();
        schema["description"] = Value::String(self.description.to_string());
        schema
    }
}

/// A tool: name, description, upstream endpoint and parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub endpoint: Endpoint,
    pub params: &'static [ParamSpec],
}

impl ToolSpec {
    /// Look up a declared parameter
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Names of required parameters, in declaration order
    pub fn required_params(&self) -> Vec<&'static str> {
        self.params.iter().filter(|p| p.required).map(|p| p.name).collect()
    }

    /// Names of optional parameters, in declaration order
    pub fn optional_params(&self) -> Vec<&'static str> {
        self.params.iter().filter(|p| !p.required).map(|p| p.name).collect()
    }

    /// JSON schema for the tool's arguments object
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.params {
            properties.insert(param.name.to_string(), param.json_schema());
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_params(),
            "additionalProperties": false
        })
    }

    /// Convert to the advertised definition under the given name
    pub fn to_definition(&self, advertised_name: impl Into<String>) -> ToolDefinition {
        ToolDefinition {
            name: advertised_name.into(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool definition as listed to protocol clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}
