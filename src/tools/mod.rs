//! Tool System - catalog, argument validation and the upstream gateway

mod args;
mod catalog;
mod definition;
mod gateway;

pub use args::ToolArgs;
pub use catalog::{ToolCatalog, ToolName};
pub use definition::{ParamKind, ParamSpec, ToolDefinition, ToolSpec};
pub use gateway::{ToolGateway, ToolOutput};
