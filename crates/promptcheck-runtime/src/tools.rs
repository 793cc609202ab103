//! Name-to-handler registry for agent tools.
//!
//! Handlers are registered explicitly at process start. Lookup never falls
//! back to a default: an unregistered name is [`ToolError::UnknownTool`].

use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use promptcheck_core::AgentGoal;

pub type ToolArgs = Map<String, JsonValue>;
pub type ToolOutput = Map<String, JsonValue>;

/// A synchronous tool implementation.
pub type ToolHandler = Arc<dyn Fn(&ToolArgs) -> Result<ToolOutput, ToolError> + Send + Sync>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool '{tool}' failed: {message}")]
    Failed { tool: String, message: String },
}

/// Registered tool handlers keyed by tool name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    handlers: BTreeMap<String, ToolHandler>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&ToolArgs) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(tool = %name, "Registering tool");
        if self.handlers.insert(name.clone(), Arc::new(handler)).is_some() {
            tracing::warn!(tool = %name, "Tool handler replaced");
        }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ToolArgs) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
    {
        self.register(name, handler);
        self
    }

    /// Run the handler registered under `name`.
    pub fn invoke(&self, name: &str, args: &ToolArgs) -> Result<ToolOutput, ToolError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tracing::info!(tool = %name, args = %JsonValue::Object(args.clone()), "Invoking tool");
        match handler(args) {
            Ok(output) => {
                tracing::info!(tool = %name, result = %JsonValue::Object(output.clone()), "Tool succeeded");
                Ok(output)
            }
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool failed");
                Err(e)
            }
        }
    }

    /// Run a tool the goal declares, after checking its declared arguments
    /// are all present.
    ///
    /// A tool missing from the goal's catalog is [`ToolError::UnknownTool`]
    /// even when a handler is registered for it.
    pub fn invoke_declared(
        &self,
        goal: &AgentGoal,
        name: &str,
        args: &ToolArgs,
    ) -> Result<ToolOutput, ToolError> {
        let spec = goal
            .tool(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let missing: Vec<&str> = spec
            .arguments
            .iter()
            .map(|arg| arg.name.as_str())
            .filter(|arg| !args.contains_key(*arg))
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::InvalidArguments(format!(
                "{name} is missing {}",
                missing.join(", ")
            )));
        }

        self.invoke(name, args)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Tools named by `goal` that have no registered handler.
    pub fn missing_for<'g>(&self, goal: &'g AgentGoal) -> Vec<&'g str> {
        goal.tool_names().filter(|name| !self.has_tool(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptcheck_core::ToolSpec;
    use serde_json::json;

    fn args(value: JsonValue) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    fn require_str<'a>(args: &'a ToolArgs, key: &str) -> Result<&'a str, ToolError> {
        args.get(key)
            .and_then(JsonValue::as_str)
            .ok_or_else(|| ToolError::InvalidArguments(format!("missing string argument '{key}'")))
    }

    fn travel_goal() -> AgentGoal {
        AgentGoal::new("Book travel")
            .with_tool(
                ToolSpec::new("SearchFlights", "Search for flights")
                    .with_argument("city", "string")
                    .with_argument("date", "ISO8601"),
            )
            .with_tool(ToolSpec::new("BookHotel", "Reserve a room"))
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .with("SearchFlights", |args| {
                let city = require_str(args, "city")?;
                Ok(args_out(json!({"flights": [format!("CDG-{city}")]})))
            })
            .with("CreateInvoice", |_| {
                Err(ToolError::Failed {
                    tool: "CreateInvoice".to_string(),
                    message: "billing offline".to_string(),
                })
            })
    }

    fn args_out(value: JsonValue) -> ToolOutput {
        args(value)
    }

    #[test]
    fn test_invoke_registered_tool() {
        let output = registry()
            .invoke("SearchFlights", &args(json!({"city": "Paris"})))
            .unwrap();
        assert_eq!(output["flights"], json!(["CDG-Paris"]));
    }

    #[test]
    fn test_unknown_tool() {
        let err = registry().invoke("BookHotel", &ToolArgs::new()).unwrap_err();
        assert_eq!(err, ToolError::UnknownTool("BookHotel".to_string()));
    }

    #[test]
    fn test_handler_error_is_returned_as_is() {
        let err = registry()
            .invoke("CreateInvoice", &ToolArgs::new())
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed { ref message, .. } if message == "billing offline"));
    }

    #[test]
    fn test_missing_argument() {
        let err = registry()
            .invoke("SearchFlights", &ToolArgs::new())
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_names_and_lookup() {
        let registry = registry();
        assert!(registry.has_tool("SearchFlights"));
        assert!(!registry.has_tool("searchflights"));
        assert_eq!(
            registry.tool_names().collect::<Vec<_>>(),
            vec!["CreateInvoice", "SearchFlights"]
        );
    }

    #[test]
    fn test_missing_for_goal() {
        let goal = AgentGoal::new("Book travel")
            .with_tool(ToolSpec::new("SearchFlights", "Search for flights"))
            .with_tool(ToolSpec::new("BookHotel", "Reserve a room"));
        assert_eq!(registry().missing_for(&goal), vec!["BookHotel"]);
    }

    #[test]
    fn test_invoke_declared_runs_with_all_arguments() {
        let output = registry()
            .invoke_declared(
                &travel_goal(),
                "SearchFlights",
                &args(json!({"city": "Paris", "date": "2025-01-07"})),
            )
            .unwrap();
        assert_eq!(output["flights"], json!(["CDG-Paris"]));
    }

    #[test]
    fn test_invoke_declared_reports_missing_arguments() {
        let err = registry()
            .invoke_declared(&travel_goal(), "SearchFlights", &args(json!({"city": "Paris"})))
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArguments("SearchFlights is missing date".to_string())
        );
    }

    #[test]
    fn test_invoke_declared_rejects_undeclared_tool() {
        // Registered, but not part of this goal's catalog.
        let err = registry()
            .invoke_declared(&travel_goal(), "CreateInvoice", &ToolArgs::new())
            .unwrap_err();
        assert_eq!(err, ToolError::UnknownTool("CreateInvoice".to_string()));
    }

    #[test]
    fn test_invoke_declared_without_handler_is_unknown() {
        let err = registry()
            .invoke_declared(&travel_goal(), "BookHotel", &ToolArgs::new())
            .unwrap_err();
        assert_eq!(err, ToolError::UnknownTool("BookHotel".to_string()));
    }

    #[test]
    fn test_reregister_replaces_handler() {
        let registry = registry().with("SearchFlights", |_| Ok(ToolOutput::new()));
        let output = registry
            .invoke("SearchFlights", &args(json!({"city": "Rome"})))
            .unwrap();
        assert!(output.is_empty());
        assert!(format!("{:?}", registry).contains("SearchFlights"));
    }
}
