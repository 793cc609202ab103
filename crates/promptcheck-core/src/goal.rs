//! Agent goals and their tool catalogs, parsed from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading an agent goal.
#[derive(Error, Debug)]
pub enum GoalError {
    #[error("Failed to read goal file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Duplicate tool name in goal: {0}")]
    DuplicateTool(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// A single named, typed argument accepted by a tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolArgument {
    /// Argument name (e.g., "city")
    pub name: String,

    /// Type tag as shown to the model (e.g., "string", "ISO8601")
    #[serde(rename = "type")]
    pub arg_type: String,
}

impl ToolArgument {
    pub fn new(name: impl Into<String>, arg_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_type: arg_type.into(),
        }
    }
}

/// A tool the agent may call while pursuing its goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolSpec {
    /// Unique name within a goal
    pub name: String,

    /// What the tool does
    pub description: String,

    /// Arguments in declaration order
    #[serde(default)]
    pub arguments: Vec<ToolArgument>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            arguments: Vec::new(),
        }
    }

    /// Append an argument, keeping declaration order.
    pub fn with_argument(mut self, name: impl Into<String>, arg_type: impl Into<String>) -> Self {
        self.arguments.push(ToolArgument::new(name, arg_type));
        self
    }
}

/// What a conversational agent is trying to accomplish, plus its tools.
///
/// Supplied by the caller and treated as immutable for the duration of a
/// validation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentGoal {
    /// Human-readable goal description
    pub description: String,

    /// Tool catalog, in the order it is presented to the model
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
}

impl AgentGoal {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            tools: Vec::new(),
        }
    }

    /// Append a tool to the catalog.
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }

    /// Parse a goal from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, GoalError> {
        let goal: AgentGoal = serde_yaml::from_str(yaml)?;
        goal.check()?;
        Ok(goal)
    }

    /// Parse a goal from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, GoalError> {
        let goal: AgentGoal = serde_json::from_str(json)?;
        goal.check()?;
        Ok(goal)
    }

    /// Load a goal from a file. `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GoalError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Look up a tool by name.
    pub fn tool(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Names of all tools, in catalog order.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    fn check(&self) -> Result<(), GoalError> {
        if self.description.trim().is_empty() {
            return Err(GoalError::MissingField("description".to_string()));
        }

        let mut seen = BTreeSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.name.as_str()) {
                return Err(GoalError::DuplicateTool(tool.name.clone()));
            }
        }
        Ok(())
    }
}
