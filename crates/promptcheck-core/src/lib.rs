//! # promptcheck-core
//!
//! Deterministic JSON extraction and prompt-validation composition for
//! LLM replies.
//!
//! This crate answers two questions without ever calling a model:
//! - Which part of this free-text reply is the JSON payload?
//! - What do we ask a model to decide whether a user prompt makes sense?
//!
//! ## Key Guarantees
//!
//! 1. **No LLM calls**: everything here is pure text and JSON handling
//! 2. **Predictable failure**: a reply either yields one JSON object or a
//!    [`MalformedResponse`]
//! 3. **No shared state**: every value is created per call
//!
//! ## Example
//!
//! ```rust
//! use promptcheck_core::{extract_object, ValidationOutcome};
//!
//! let raw = "Sure!\n```json\n{\"validationResult\": true}\n```";
//! let parsed = extract_object(raw).unwrap();
//! let outcome = ValidationOutcome::from_response(&parsed);
//!
//! assert!(outcome.validation_result);
//! assert!(outcome.validation_failed_reason.is_empty());
//! ```

pub mod context;
pub mod goal;
pub mod sanitizer;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use context::{stamp_current_date, stamp_date};
pub use goal::{AgentGoal, GoalError, ToolArgument, ToolSpec};
pub use sanitizer::{extract_object, parse_object, sanitize, MalformedResponse};
pub use types::{ConversationTurn, ParsedResponse, PromptRequest, ValidationOutcome};
pub use validation::{build_validation_request, check_response_schema};
