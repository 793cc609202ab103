//! Prompt validation: composing the question, checking the answer.
//!
//! The model is asked whether a user prompt sensibly advances an agent goal
//! given the conversation so far. This module builds that request and checks
//! the reply shape; the network round trip lives in the runtime crate.

mod prompt;
mod schema;

pub use prompt::{
    build_validation_request, context_instructions, render_history, render_tool_catalog,
    validation_instruction,
};
pub use schema::{check_response_schema, SchemaError};
