//! Composition of the validation context and instruction.

use crate::goal::AgentGoal;
use crate::types::{ConversationTurn, PromptRequest};

/// Render a goal's tool catalog, one paragraph per tool, in catalog order.
///
/// ```text
/// Tool: SearchFlights
/// Description: Search for flights
/// Arguments: city (string), date (ISO8601)
/// ```
pub fn render_tool_catalog(goal: &AgentGoal) -> String {
    goal.tools
        .iter()
        .map(|tool| {
            let arguments = tool
                .arguments
                .iter()
                .map(|arg| format!("{} ({})", arg.name, arg.arg_type))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Tool: {}\nDescription: {}\nArguments: {}",
                tool.name, tool.description, arguments
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Serialize conversation history as indented JSON, order preserved.
pub fn render_history(history: &[ConversationTurn]) -> String {
    // Serializing an in-memory Value tree cannot fail.
    serde_json::to_string_pretty(history).unwrap_or_else(|_| "[]".to_string())
}

/// Context instructions embedding the goal, its tools, and the history.
pub fn context_instructions(goal: &AgentGoal, history: &[ConversationTurn]) -> String {
    format!(
        "The agent goal and tools are as follows:\n\
         Description: {}\n\
         Available Tools:\n\
         {}\n\
         The conversation history to date is:\n\
         {}",
        goal.description,
        render_tool_catalog(goal),
        render_history(history)
    )
}

/// Instruction asking the model to judge `prompt` and reply with JSON only.
pub fn validation_instruction(prompt: &str) -> String {
    format!(
        r#"The user's prompt is: "{prompt}"
Please validate if this prompt makes sense given the agent goal and conversation history.
If the prompt makes sense toward the goal then validationResult should be true.
If the prompt is wildly nonsensical or makes no sense toward the goal and current conversation history then validationResult should be false.
If the response is low content such as "yes" or "that's right" then the user is probably responding to a previous prompt.
Therefore examine it in the context of the conversation history to determine if it makes sense and return true if it makes sense.
Return ONLY a JSON object with the following structure:
    "validationResult": true/false,
    "validationFailedReason": If validationResult is false, provide a clear explanation to the user in the response field
    about why their request doesn't make sense in the context and what information they should provide instead.
    validationFailedReason should contain JSON in the format
    {{
        "next": "question",
        "response": "[your reason here and a response to get the user back on track with the agent goal]"
    }}
    If validationResult is true (the prompt makes sense), return an empty dict as its value {{}}"#
    )
}

/// Build the full validation request for a user prompt.
pub fn build_validation_request(
    goal: &AgentGoal,
    history: &[ConversationTurn],
    prompt: &str,
) -> PromptRequest {
    PromptRequest::new(validation_instruction(prompt), context_instructions(goal, history))
}
