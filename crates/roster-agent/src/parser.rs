//! Parser for model completions in the Thought/Action/Final Answer format.
//!
//! A completion either names the next tool call or delivers the final
//! answer. Models wander from the contract in predictable ways (markdown
//! fences, prose before the keywords, both an action and an answer), so
//! parsing is tolerant: fences are stripped, keywords may appear anywhere,
//! and a Final Answer wins over a trailing Action.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AgentError;

/// One parsed step of the reasoning loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    /// The model wants a tool call.
    Action { tool: String, input: String },
    /// The model delivered its answer.
    Final { answer: String },
}

static FINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)Final\s*Answer\s*:\s*(.*)").unwrap());

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Action\s*:\s*(.+?)\s*[\r\n]+\s*Action\s*Input\s*:\s*(.*?)\s*(?:[\r\n]+\s*(?:Thought|Observation|Question)\s*:.*)?$")
        .unwrap()
});

/// Parse one completion into the next step.
pub fn parse_step(completion: &str) -> Result<AgentStep, AgentError> {
    let text = strip_fences(completion);

    // A final answer ends the loop even if the model also emitted an
    // action; retrying on an already-present answer only burns iterations.
    if let Some(caps) = FINAL_RE.captures(&text) {
        let answer = caps[1].trim().to_string();
        if !answer.is_empty() {
            return Ok(AgentStep::Final { answer });
        }
    }

    if let Some(caps) = ACTION_RE.captures(&text) {
        let tool = caps[1].trim().trim_matches('`').to_string();
        let input = caps[2].trim().to_string();
        return Ok(AgentStep::Action { tool, input });
    }

    Err(AgentError::Parse(format!(
        "could not find 'Action:' with 'Action Input:' or 'Final Answer:' in: {}",
        truncate(&text, 200)
    )))
}

/// Remove markdown code fences, keeping their contents.
fn strip_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
