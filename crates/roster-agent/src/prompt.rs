//! Prompt assembly for the reasoning loop.
//!
//! Builds the full completion prompt: role preamble, tool list, guidance,
//! conversation history, the format contract, and the running scratchpad
//! of prior Thought/Action/Observation steps.

use crate::tools::SqlToolkit;

/// Build the prompt for one completion call.
///
/// `history` is the rendered prior conversation (may be empty), and
/// `scratchpad` the Thought/Action/Observation text accumulated so far in
/// this question's loop.
pub fn build_prompt(question: &str, history: &str, scratchpad: &str) -> String {
    let tools = SqlToolkit::describe();
    let tool_names = SqlToolkit::tool_names().join(", ");
    let history = if history.is_empty() {
        "(none)"
    } else {
        history
    };

    format!(
        "You are an AI assistant that helps retrieve and provide information about \
employees from a SQL database.

You have access to the following tools:
{tools}

Previous conversation history:
{history}

IMPORTANT GUIDELINES:
1. First, check what tables are available using the {list_tables} tool
2. Get the schema for relevant tables using the {table_schema} tool
3. Formulate a SQL query to answer the question
4. Execute the query and interpret the results
5. If you encounter errors, check the schema again and fix your query
6. If you are unable to get the proper information or think the information is wrong, say so
7. Reference any information from previous parts of our conversation when relevant
8. When referring to people, use their full names on first mention, then you can use first names
9. Be friendly and conversational in your responses, not overly technical
10. Format any numerical values appropriately (currency with $ sign, percentages, etc.)

This database contains information about employees including their:
- name
- department
- position
- salary
- hire date (from which years of service can be derived)

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Question: {question}
Thought: {scratchpad}",
        tools = tools,
        history = history,
        list_tables = crate::tools::TOOL_LIST_TABLES,
        table_schema = crate::tools::TOOL_TABLE_SCHEMA,
        tool_names = tool_names,
        question = question,
        scratchpad = scratchpad,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_question_and_tools() {
        let prompt = build_prompt("Who earns the most?", "", "");
        assert!(prompt.contains("Question: Who earns the most?"));
        for name in SqlToolkit::tool_names() {
            assert!(prompt.contains(name));
        }
    }

    #[test]
    fn test_empty_history_renders_placeholder() {
        let prompt = build_prompt("q", "", "");
        assert!(prompt.contains("Previous conversation history:\n(none)"));
    }

    #[test]
    fn test_history_and_scratchpad_are_embedded() {
        let prompt = build_prompt(
            "And in Sales?",
            "Human: Who works in Engineering?\nAssistant: Jane Smith.",
            "I should check the tables first.\nAction: list_tables",
        );
        assert!(prompt.contains("Who works in Engineering?"));
        assert!(prompt.contains("Action: list_tables"));
        assert!(prompt.ends_with("Thought: I should check the tables first.\nAction: list_tables"));
    }
}
