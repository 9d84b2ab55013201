//! The reasoning loop: prompt, complete, parse, act, repeat.
//!
//! `QueryAgent` owns the completion client, the SQL toolkit, and the
//! conversation store. Each question runs a bounded loop; every tool call
//! is recorded so the API can expose the intermediate steps alongside the
//! answer.

use std::sync::Arc;

use tracing::{debug, info, warn};

use roster_core::config::AgentConfig;

use crate::error::AgentError;
use crate::llm::CompletionClient;
use crate::memory::ConversationStore;
use crate::parser::{parse_step, AgentStep};
use crate::prompt::build_prompt;
use crate::tools::SqlToolkit;

/// One recorded tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStepRecord {
    pub tool: String,
    pub input: String,
    pub output: String,
}

/// The agent's answer to one question.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub conversation_id: String,
    pub answer: String,
    pub steps: Vec<AgentStepRecord>,
}

/// LLM-backed natural-language query agent.
pub struct QueryAgent {
    llm: Arc<dyn CompletionClient>,
    toolkit: SqlToolkit,
    memory: ConversationStore,
    config: AgentConfig,
}

impl QueryAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, toolkit: SqlToolkit, config: AgentConfig) -> Self {
        let memory = ConversationStore::new(config.context_turns, config.session_timeout_minutes);
        Self {
            llm,
            toolkit,
            memory,
            config,
        }
    }

    /// Answer a question, preserving context under `conversation_id`.
    pub async fn answer(
        &self,
        question: &str,
        conversation_id: Option<String>,
    ) -> Result<AgentOutcome, AgentError> {
        if !self.config.enabled {
            return Err(AgentError::Disabled);
        }

        let question = question.trim();
        if question.is_empty() {
            return Err(AgentError::EmptyQuery);
        }
        if question.len() > self.config.max_query_length {
            return Err(AgentError::QueryTooLong(self.config.max_query_length));
        }

        let conversation_id = self.memory.resolve(conversation_id);
        let history = self.memory.render(&conversation_id);

        info!(
            conversation_id = %conversation_id,
            question_len = question.len(),
            "Answering question"
        );

        let mut scratchpad = String::new();
        let mut steps: Vec<AgentStepRecord> = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            let prompt = build_prompt(question, &history, &scratchpad);
            let completion = self.llm.complete(&prompt).await?;

            match parse_step(&completion) {
                Ok(AgentStep::Final { answer }) => {
                    debug!(iteration, "Final answer reached");
                    self.memory.record(&conversation_id, question, &answer);
                    return Ok(AgentOutcome {
                        conversation_id,
                        answer,
                        steps,
                    });
                }
                Ok(AgentStep::Action { tool, input }) => {
                    let output = self.toolkit.dispatch(&tool, &input);
                    debug!(
                        iteration,
                        tool = %tool,
                        output_len = output.len(),
                        "Tool step"
                    );
                    push_step(&mut scratchpad, &completion, &output);
                    steps.push(AgentStepRecord {
                        tool,
                        input,
                        output,
                    });
                }
                Err(AgentError::Parse(msg)) => {
                    // Feed the failure back; the model usually fixes its
                    // format on the next pass.
                    warn!(iteration, error = %msg, "Unparseable completion");
                    scratchpad.push_str(&format!(
                        "{}\nObservation: {}\nThought: ",
                        completion.trim(),
                        msg
                    ));
                }
                Err(other) => return Err(other),
            }
        }

        // Iteration budget exhausted: answer gracefully, as an agent that
        // "stopped due to iteration limit" rather than an error.
        warn!(
            conversation_id = %conversation_id,
            max_iterations = self.config.max_iterations,
            "Iteration budget exhausted"
        );
        let answer =
            "I wasn't able to finish answering that within my reasoning budget. \
             Could you rephrase or narrow the question?"
                .to_string();
        self.memory.record(&conversation_id, question, &answer);
        Ok(AgentOutcome {
            conversation_id,
            answer,
            steps,
        })
    }

    /// Number of remembered turns for a conversation (for diagnostics).
    pub fn turn_count(&self, conversation_id: &str) -> usize {
        self.memory.turn_count(conversation_id)
    }
}

/// Append one completed step to the scratchpad in the prompt's format.
///
/// Keeps the model's own thought and action text, cuts any hallucinated
/// observation, then appends the real one.
fn push_step(scratchpad: &mut String, completion: &str, output: &str) {
    let thought = completion
        .split("Observation:")
        .next()
        .unwrap_or(completion)
        .trim();
    scratchpad.push_str(&format!("{}\nObservation: {}\nThought: ", thought, output));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use roster_core::error::RosterError;
    use roster_storage::{Database, QueryService};

    use crate::llm::StubLlm;

    fn seeded_toolkit() -> SqlToolkit {
        let db = Arc::new(Database::in_memory().unwrap());
        db.with_conn(|conn| {
            conn.execute_batch(
                "INSERT INTO employees (id, name, department, position, salary, email, phone,
                                        address, hire_date, date_of_birth, ssn, username)
                 VALUES (1, 'Jane Smith', 'Engineering', 'Engineer', 95000, 'j@x.com', '555',
                         'addr', '2021-03-15', '1988-07-02', '123-45-6789', 'jsmith'),
                        (2, 'John Doe', 'Sales', 'Account Executive', 70000, 'd@x.com', '556',
                         'addr', '2019-08-01', '1991-11-20', '987-65-4321', 'jdoe');",
            )
            .map_err(|e| RosterError::Storage(e.to_string()))
        })
        .unwrap();
        SqlToolkit::new(QueryService::new(db, 50), 2)
    }

    fn make_agent(responses: Vec<&str>, config: AgentConfig) -> QueryAgent {
        QueryAgent::new(Arc::new(StubLlm::new(responses)), seeded_toolkit(), config)
    }

    #[tokio::test]
    async fn test_direct_final_answer() {
        let agent = make_agent(
            vec!["Thought: easy.\nFinal Answer: There are two employees."],
            AgentConfig::default(),
        );

        let outcome = agent.answer("How many employees are there?", None).await.unwrap();
        assert_eq!(outcome.answer, "There are two employees.");
        assert!(outcome.steps.is_empty());
    }

    #[tokio::test]
    async fn test_tool_loop_reaches_answer() {
        let agent = make_agent(
            vec![
                "Thought: check tables.\nAction: list_tables\nAction Input: ",
                "Thought: query salaries.\nAction: run_query\nAction Input: SELECT name FROM employees ORDER BY salary DESC LIMIT 1",
                "Thought: I now know the final answer\nFinal Answer: Jane Smith is the highest paid.",
            ],
            AgentConfig::default(),
        );

        let outcome = agent.answer("Who is the highest paid?", None).await.unwrap();
        assert_eq!(outcome.answer, "Jane Smith is the highest paid.");
        assert_eq!(outcome.steps.len(), 2);
        assert_eq!(outcome.steps[0].tool, "list_tables");
        assert!(outcome.steps[0].output.contains("employees"));
        assert_eq!(outcome.steps[1].tool, "run_query");
        assert!(outcome.steps[1].output.contains("Jane Smith"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_recovered() {
        let agent = make_agent(
            vec![
                "Let me think about what the user wants here.",
                "Final Answer: Two employees.",
            ],
            AgentConfig::default(),
        );

        let outcome = agent.answer("How many employees?", None).await.unwrap();
        assert_eq!(outcome.answer, "Two employees.");
    }

    #[tokio::test]
    async fn test_iteration_budget_exhaustion_is_graceful() {
        let config = AgentConfig {
            max_iterations: 2,
            ..AgentConfig::default()
        };
        let agent = make_agent(
            vec![
                "Action: list_tables\nAction Input: ",
                "Action: list_tables\nAction Input: ",
            ],
            config,
        );

        let outcome = agent.answer("Loop forever", None).await.unwrap();
        assert!(outcome.answer.contains("reasoning budget"));
        assert_eq!(outcome.steps.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let agent = make_agent(vec![], AgentConfig::default());
        assert!(matches!(
            agent.answer("   ", None).await,
            Err(AgentError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_too_long_question_rejected() {
        let config = AgentConfig {
            max_query_length: 10,
            ..AgentConfig::default()
        };
        let agent = make_agent(vec![], config);
        assert!(matches!(
            agent.answer("this question is far too long", None).await,
            Err(AgentError::QueryTooLong(10))
        ));
    }

    #[tokio::test]
    async fn test_disabled_agent_rejects() {
        let config = AgentConfig {
            enabled: false,
            ..AgentConfig::default()
        };
        let agent = make_agent(vec![], config);
        assert!(matches!(
            agent.answer("hello", None).await,
            Err(AgentError::Disabled)
        ));
    }

    #[tokio::test]
    async fn test_conversation_memory_accumulates() {
        let agent = make_agent(
            vec![
                "Final Answer: Jane Smith works in Engineering.",
                "Final Answer: Her salary is $95,000.",
            ],
            AgentConfig::default(),
        );

        let first = agent
            .answer("Who works in Engineering?", Some("conv-1".to_string()))
            .await
            .unwrap();
        assert_eq!(first.conversation_id, "conv-1");

        let second = agent
            .answer("What is her salary?", Some("conv-1".to_string()))
            .await
            .unwrap();
        assert_eq!(second.conversation_id, "conv-1");
        assert_eq!(agent.turn_count("conv-1"), 2);
    }

    #[tokio::test]
    async fn test_llm_transport_error_propagates() {
        // Empty stub script: the first completion call fails.
        let agent = make_agent(vec![], AgentConfig::default());
        assert!(matches!(
            agent.answer("hello", None).await,
            Err(AgentError::Llm(_))
        ));
    }
}
