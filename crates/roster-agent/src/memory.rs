//! Per-conversation memory.
//!
//! Keeps a rolling window of question/answer turns keyed by conversation
//! id. Conversations expire after a configurable idle period; an expired
//! or unknown id simply starts a fresh history.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Local;
use uuid::Uuid;

/// One completed question/answer exchange.
#[derive(Debug, Clone)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

#[derive(Debug)]
struct Conversation {
    turns: Vec<Turn>,
    last_message_at: i64,
}

/// Conversation histories keyed by caller-supplied id.
pub struct ConversationStore {
    conversations: Mutex<HashMap<String, Conversation>>,
    context_turns: usize,
    session_timeout_minutes: u32,
}

impl ConversationStore {
    pub fn new(context_turns: usize, session_timeout_minutes: u32) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            context_turns,
            session_timeout_minutes,
        }
    }

    /// Resolve a conversation id, generating one when the caller sent none.
    ///
    /// An expired conversation is dropped here, so the caller keeps the id
    /// but continues with an empty history.
    pub fn resolve(&self, requested: Option<String>) -> String {
        let id = requested.unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Ok(mut conversations) = self.conversations.lock() {
            let expired = conversations
                .get(&id)
                .map(|c| self.is_expired(c))
                .unwrap_or(false);
            if expired {
                conversations.remove(&id);
            }
        }

        id
    }

    /// Render a conversation's history for the prompt. Empty string when
    /// there is none.
    pub fn render(&self, id: &str) -> String {
        let conversations = match self.conversations.lock() {
            Ok(c) => c,
            Err(_) => return String::new(),
        };

        match conversations.get(id) {
            Some(conversation) => conversation
                .turns
                .iter()
                .map(|t| format!("Human: {}\nAssistant: {}", t.question, t.answer))
                .collect::<Vec<_>>()
                .join("\n"),
            None => String::new(),
        }
    }

    /// Record a completed turn, trimming the window to `context_turns`.
    pub fn record(&self, id: &str, question: &str, answer: &str) {
        let mut conversations = match self.conversations.lock() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Conversation lock poisoned: {}", e);
                return;
            }
        };

        let now = Local::now().timestamp();
        let conversation = conversations
            .entry(id.to_string())
            .or_insert_with(|| Conversation {
                turns: Vec::new(),
                last_message_at: now,
            });

        conversation.last_message_at = now;
        conversation.turns.push(Turn {
            question: question.to_string(),
            answer: answer.to_string(),
        });
        while conversation.turns.len() > self.context_turns {
            conversation.turns.remove(0);
        }
    }

    /// Number of turns currently stored for a conversation.
    pub fn turn_count(&self, id: &str) -> usize {
        self.conversations
            .lock()
            .ok()
            .and_then(|c| c.get(id).map(|conv| conv.turns.len()))
            .unwrap_or(0)
    }

    fn is_expired(&self, conversation: &Conversation) -> bool {
        let now = Local::now().timestamp();
        let timeout_secs = i64::from(self.session_timeout_minutes) * 60;
        now - conversation.last_message_at > timeout_secs
    }
}
