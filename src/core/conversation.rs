//! # Conversations
//!
//! A conversation is a chat run against a snapshot of the prompt:
//!
//! ```text
//! initial_prompt ─┬─ Part(User, "\nPerson: Hi")           submitted
//!                 ├─ Part(Generated, "\nAI: Hello!")      submitted
//!                 └─ Part(User, "\nPerson: How are...")   unsubmitted (send in flight)
//! ```
//!
//! Until the first part is submitted, a conversation tracks the live prompt
//! and parameters through [`normalize_conversations`]. After that it's locked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::inference::{CompletionParameters, MAX_STOP_SEQUENCES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartSource {
    User,
    Generated,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub source: PartSource,
    pub text: String,
    pub submitted: bool,
}

impl Part {
    pub fn user(text: String, submitted: bool) -> Self {
        Self {
            source: PartSource::User,
            text,
            submitted,
        }
    }

    pub fn generated(text: String) -> Self {
        Self {
            source: PartSource::Generated,
            text,
            submitted: true,
        }
    }
}

/// Markers framing each turn of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSequences {
    /// Inserted before user input.
    pub restart: String,
    /// Inserted before the generated completion.
    pub start: String,
}

impl Default for ChatSequences {
    fn default() -> Self {
        Self {
            restart: "\nPerson: ".to_string(),
            start: "\nAI:".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub initial_prompt: String,
    pub parameters: CompletionParameters,
    pub parts: Vec<Part>,
    /// Unsent text in the reply box.
    pub input: String,
    pub sequences: ChatSequences,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(prompt: &str, parameters: &CompletionParameters, sequences: ChatSequences) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            initial_prompt: prompt.to_string(),
            parameters: parameters.clone(),
            parts: Vec::new(),
            input: String::new(),
            sequences,
            created_at: Utc::now(),
        }
    }

    /// True once any part has been submitted. Started conversations are locked.
    pub fn has_started(&self) -> bool {
        self.parts.iter().any(|p| p.submitted)
    }

    /// Initial prompt followed by every submitted part.
    pub fn transcript(&self) -> String {
        let mut text = self.initial_prompt.clone();
        for part in self.parts.iter().filter(|p| p.submitted) {
            text.push_str(&part.text);
        }
        text
    }

    /// What an unstarted conversation displays: the prompt plus the cue for the user's first turn.
    pub fn preview(&self) -> String {
        format!("{}{}", self.initial_prompt, self.sequences.restart)
    }

    /// The user turn `input` would produce, or `None` when there's nothing to say.
    pub fn user_turn(&self, input: &str) -> Option<String> {
        if input.trim().is_empty() {
            None
        } else {
            Some(format!("{}{}", self.sequences.restart, input))
        }
    }

    /// Full text sent to the completion API for the given user turn.
    pub fn request_prompt(&self, user_turn: Option<&str>) -> String {
        let mut prompt = self.transcript();
        if let Some(turn) = user_turn {
            prompt.push_str(turn);
        }
        prompt.push_str(&self.sequences.start);
        prompt
    }

    /// Stop sequences: the trimmed restart marker, then the parameter snapshot's extras.
    pub fn stop_sequences(&self) -> Vec<String> {
        let mut stop = Vec::new();
        let restart = self.sequences.restart.trim();
        if !restart.is_empty() {
            stop.push(restart.to_string());
        }
        for extra in &self.parameters.stop {
            if !extra.is_empty() && !stop.contains(extra) {
                stop.push(extra.clone());
            }
        }
        stop.truncate(MAX_STOP_SEQUENCES);
        stop
    }

    /// Drops the optimistic user turn of an unresolved send.
    pub fn discard_unsubmitted(&mut self) {
        self.parts.retain(|p| p.submitted);
    }

    /// Re-derives the prompt and parameter snapshot. Returns whether anything changed.
    fn sync_with(&mut self, prompt: &str, parameters: &CompletionParameters) -> bool {
        let mut changed = false;
        if self.initial_prompt != prompt {
            self.initial_prompt = prompt.to_string();
            changed = true;
        }
        if &self.parameters != parameters {
            self.parameters = parameters.clone();
            changed = true;
        }
        changed
    }
}

/// Brings every unstarted, unfrozen conversation in line with the live prompt and parameters.
///
/// `is_frozen` marks conversations that must not change even though they have no
/// submitted part yet (a first send in flight). Returns the number of conversations updated.
pub fn normalize_conversations<F>(
    conversations: &mut [Conversation],
    prompt: &str,
    parameters: &CompletionParameters,
    is_frozen: F,
) -> usize
where
    F: Fn(&str) -> bool,
{
    conversations
        .iter_mut()
        .filter(|c| !c.has_started() && !is_frozen(&c.id))
        .map(|c| c.sync_with(prompt, parameters))
        .filter(|changed| *changed)
        .count()
}
