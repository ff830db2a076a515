use serde::{Deserialize, Serialize};

/// The completions API accepts at most this many stop sequences.
pub const MAX_STOP_SEQUENCES: usize = 4;

/// Sampling parameters sent with every completion request.
///
/// Conversations snapshot these when they start so later edits
/// don't leak into a locked transcript.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CompletionParameters {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    /// Extra stop sequences, on top of the conversation's restart sequence.
    pub stop: Vec<String>,
}

impl Default for CompletionParameters {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo-instruct".to_string(),
            max_tokens: 150,
            temperature: 0.9,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.6,
            stop: Vec::new(),
        }
    }
}

/// A single numeric knob on [`CompletionParameters`], used by the parameters dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    MaxTokens,
    Temperature,
    TopP,
    FrequencyPenalty,
    PresencePenalty,
}

impl Parameter {
    pub const ALL: [Parameter; 5] = [
        Parameter::MaxTokens,
        Parameter::Temperature,
        Parameter::TopP,
        Parameter::FrequencyPenalty,
        Parameter::PresencePenalty,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Parameter::MaxTokens => "Max tokens",
            Parameter::Temperature => "Temperature",
            Parameter::TopP => "Top P",
            Parameter::FrequencyPenalty => "Frequency penalty",
            Parameter::PresencePenalty => "Presence penalty",
        }
    }
}

impl CompletionParameters {
    /// Formats the value of `param` for display.
    pub fn display_value(&self, param: Parameter) -> String {
        match param {
            Parameter::MaxTokens => self.max_tokens.to_string(),
            Parameter::Temperature => format!("{:.2}", self.temperature),
            Parameter::TopP => format!("{:.2}", self.top_p),
            Parameter::FrequencyPenalty => format!("{:.2}", self.frequency_penalty),
            Parameter::PresencePenalty => format!("{:.2}", self.presence_penalty),
        }
    }

    /// Returns a copy with `param` moved by `steps` increments, clamped to the API's range.
    pub fn adjusted(&self, param: Parameter, steps: i32) -> CompletionParameters {
        let mut next = self.clone();
        match param {
            Parameter::MaxTokens => {
                let value = self.max_tokens as i64 + steps as i64 * 10;
                next.max_tokens = value.clamp(1, 4096) as u32;
            }
            Parameter::Temperature => {
                next.temperature = step_f32(self.temperature, steps, 0.0, 1.0);
            }
            Parameter::TopP => {
                next.top_p = step_f32(self.top_p, steps, 0.0, 1.0);
            }
            Parameter::FrequencyPenalty => {
                next.frequency_penalty = step_f32(self.frequency_penalty, steps, 0.0, 2.0);
            }
            Parameter::PresencePenalty => {
                next.presence_penalty = step_f32(self.presence_penalty, steps, 0.0, 2.0);
            }
        }
        next
    }
}

/// Steps in hundredths so repeated adjustments don't accumulate float drift.
fn step_f32(value: f32, steps: i32, min: f32, max: f32) -> f32 {
    let hundredths = (value * 100.0).round() as i32 + steps * 5;
    (hundredths as f32 / 100.0).clamp(min, max)
}

/// Token accounting reported by the API, when present.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// A resolved completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}
