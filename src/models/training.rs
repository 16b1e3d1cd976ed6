use serde::{Deserialize, Serialize};

/// A single prompt/completion pair in the fine-tuning corpus.
///
/// Serialized one-per-line as JSONL with exactly the `prompt` and
/// `completion` fields, the shape fine-tuning endpoints ingest directly;
/// the token count is carried in memory for budget checks only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub prompt: String,
    pub completion: String,
    /// Combined token count of prompt and completion
    #[serde(skip)]
    pub token_count: usize,
}

impl TrainingExample {
    pub fn new(prompt: impl Into<String>, completion: impl Into<String>, token_count: usize) -> Self {
        Self {
            prompt: prompt.into(),
            completion: completion.into(),
            token_count,
        }
    }

    /// First 50 characters of the prompt, for log lines
    pub fn prompt_excerpt(&self) -> String {
        self.prompt.chars().take(50).collect()
    }
}
