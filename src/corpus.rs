use tracing::{info, warn};

use crate::models::{Act, Episode, TrainingExample};
use crate::tokenizer::TokenCounter;

/// Marks the end of every prompt so the model learns where the request
/// stops and the transcript begins.
pub const PROMPT_END_TOKEN: &str = "\n\n###\n\n";
/// Stop sequence appended to every completion.
pub const COMPLETION_END_TOKEN: &str = "###";
/// Leading separator fine-tuning endpoints expect on completions.
pub const COMPLETION_START_TOKEN: &str = " ";
/// Combined prompt+completion ceiling of the completion models.
pub const MAX_TOKENS: usize = 2048;

/// Settings for a corpus assembly run
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Show name substituted into the prompt template
    pub show_name: String,
    /// Token ceiling for prompt plus completion
    pub max_tokens: usize,
    /// Hard cap on corpus size; overflow keeps the earliest examples
    pub max_entries: usize,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            show_name: "This American Life".to_string(),
            max_tokens: MAX_TOKENS,
            max_entries: 1000,
        }
    }
}

/// Result of corpus assembly
#[derive(Debug, Clone)]
pub struct Corpus {
    /// Examples that passed validation, in (episode, act) order
    pub examples: Vec<TrainingExample>,
    /// Candidates derived before validation
    pub candidates: usize,
    /// Candidates dropped for exceeding the token ceiling
    pub over_budget: usize,
    /// Valid examples dropped by the size cap
    pub truncated: usize,
}

/// Derive one training example per act of every episode, drop the ones
/// that blow the token budget, and cap the corpus size.
///
/// Deterministic: the same episodes, counter, and config produce
/// byte-identical examples in the same order.
pub fn assemble(
    episodes: &[Episode],
    counter: &dyn TokenCounter,
    config: &AssembleConfig,
) -> Corpus {
    let mut examples = Vec::new();
    let mut candidates = 0;
    let mut over_budget = 0;

    for episode in episodes {
        for act in &episode.acts {
            candidates += 1;
            let prompt = build_prompt(&act_prompt_label(act), &episode.summary, &config.show_name);
            let completion = build_completion(act);
            let token_count = counter.count(&prompt) + counter.count(&completion);
            let example = TrainingExample::new(prompt, completion, token_count);

            if example.token_count > config.max_tokens {
                over_budget += 1;
                warn!(
                    "Dropping example over the token budget ({} > {}): {}...",
                    example.token_count,
                    config.max_tokens,
                    example.prompt_excerpt()
                );
                continue;
            }
            examples.push(example);
        }
    }

    let mut truncated = 0;
    if examples.len() > config.max_entries {
        truncated = examples.len() - config.max_entries;
        warn!(
            "Corpus size {} is above the cap of {}, keeping the first {}",
            examples.len(),
            config.max_entries,
            config.max_entries
        );
        examples.truncate(config.max_entries);
    }

    info!(
        "Assembled {} training examples from {} candidates ({} over budget, {} truncated)",
        examples.len(),
        candidates,
        over_budget,
        truncated
    );

    Corpus {
        examples,
        candidates,
        over_budget,
        truncated,
    }
}

/// The prompt template shared by corpus assembly and episode generation.
pub fn build_prompt(act_label: &str, summary: &str, show_name: &str) -> String {
    format!(
        "Write a {} for an episode of the {} podcast with the summary {}{}",
        act_label, show_name, summary, PROMPT_END_TOKEN
    )
}

/// The label an act contributes to its prompt: numbered acts collapse to
/// the generic "act", everything else uses its display name lower-cased.
pub fn act_prompt_label(act: &Act) -> String {
    if act.id.contains("act") {
        "act".to_string()
    } else {
        act.name.to_lowercase()
    }
}

fn build_completion(act: &Act) -> String {
    format!(
        "{}{}{}",
        COMPLETION_START_TOKEN,
        act.transcript_text(),
        COMPLETION_END_TOKEN
    )
}
