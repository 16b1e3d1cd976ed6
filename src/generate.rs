use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::corpus::{build_prompt, MAX_TOKENS};
use crate::error::Error;
use crate::llm::CompletionProvider;
use crate::models::ShowProfile;
use crate::tokenizer::TokenCounter;

/// Settings for one episode-generation session
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Number of interior acts between the prologue and the credits
    pub interior_acts: u32,
    /// Whether to query a credits act
    pub include_credits: bool,
    /// Whether to append the locally synthesized post-credits act
    pub include_post_credits: bool,
    /// Combined prompt+completion token ceiling per query
    pub max_tokens: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            interior_acts: 1,
            include_credits: true,
            include_post_credits: true,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// One generated episode: the raw completion units in act order plus
/// enough metadata to re-render without another API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Ties the saved units, script, and log lines to one session
    pub session_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Fine-tuned model the units came from
    pub model_id: String,
    /// Summary prompt the episode was generated for
    pub summary: String,
    /// Raw completion text per act, in positional order
    pub units: Vec<String>,
    /// Act label per unit, parallel to `units`. Empty in records saved
    /// before labels were recorded; rendering then falls back to
    /// labeling by position.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// The act labels queried from the model, in order. The post-credits
/// act is not queried; it is synthesized locally from the profile.
pub fn query_labels(config: &GenerateConfig) -> Vec<String> {
    let mut labels = vec!["prologue".to_string()];
    for n in 1..=config.interior_acts {
        labels.push(format!("act {}", n));
    }
    if config.include_credits {
        labels.push("credits".to_string());
    }
    labels
}

/// Generate every act of one episode from a summary prompt.
///
/// Each queried unit gets the completion budget left under the token
/// ceiling once its prompt is counted; a prompt that leaves no budget
/// fails before anything is sent. Provider failures propagate with the
/// act label attached.
pub async fn generate_episode(
    provider: &dyn CompletionProvider,
    counter: &dyn TokenCounter,
    profile: &ShowProfile,
    config: &GenerateConfig,
    summary: &str,
    model_id: &str,
) -> Result<GenerationRecord> {
    let mut labels = query_labels(config);
    let mut units = Vec::with_capacity(labels.len() + 1);

    for label in &labels {
        let prompt = build_prompt(prompt_label(label), summary, &profile.show_name);
        let prompt_tokens = counter.count(&prompt);
        if prompt_tokens >= config.max_tokens {
            return Err(Error::TokenBudget {
                count: prompt_tokens,
                max: config.max_tokens,
            }
            .into());
        }
        let budget = (config.max_tokens - prompt_tokens) as u32;
        debug!(
            "Querying '{}' with a completion budget of {} tokens",
            label, budget
        );

        let raw = provider
            .complete(&prompt, budget)
            .await
            .with_context(|| format!("Completion for '{}' failed", label))?;
        info!("Generated '{}' ({} chars)", label, raw.len());
        units.push(raw);
    }

    if config.include_post_credits {
        units.push(post_credits_unit(profile, summary));
        labels.push("post-credits".to_string());
    }

    let record = GenerationRecord {
        session_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        model_id: model_id.to_string(),
        summary: summary.to_string(),
        units,
        labels,
    };
    info!(
        "Generated episode of {} units (session {})",
        record.units.len(),
        record.session_id
    );
    Ok(record)
}

/// The prompt label for a query unit: numbered acts collapse to the
/// generic "act" the corpus was assembled with.
fn prompt_label(unit: &str) -> &str {
    if unit.contains("act") { "act" } else { unit }
}

/// The post-credits unit in the same line-oriented shape the model
/// emits, spoken entirely by the host.
fn post_credits_unit(profile: &ShowProfile, summary: &str) -> String {
    profile
        .post_credits_with_summary(summary)
        .iter()
        .map(|line| format!("{} : {}\n", profile.host_speaker, line))
        .collect()
}
