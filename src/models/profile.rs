use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Show-specific casting and pronunciation configuration.
///
/// Injected immutably at construction time; nothing in the pipeline
/// mutates a profile once loaded. Deserializing a partial JSON profile
/// fills the missing fields from the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowProfile {
    /// Show name used in prompt templates and script headings
    pub show_name: String,
    /// Speaker attributed the synthesized post-credits lines
    pub host_speaker: String,
    /// Speakers whose voice is pinned rather than randomly drawn
    pub fixed_voices: BTreeMap<String, String>,
    /// Voices never handed out by random assignment
    pub excluded_voices: BTreeSet<String>,
    /// Spelling substitutions applied to speech text before synthesis,
    /// in key-sorted order
    pub pronunciation: BTreeMap<String, String>,
    /// Post-credits dialogue; the episode summary line is inserted after
    /// the first entry at generation time
    pub post_credits_lines: Vec<String>,
}

impl Default for ShowProfile {
    fn default() -> Self {
        Self {
            show_name: "This American Life".to_string(),
            host_speaker: "Ira Glass".to_string(),
            fixed_voices: BTreeMap::from([("Ira Glass".to_string(), "p241".to_string())]),
            excluded_voices: BTreeSet::from(["ED".to_string()]),
            pronunciation: BTreeMap::from([
                ("Ira".to_string(), "eyera".to_string()),
                ("Kukar".to_string(), "coocar".to_string()),
                ("Malatia".to_string(), "mala tia".to_string()),
                ("PRI".to_string(), "P R I".to_string()),
                ("WBEZ".to_string(), "W B E Z".to_string()),
            ]),
            post_credits_lines: vec![
                "This episode was generated by a fine-tuned language model.".to_string(),
                "Thank you for listening!".to_string(),
            ],
        }
    }
}

impl ShowProfile {
    /// The post-credits lines with the episode summary inserted as the
    /// second line. Returns a fresh list; the profile is not mutated.
    pub fn post_credits_with_summary(&self, summary: &str) -> Vec<String> {
        let mut lines = self.post_credits_lines.clone();
        let at = 1.min(lines.len());
        lines.insert(at, format!("The prompt for this episode was {}", summary));
        lines
    }
}
