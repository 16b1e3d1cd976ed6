use serde::{Deserialize, Serialize};

/// One unit of content within an act
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeechTurn {
    /// A spoken line attributed to a named speaker
    Dialogue { speaker: String, text: String },
    /// A stage direction, e.g. "LAUGHTER" or "MUSIC"
    Action { description: String },
}

impl SpeechTurn {
    /// The speaker name for dialogue turns, `None` for actions
    pub fn speaker(&self) -> Option<&str> {
        match self {
            SpeechTurn::Dialogue { speaker, .. } => Some(speaker),
            SpeechTurn::Action { .. } => None,
        }
    }

    /// The line this turn contributes to the training transcript text
    pub fn transcript_line(&self) -> String {
        match self {
            SpeechTurn::Dialogue { speaker, text } => format!("{} : {}\n", speaker, text),
            SpeechTurn::Action { description } => format!("[{}]\n", description),
        }
    }
}

/// A labeled section of an episode containing an ordered sequence of turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Act {
    /// Source identifier (e.g. "prologue", "act1") or positional label for
    /// generated acts (e.g. "act 1", "post-credits")
    pub id: String,
    /// Derived display name (e.g. "Prologue", "Act One"); empty when the
    /// identifier could not be parsed into a name
    pub name: String,
    /// Turns in order; order is significant and preserved exactly
    pub turns: Vec<SpeechTurn>,
}

impl Act {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            turns: Vec::new(),
        }
    }

    /// Serialize the act back into the line-oriented transcript shape the
    /// corpus and the completion model share: `SPEAKER : SPEECH\n` per
    /// dialogue turn, `[DESCRIPTION]\n` per action.
    pub fn transcript_text(&self) -> String {
        self.turns.iter().map(|t| t.transcript_line()).collect()
    }

    /// Number of dialogue turns (excluding actions)
    pub fn dialogue_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| matches!(t, SpeechTurn::Dialogue { .. }))
            .count()
    }
}

/// A structured episode: summary plus ordered acts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode number on the source site
    pub number: u32,
    /// Episode display name
    pub name: String,
    /// Episode summary text
    pub summary: String,
    /// Acts in source order; a well-formed episode has at least one
    pub acts: Vec<Act>,
}

impl Episode {
    /// Look up an act by its source identifier
    pub fn act(&self, id: &str) -> Option<&Act> {
        self.acts.iter().find(|a| a.id == id)
    }

    /// Total number of turns across all acts
    pub fn turn_count(&self) -> usize {
        self.acts.iter().map(|a| a.turns.len()).sum()
    }
}
