use serde::{Deserialize, Serialize};

/// One exported transcript page, as supplied by the page-fetch collaborator.
///
/// This is the boundary shape of the scraping side: a navigable document
/// already reduced to the fields the structurer consumes. How the HTML was
/// fetched and flattened into this shape is the collaborator's business; the
/// structurer only assumes this shape is stable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptPage {
    /// Episode number on the source site
    pub number: u32,
    /// Episode display name
    pub name: String,
    /// Link to the episode's summary page, kept for provenance
    #[serde(default)]
    pub summary_link: String,
    /// Summary text, resolved by the fetch collaborator by following the link
    #[serde(default)]
    pub summary: String,
    /// Act containers in source order
    pub acts: Vec<ActContainer>,
}

/// An act container from the source page
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActContainer {
    /// Source identifier of the act (e.g. "prologue", "act1")
    pub id: String,
    /// Dialogue blocks in document order
    pub blocks: Vec<DialogueBlock>,
}

/// One speaker/speech block inside an act container
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DialogueBlock {
    /// Speaker label, absent when the source continues the previous speaker
    #[serde(default)]
    pub speaker: Option<String>,
    /// Speech text fragments in document order
    pub paragraphs: Vec<String>,
}

impl TranscriptPage {
    /// Total number of dialogue blocks across all acts
    pub fn block_count(&self) -> usize {
        self.acts.iter().map(|a| a.blocks.len()).sum()
    }
}

impl DialogueBlock {
    /// Speech text of this block: fragments joined in document order with no
    /// separator inserted between them.
    pub fn text(&self) -> String {
        self.paragraphs.concat()
    }
}
