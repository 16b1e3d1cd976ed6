use tracing::{info, warn};

use crate::error::Error;
use crate::models::{Act, ActContainer, Episode, SpeechTurn, TranscriptPage};

/// Structure one transcript page into an episode.
///
/// Blocks are folded in document order with a carried speaker: an
/// explicit label updates it, an unlabeled block inherits it. A page
/// with no acts, or an act whose first block carries no label, is
/// malformed and fails as a whole; no partially structured episode is
/// ever returned.
pub fn structure(page: &TranscriptPage) -> Result<Episode, Error> {
    if page.acts.is_empty() {
        return Err(Error::MalformedSource(format!(
            "episode {} has no acts",
            page.number
        )));
    }

    let mut acts = Vec::with_capacity(page.acts.len());
    for container in &page.acts {
        acts.push(structure_act(page.number, container)?);
    }

    Ok(Episode {
        number: page.number,
        name: page.name.clone(),
        summary: page.summary.clone(),
        acts,
    })
}

/// Structure every page, skipping malformed ones.
///
/// Each failure is logged with the episode number; one bad page never
/// stops the batch.
pub fn structure_all(pages: &[TranscriptPage]) -> Vec<Episode> {
    let mut episodes = Vec::with_capacity(pages.len());
    for page in pages {
        match structure(page) {
            Ok(episode) => episodes.push(episode),
            Err(e) => warn!("Skipping episode {}: {}", page.number, e),
        }
    }
    info!("Structured {}/{} episodes", episodes.len(), pages.len());
    episodes
}

fn structure_act(episode_number: u32, container: &ActContainer) -> Result<Act, Error> {
    let mut act = Act::new(container.id.clone(), act_display_name(&container.id));
    let mut last_speaker: Option<String> = None;

    for block in &container.blocks {
        // A labeled block takes the floor; whitespace-only labels count
        // as absent.
        if let Some(label) = block.speaker.as_deref() {
            let label = label.trim();
            if !label.is_empty() {
                last_speaker = Some(label.to_string());
            }
        }

        let Some(speaker) = last_speaker.clone() else {
            return Err(Error::MalformedSource(format!(
                "episode {}: first block of act '{}' has no speaker label",
                episode_number, container.id
            )));
        };

        let text = block.text();
        let text = text.trim();
        if text.is_empty() {
            // Nothing was said, but the label above still holds for the
            // blocks that follow.
            continue;
        }

        act.turns.push(SpeechTurn::Dialogue {
            speaker,
            text: text.to_string(),
        });
    }

    Ok(act)
}

/// Derive a display name from an act identifier: `act1` becomes
/// `Act One`, anything without an `act` token is capitalized as-is
/// (`prologue` becomes `Prologue`). Identifiers whose act number falls
/// outside the single-digit table get an empty name.
pub fn act_display_name(id: &str) -> String {
    match id.split_once("act") {
        Some((_, rest)) => match digit_word(rest) {
            Some(word) => format!("Act {}", word),
            None => {
                warn!("Could not parse act identifier '{}' into a name", id);
                String::new()
            }
        },
        None => capitalize(id),
    }
}

fn digit_word(digit: &str) -> Option<&'static str> {
    match digit {
        "0" => Some("Zero"),
        "1" => Some("One"),
        "2" => Some("Two"),
        "3" => Some("Three"),
        "4" => Some("Four"),
        "5" => Some("Five"),
        "6" => Some("Six"),
        "7" => Some("Seven"),
        "8" => Some("Eight"),
        "9" => Some("Nine"),
        _ => None,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
