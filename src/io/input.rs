use std::path::Path;

use anyhow::{Context, Result};

use crate::generate::GenerationRecord;
use crate::models::{Episode, ShowProfile, TranscriptPage};

/// Parse a transcript-page export file into pages
pub fn read_pages(path: &Path) -> Result<Vec<TranscriptPage>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_pages_json(&content)
}

/// Parse a transcript-page export JSON string into pages
pub fn parse_pages_json(json: &str) -> Result<Vec<TranscriptPage>> {
    serde_json::from_str(json).context("Failed to parse transcript pages JSON")
}

/// Read structured episodes back from a previous structuring run
pub fn read_episodes(path: &Path) -> Result<Vec<Episode>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    serde_json::from_str(&content).context("Failed to parse episodes JSON")
}

/// Read a show profile; missing fields fall back to the defaults
pub fn read_profile(path: &Path) -> Result<ShowProfile> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    serde_json::from_str(&content).context("Failed to parse show profile JSON")
}

/// Read a saved generation record for re-rendering
pub fn read_generation(path: &Path) -> Result<GenerationRecord> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    serde_json::from_str(&content).context("Failed to parse generation record JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pages_json() {
        let json = r#"[{
            "number": 1,
            "name": "New Beginnings",
            "summary_link": "/1/new-beginnings",
            "summary": "Stories of starting over.",
            "acts": [{
                "id": "prologue",
                "blocks": [
                    {"speaker": "Ira Glass", "paragraphs": ["Welcome to the show."]},
                    {"paragraphs": ["Stay with us."]}
                ]
            }]
        }]"#;

        let pages = parse_pages_json(json).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].acts[0].blocks.len(), 2);
        assert_eq!(pages[0].acts[0].blocks[1].speaker, None);
    }

    #[test]
    fn test_parse_pages_rejects_wrong_shape() {
        assert!(parse_pages_json(r#"{"not": "a list"}"#).is_err());
    }

    #[test]
    fn test_read_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, r#"{"show_name": "Radiolab"}"#).unwrap();

        let profile = read_profile(&path).unwrap();
        assert_eq!(profile.show_name, "Radiolab");
        // unset fields come from the defaults
        assert_eq!(profile.host_speaker, "Ira Glass");
    }

    #[test]
    fn test_read_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_episodes(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
