use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::generate::GenerationRecord;
use crate::models::{Episode, TrainingExample};

/// Write structured episodes as pretty-printed JSON
pub fn write_episodes(path: &Path, episodes: &[Episode]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, episodes).context("Failed to write episodes JSON")?;
    Ok(())
}

/// Write the training corpus as JSONL: one `{prompt, completion}`
/// record per line, the shape fine-tuning uploads expect.
pub fn write_corpus(path: &Path, examples: &[TrainingExample]) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    for example in examples {
        let line = serde_json::to_string(example).context("Failed to serialize example")?;
        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
    }
    Ok(())
}

/// Write a saved generation record as pretty-printed JSON
pub fn write_generation(path: &Path, record: &GenerationRecord) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, record).context("Failed to write generation record")?;
    Ok(())
}

/// Write the rendered script text
pub fn write_script(path: &Path, script: &str) -> Result<()> {
    std::fs::write(path, script).with_context(|| format!("Failed to write script: {:?}", path))
}

/// Write the merged episode audio
pub fn write_audio(path: &Path, wav: &[u8]) -> Result<()> {
    std::fs::write(path, wav).with_context(|| format!("Failed to write audio: {:?}", path))
}
