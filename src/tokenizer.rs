use std::sync::Arc;

use anyhow::{Context, Result};
use tiktoken_rs::CoreBPE;

/// Deterministic token-count oracle used for corpus budgeting and
/// completion sizing.
pub trait TokenCounter {
    /// Number of tokens `text` encodes to. Equal inputs yield equal
    /// counts within a process.
    fn count(&self, text: &str) -> usize;
}

/// Counter backed by the GPT-2/GPT-3 byte-pair vocabulary, the encoding
/// the fine-tuned completion models bill against.
#[derive(Clone)]
pub struct BpeTokenCounter {
    bpe: Arc<CoreBPE>,
}

impl BpeTokenCounter {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::r50k_base().context("Failed to load r50k_base vocabulary")?;
        Ok(Self { bpe: Arc::new(bpe) })
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Whitespace-splitting counter for tests that need predictable counts.
#[cfg(test)]
pub(crate) struct WordCounter;

#[cfg(test)]
impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpe_counter_counts_tokens() {
        let counter = BpeTokenCounter::new().unwrap();
        assert!(counter.count("Hello, world!") > 0);
        assert_eq!(counter.count(""), 0);
    }

    #[test]
    fn test_bpe_counter_is_deterministic() {
        let counter = BpeTokenCounter::new().unwrap();
        let text = "Write a prologue for an episode of the show.";
        assert_eq!(counter.count(text), counter.count(text));
    }
}
