use thiserror::Error;

/// Failures raised by the core pipeline components.
///
/// Non-fatal conditions (unparseable act labels, over-budget training
/// examples, corpus truncation) are logged where they occur and do not
/// appear here. Collaborator failures propagate as `anyhow` errors with
/// context attached at the call site.
#[derive(Debug, Error)]
pub enum Error {
    /// A transcript page violates the structural assumptions, e.g. the
    /// first block of an act carries no speaker label. Fatal for that
    /// episode; batch runs skip it and continue.
    #[error("malformed source page: {0}")]
    MalformedSource(String),

    /// Every voice in the pool is already assigned, reserved by a fixed
    /// mapping, or excluded.
    #[error("no voice available for speaker '{speaker}' (pool of {pool_size})")]
    PoolExhausted { speaker: String, pool_size: usize },

    /// A generation prompt alone meets or exceeds the token ceiling,
    /// leaving no budget for the completion.
    #[error("prompt occupies {count} of {max} tokens, leaving no completion budget")]
    TokenBudget { count: usize, max: usize },
}
