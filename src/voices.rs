use std::collections::{BTreeMap, BTreeSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::info;
use uuid::Uuid;

use crate::error::Error;
use crate::models::ShowProfile;

/// Casting rules for a show: the voice pool offered by the synthesizer
/// plus the profile's fixed assignments and exclusions. Immutable once
/// built; all per-script state lives in a [`VoiceSession`].
#[derive(Debug, Clone)]
pub struct VoiceAllocator {
    pool: Vec<String>,
    fixed: BTreeMap<String, String>,
    excluded: BTreeSet<String>,
}

impl VoiceAllocator {
    pub fn new(pool: Vec<String>, profile: &ShowProfile) -> Self {
        Self {
            pool,
            fixed: profile.fixed_voices.clone(),
            excluded: profile.excluded_voices.clone(),
        }
    }

    /// The voice for a speaker within one session.
    ///
    /// A speaker keeps its first voice for the session's lifetime. Fixed
    /// profile assignments win over random draws; random draws come from
    /// the pool minus already-assigned, fixed, and excluded voices, so
    /// two speakers never share a voice unless the profile pins them to
    /// the same one.
    pub fn assign(&self, speaker: &str, session: &mut VoiceSession) -> Result<String, Error> {
        if let Some(voice) = session.assignments.get(speaker) {
            return Ok(voice.clone());
        }

        if let Some(voice) = self.fixed.get(speaker) {
            session
                .assignments
                .insert(speaker.to_string(), voice.clone());
            return Ok(voice.clone());
        }

        let taken: BTreeSet<&String> = session.assignments.values().collect();
        let candidates: Vec<&String> = self
            .pool
            .iter()
            .filter(|v| !taken.contains(v))
            .filter(|v| !self.fixed.values().any(|fixed| fixed == *v))
            .filter(|v| !self.excluded.contains(v.as_str()))
            .collect();

        match candidates.choose(&mut session.rng) {
            Some(voice) => {
                info!(
                    "Assigned voice '{}' to speaker '{}' (session {})",
                    voice, speaker, session.session_id
                );
                session
                    .assignments
                    .insert(speaker.to_string(), (*voice).clone());
                Ok((*voice).clone())
            }
            None => Err(Error::PoolExhausted {
                speaker: speaker.to_string(),
                pool_size: self.pool.len(),
            }),
        }
    }
}

/// Per-script assignment state. Sessions are cheap to create and must
/// not be shared between scripts; a new script gets a new session.
#[derive(Debug)]
pub struct VoiceSession {
    /// Ties log lines and saved episode metadata to one script
    pub session_id: Uuid,
    assignments: BTreeMap<String, String>,
    rng: StdRng,
}

impl VoiceSession {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// A session with a fixed seed, for reproducible casting.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            assignments: BTreeMap::new(),
            rng,
        }
    }

    /// Speaker-to-voice assignments made so far
    pub fn assignments(&self) -> &BTreeMap<String, String> {
        &self.assignments
    }
}

impl Default for VoiceSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a profile's pronunciation substitutions to speech text, every
/// occurrence of every key, in key-sorted order.
pub fn apply_pronunciation(text: &str, fixes: &BTreeMap<String, String>) -> String {
    let mut out = text.to_string();
    for (word, replacement) in fixes {
        out = out.replace(word.as_str(), replacement);
    }
    out
}
