use anyhow::{Context, Result};
use tracing::info;

use crate::generate::GenerationRecord;
use crate::models::{Act, ShowProfile, SpeechTurn};
use crate::tts::{merge_wav_segments, SpeechSynthesizer};
use crate::voices::{apply_pronunciation, VoiceAllocator, VoiceSession};

/// Human-readable script view of a generated episode
pub struct Script<'a> {
    acts: &'a [Act],
    profile: &'a ShowProfile,
    record: &'a GenerationRecord,
}

impl<'a> Script<'a> {
    pub fn new(acts: &'a [Act], profile: &'a ShowProfile, record: &'a GenerationRecord) -> Self {
        Self {
            acts,
            profile,
            record,
        }
    }

    /// Format the episode as a markdown script: show heading, session
    /// line, one section per act, one emphasized line per turn.
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", self.profile.show_name.to_uppercase()));
        output.push_str(&format!(
            "_Generated {} (session {})_\n",
            self.record.generated_at.format("%Y-%m-%d %H:%M UTC"),
            self.record.session_id
        ));

        for act in self.acts {
            output.push_str(&format!("\n## {}\n\n", act.name.to_uppercase()));
            for turn in &act.turns {
                match turn {
                    SpeechTurn::Action { description } => {
                        output.push_str(&format!("**[{}]**\n\n", description));
                    }
                    SpeechTurn::Dialogue { speaker, text } => {
                        output.push_str(&format!("**{}** : {}\n\n", speaker, text));
                    }
                }
            }
        }

        output
    }
}

/// Synthesize the spoken turns of an episode into one WAV blob.
///
/// Turns are voiced in order. Action turns and dialogue that is empty
/// after trimming are skipped entirely and consume no voice; spoken
/// text goes through the profile's pronunciation fixes first. Voices
/// come from the allocator, so a speaker keeps one voice across acts.
pub async fn render_audio(
    acts: &[Act],
    profile: &ShowProfile,
    allocator: &VoiceAllocator,
    session: &mut VoiceSession,
    synthesizer: &dyn SpeechSynthesizer,
) -> Result<Vec<u8>> {
    let mut segments = Vec::new();

    for act in acts {
        for turn in &act.turns {
            let SpeechTurn::Dialogue { speaker, text } = turn else {
                continue;
            };
            let speech = apply_pronunciation(text, &profile.pronunciation);
            let speech = speech.trim();
            if speech.is_empty() {
                continue;
            }

            let voice = allocator.assign(speaker, session)?;
            let wav = synthesizer.synthesize(speech, &voice).await.with_context(|| {
                format!("Synthesis failed for '{}' in act '{}'", speaker, act.id)
            })?;
            segments.push(wav);
        }
    }

    if segments.is_empty() {
        anyhow::bail!("Episode has no speakable dialogue");
    }

    info!(
        "Synthesized {} dialogue turns with {} voices",
        segments.len(),
        session.assignments().len()
    );
    merge_wav_segments(&segments)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::completion::parse_act;
    use crate::tts::audio::dummy_wav;

    fn record() -> GenerationRecord {
        GenerationRecord {
            session_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            model_id: "davinci:ft-test".to_string(),
            summary: "a test".to_string(),
            units: vec![],
            labels: vec![],
        }
    }

    fn dialogue(speaker: &str, text: &str) -> SpeechTurn {
        SpeechTurn::Dialogue {
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    struct RecordingSynth {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSynth {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSynth {
        async fn voices(&self) -> Result<Vec<String>> {
            Ok(vec!["p241".to_string(), "p225".to_string()])
        }

        async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), voice_id.to_string()));
            Ok(dummy_wav(8, 22050))
        }
    }

    #[test]
    fn test_script_format_shape() {
        let mut act = Act::new("prologue", "PROLOGUE");
        act.turns.push(dialogue("Ira Glass", "Welcome to the show."));
        act.turns.push(SpeechTurn::Action {
            description: "MUSIC".to_string(),
        });
        let acts = vec![act];
        let profile = ShowProfile::default();
        let record = record();

        let script = Script::new(&acts, &profile, &record).format();

        assert!(script.starts_with("# THIS AMERICAN LIFE\n\n"));
        assert!(script.contains(&format!("session {}", record.session_id)));
        assert!(script.contains("\n## PROLOGUE\n"));
        assert!(script.contains("**Ira Glass** : Welcome to the show.\n\n"));
        assert!(script.contains("**[MUSIC]**\n\n"));
    }

    #[test]
    fn test_script_upper_cases_act_names() {
        let acts = vec![Act::new("act1", "Act One")];
        let profile = ShowProfile::default();
        let record = record();

        let script = Script::new(&acts, &profile, &record).format();
        assert!(script.contains("## ACT ONE\n"));
    }

    #[test]
    fn test_script_round_trips_through_parser() {
        let mut act = Act::new("act 1", "ACT 1");
        act.turns.push(dialogue("Ira Glass", "Welcome back."));
        act.turns.push(SpeechTurn::Action {
            description: "APPLAUSE".to_string(),
        });
        act.turns.push(dialogue("Zoe Chace", "Here is the thing."));
        let acts = vec![act.clone()];
        let profile = ShowProfile::default();
        let record = record();

        let script = Script::new(&acts, &profile, &record).format();

        // drop headings and the session line, then strip the emphasis
        // marks; what remains is the line-oriented turn shape
        let body: String = script
            .lines()
            .filter(|l| !l.starts_with('#') && !l.starts_with('_'))
            .map(|l| format!("{}\n", l.replace("**", "")))
            .collect();

        let reparsed = parse_act(&body, 1, 4);
        assert_eq!(reparsed.turns, act.turns);
    }

    #[tokio::test]
    async fn test_audio_applies_pronunciation_and_fixed_voice() {
        let mut prologue = Act::new("prologue", "PROLOGUE");
        prologue.turns.push(dialogue("Ira Glass", "Welcome."));
        let mut act1 = Act::new("act 1", "ACT 1");
        act1.turns.push(dialogue("Ira Glass", "Kukar was here."));
        let acts = vec![prologue, act1];

        let profile = ShowProfile::default();
        let synth = RecordingSynth::new();
        let allocator = VoiceAllocator::new(synth.voices().await.unwrap(), &profile);
        let mut session = VoiceSession::seeded(1);

        let wav = render_audio(&acts, &profile, &allocator, &mut session, &synth)
            .await
            .unwrap();
        assert!(wav.starts_with(b"RIFF"));

        let calls = synth.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                ("Welcome.".to_string(), "p241".to_string()),
                ("coocar was here.".to_string(), "p241".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_audio_skips_actions_without_consuming_voices() {
        let mut act = Act::new("prologue", "PROLOGUE");
        act.turns.push(SpeechTurn::Action {
            description: "MUSIC".to_string(),
        });
        act.turns.push(dialogue("Guest", "hello"));
        act.turns.push(dialogue("Guest", "   "));
        let acts = vec![act];

        let profile = ShowProfile {
            fixed_voices: Default::default(),
            ..ShowProfile::default()
        };
        let synth = RecordingSynth::new();
        // a single available voice; it must go to the one real speaker
        let allocator = VoiceAllocator::new(vec!["p225".to_string()], &profile);
        let mut session = VoiceSession::seeded(2);

        render_audio(&acts, &profile, &allocator, &mut session, &synth)
            .await
            .unwrap();

        let calls = synth.calls.lock().unwrap();
        assert_eq!(*calls, vec![("hello".to_string(), "p225".to_string())]);
        assert_eq!(session.assignments().len(), 1);
    }

    #[tokio::test]
    async fn test_audio_fails_on_pool_exhaustion() {
        let mut act = Act::new("prologue", "PROLOGUE");
        act.turns.push(dialogue("One", "hi"));
        act.turns.push(dialogue("Two", "there"));
        let acts = vec![act];

        let profile = ShowProfile {
            fixed_voices: Default::default(),
            ..ShowProfile::default()
        };
        let synth = RecordingSynth::new();
        let allocator = VoiceAllocator::new(vec!["p225".to_string()], &profile);
        let mut session = VoiceSession::seeded(3);

        let err = render_audio(&acts, &profile, &allocator, &mut session, &synth)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no voice available"));
    }

    #[tokio::test]
    async fn test_audio_with_no_dialogue_is_an_error() {
        let mut act = Act::new("prologue", "PROLOGUE");
        act.turns.push(SpeechTurn::Action {
            description: "MUSIC".to_string(),
        });
        let acts = vec![act];

        let profile = ShowProfile::default();
        let synth = RecordingSynth::new();
        let allocator = VoiceAllocator::new(vec!["p225".to_string()], &profile);
        let mut session = VoiceSession::seeded(4);

        assert!(
            render_audio(&acts, &profile, &allocator, &mut session, &synth)
                .await
                .is_err()
        );
    }
}
