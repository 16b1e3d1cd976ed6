pub mod completion;
pub mod corpus;
pub mod error;
pub mod generate;
pub mod io;
pub mod llm;
pub mod models;
pub mod render;
pub mod tokenizer;
pub mod transcript;
pub mod tts;
pub mod voices;

pub use completion::{parse_act, parse_episode, parse_episode_with_labels};
pub use corpus::{assemble, build_prompt, AssembleConfig, Corpus, MAX_TOKENS};
pub use error::Error;
pub use generate::{generate_episode, GenerateConfig, GenerationRecord};
pub use llm::{CompletionProvider, OpenAiClient, OpenAiConfig};
pub use models::{
    Act, DialogueBlock, Episode, ShowProfile, SpeechTurn, TrainingExample, TranscriptPage,
};
pub use render::{render_audio, Script};
pub use tokenizer::{BpeTokenCounter, TokenCounter};
pub use transcript::{structure, structure_all};
pub use tts::{SpeechSynthesizer, TtsServerClient};
pub use voices::{apply_pronunciation, VoiceAllocator, VoiceSession};
