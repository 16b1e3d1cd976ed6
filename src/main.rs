use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use showrunner::io::{
    read_episodes, read_generation, read_pages, read_profile, write_audio, write_corpus,
    write_episodes, write_generation, write_script,
};
use showrunner::{
    assemble, generate_episode, parse_episode_with_labels, render_audio, structure_all,
    AssembleConfig,
    BpeTokenCounter, GenerateConfig, GenerationRecord, OpenAiClient, OpenAiConfig, Script,
    ShowProfile, SpeechSynthesizer, TtsServerClient, VoiceAllocator, VoiceSession, MAX_TOKENS,
};

#[derive(Parser)]
#[command(name = "showrunner")]
#[command(author, version, about = "Radio-show episode pipeline: structure transcripts, assemble a fine-tuning corpus, generate new episodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Structure exported transcript pages into episodes
    Structure {
        /// Input transcript pages file (JSON export)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for structured episodes (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Assemble structured episodes into a fine-tuning corpus
    Assemble {
        /// Input structured episodes file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output corpus file (JSONL)
        #[arg(short, long)]
        output: PathBuf,

        /// Token ceiling per training example
        #[arg(long, default_value = "2048")]
        max_tokens: usize,

        /// Maximum number of corpus entries
        #[arg(long, default_value = "1000")]
        max_entries: usize,

        /// Show name used in prompt templates
        #[arg(long)]
        show: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate a new episode from a summary prompt
    Generate {
        /// Summary the episode is generated from
        #[arg(short, long)]
        summary: String,

        /// Fine-tuned model to query
        #[arg(long)]
        model_id: String,

        /// Directory for the saved units, script, and audio
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Number of interior acts
        #[arg(long, default_value = "1")]
        acts: u32,

        /// Show profile file (JSON); built-in defaults apply when omitted
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Base URL of the TTS server
        #[arg(long, default_value = "http://localhost:5002")]
        tts_url: String,

        /// Skip audio synthesis (script only)
        #[arg(long)]
        skip_audio: bool,

        /// Do not query a credits act
        #[arg(long)]
        no_credits: bool,

        /// Do not append the post-credits act
        #[arg(long)]
        no_post_credits: bool,

        /// Seed for reproducible voice casting
        #[arg(long)]
        seed: Option<u64>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the TTS server's voices, optionally writing an audition
    /// sample per voice
    Voices {
        /// Base URL of the TTS server
        #[arg(long, default_value = "http://localhost:5002")]
        tts_url: String,

        /// Write one sample WAV per voice into this directory
        #[arg(long)]
        sample_dir: Option<PathBuf>,

        /// Line spoken in each sample
        #[arg(
            long,
            default_value = "This is what I sound like reading a story on the radio."
        )]
        sample_text: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Re-render script and audio from a saved generation
    Render {
        /// Saved generation record (JSON)
        #[arg(short, long)]
        units: PathBuf,

        /// Directory for the script and audio
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Show profile file (JSON); built-in defaults apply when omitted
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Base URL of the TTS server
        #[arg(long, default_value = "http://localhost:5002")]
        tts_url: String,

        /// Skip audio synthesis (script only)
        #[arg(long)]
        skip_audio: bool,

        /// Seed for reproducible voice casting
        #[arg(long)]
        seed: Option<u64>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Structure {
            input,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            run_structure(input, output)
        }
        Commands::Assemble {
            input,
            output,
            max_tokens,
            max_entries,
            show,
            verbose,
        } => {
            setup_logging(verbose);
            run_assemble(input, output, max_tokens, max_entries, show)
        }
        Commands::Generate {
            summary,
            model_id,
            output_dir,
            acts,
            profile,
            tts_url,
            skip_audio,
            no_credits,
            no_post_credits,
            seed,
            verbose,
        } => {
            setup_logging(verbose);
            run_generate(
                summary,
                model_id,
                output_dir,
                acts,
                profile,
                tts_url,
                skip_audio,
                no_credits,
                no_post_credits,
                seed,
            )
            .await
        }
        Commands::Voices {
            tts_url,
            sample_dir,
            sample_text,
            verbose,
        } => {
            setup_logging(verbose);
            run_voices(tts_url, sample_dir, sample_text).await
        }
        Commands::Render {
            units,
            output_dir,
            profile,
            tts_url,
            skip_audio,
            seed,
            verbose,
        } => {
            setup_logging(verbose);
            run_render(units, output_dir, profile, tts_url, skip_audio, seed).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn run_structure(input: PathBuf, output: PathBuf) -> Result<()> {
    info!("Loading transcript pages from {:?}", input);
    let pages = read_pages(&input).context("Failed to load transcript pages")?;
    info!(
        "Loaded {} pages ({} dialogue blocks)",
        pages.len(),
        pages.iter().map(|p| p.block_count()).sum::<usize>()
    );

    let episodes = structure_all(&pages);
    write_episodes(&output, &episodes)?;
    info!("Wrote {} episodes to {:?}", episodes.len(), output);

    Ok(())
}

fn run_assemble(
    input: PathBuf,
    output: PathBuf,
    max_tokens: usize,
    max_entries: usize,
    show: Option<String>,
) -> Result<()> {
    info!("Loading episodes from {:?}", input);
    let episodes = read_episodes(&input).context("Failed to load episodes")?;
    info!("Loaded {} episodes", episodes.len());

    let counter = BpeTokenCounter::new()?;
    let mut config = AssembleConfig {
        max_tokens,
        max_entries,
        ..AssembleConfig::default()
    };
    if let Some(show) = show {
        config.show_name = show;
    }

    let corpus = assemble(&episodes, &counter, &config);
    write_corpus(&output, &corpus.examples)?;
    info!(
        "Wrote {} training examples to {:?}",
        corpus.examples.len(),
        output
    );

    Ok(())
}

async fn run_generate(
    summary: String,
    model_id: String,
    output_dir: PathBuf,
    acts: u32,
    profile: Option<PathBuf>,
    tts_url: String,
    skip_audio: bool,
    no_credits: bool,
    no_post_credits: bool,
    seed: Option<u64>,
) -> Result<()> {
    let profile = load_profile(profile)?;
    let counter = BpeTokenCounter::new()?;
    let config = GenerateConfig {
        interior_acts: acts,
        include_credits: !no_credits,
        include_post_credits: !no_post_credits,
        max_tokens: MAX_TOKENS,
    };

    let api_config = OpenAiConfig::from_env(model_id.clone())?;
    let client = OpenAiClient::new(api_config);

    info!("Generating episode for summary: {}", summary);
    let record = generate_episode(&client, &counter, &profile, &config, &summary, &model_id).await?;

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
    let units_path = output_dir.join("episode_data.json");
    write_generation(&units_path, &record)?;
    info!("Saved generation record to {:?}", units_path);

    render_outputs(&record, &profile, &output_dir, &tts_url, skip_audio, seed).await
}

async fn run_voices(
    tts_url: String,
    sample_dir: Option<PathBuf>,
    sample_text: String,
) -> Result<()> {
    let synthesizer = TtsServerClient::new(&tts_url);
    let voices = synthesizer
        .voices()
        .await
        .context("Failed to list TTS voices")?;
    info!("TTS server offers {} voices", voices.len());
    for voice in &voices {
        println!("{}", voice);
    }

    let Some(sample_dir) = sample_dir else {
        return Ok(());
    };
    std::fs::create_dir_all(&sample_dir)
        .with_context(|| format!("Failed to create sample directory: {:?}", sample_dir))?;

    // a broken voice model should not stop the audition of the rest
    for voice in &voices {
        match synthesizer.synthesize(&sample_text, voice).await {
            Ok(wav) => {
                let path = sample_dir.join(format!("{}.wav", voice));
                write_audio(&path, &wav)?;
                info!("Wrote sample for '{}' to {:?}", voice, path);
            }
            Err(err) => {
                warn!("Skipping voice '{}': {:#}", voice, err);
            }
        }
    }

    Ok(())
}

async fn run_render(
    units: PathBuf,
    output_dir: PathBuf,
    profile: Option<PathBuf>,
    tts_url: String,
    skip_audio: bool,
    seed: Option<u64>,
) -> Result<()> {
    let profile = load_profile(profile)?;

    info!("Loading generation record from {:?}", units);
    let record = read_generation(&units).context("Failed to load generation record")?;
    info!(
        "Loaded {} units from session {}",
        record.units.len(),
        record.session_id
    );

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    render_outputs(&record, &profile, &output_dir, &tts_url, skip_audio, seed).await
}

/// Render the script and, unless skipped, the audio for one generation.
async fn render_outputs(
    record: &GenerationRecord,
    profile: &ShowProfile,
    output_dir: &Path,
    tts_url: &str,
    skip_audio: bool,
    seed: Option<u64>,
) -> Result<()> {
    let acts = parse_episode_with_labels(&record.units, &record.labels);
    info!(
        "Parsed {} acts ({} turns)",
        acts.len(),
        acts.iter().map(|a| a.turns.len()).sum::<usize>()
    );

    let script_path = output_dir.join("script.md");
    let script = Script::new(&acts, profile, record).format();
    write_script(&script_path, &script)?;
    info!("Wrote script to {:?}", script_path);

    if skip_audio {
        info!("Skipping audio synthesis (--skip-audio)");
        return Ok(());
    }

    let synthesizer = TtsServerClient::new(tts_url);
    let voices = synthesizer
        .voices()
        .await
        .context("Failed to list TTS voices")?;
    info!("TTS server offers {} voices", voices.len());

    let allocator = VoiceAllocator::new(voices, profile);
    let mut session = match seed {
        Some(seed) => VoiceSession::seeded(seed),
        None => VoiceSession::new(),
    };

    let wav = render_audio(&acts, profile, &allocator, &mut session, &synthesizer).await?;
    let audio_path = output_dir.join("audio.wav");
    write_audio(&audio_path, &wav)?;
    info!("Wrote audio to {:?}", audio_path);

    Ok(())
}

fn load_profile(path: Option<PathBuf>) -> Result<ShowProfile> {
    match path {
        Some(path) => {
            info!("Loading show profile from {:?}", path);
            read_profile(&path).context("Failed to load show profile")
        }
        None => Ok(ShowProfile::default()),
    }
}
