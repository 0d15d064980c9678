//! Higgs CLI - voice cloning and streaming speech synthesis
//!
//! A command-line front end for the `higgs` library.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod config;
mod error;

use clap::{Args, Parser, Subcommand};
use higgs::llms::{Boson, BosonConfig};
use higgs::synthesis::{StreamingSpeechRequest, VoiceCloneRequest, clone_voice, stream_speech_to_wav};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{HiggsConfig, config_path, load_config_from, save_config_to};
use crate::error::{CliError, Result};

const DEFAULT_REFERENCE_AUDIO: &str = "./ref-audio/hogwarts_wand_seller_v2.wav";
const DEFAULT_REFERENCE_TRANSCRIPT: &str = "I would imagine so. A wand with a dragon heartstring core is capable of dazzling magic. And the bond between you and your wand should only grow stronger. Do not be surprised at your new wand's ability to perceive your intentions - particularly in a moment of need.";

/// Higgs - speech generation from the command line
#[derive(Parser)]
#[command(name = "higgs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "HIGGS_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Speak text in the voice of a reference recording
    Clone(CloneArgs),

    /// Stream speech into a WAV file as it is generated
    Stream(StreamArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the clone command
#[derive(Args)]
struct CloneArgs {
    /// Text to speak
    #[arg(default_value = "Welcome to Boson AI's voice generation system.")]
    text: String,

    /// Reference recording whose voice is imitated
    #[arg(short, long, default_value = DEFAULT_REFERENCE_AUDIO)]
    reference_audio: PathBuf,

    /// Transcript of the reference recording
    #[arg(short = 't', long, default_value = DEFAULT_REFERENCE_TRANSCRIPT)]
    reference_transcript: String,

    /// Speaker index for the [SPEAKERn] tag
    #[arg(short, long, default_value_t = 0)]
    speaker: u32,

    /// Output file
    #[arg(short, long, default_value = "output.wav")]
    output: PathBuf,

    /// Model to use (overrides config)
    #[arg(short, long, env = "BOSON_MODEL")]
    model: Option<String>,
}

/// Arguments for the stream command
#[derive(Args)]
struct StreamArgs {
    /// Text to speak
    #[arg(default_value = "Hello from Boson AI! Streaming to WAV test.")]
    text: String,

    /// Output WAV file
    #[arg(short, long, default_value = "streamed_tts.wav")]
    output: PathBuf,

    /// Output token budget (overrides config)
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Model to use (overrides config)
    #[arg(short, long, env = "BOSON_MODEL")]
    model: Option<String>,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "higgs_cli={level},higgs={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config_path);
    match cli.command {
        Commands::Clone(args) => cmd_clone(args, &path).await,
        Commands::Stream(args) => cmd_stream(args, &path).await,
        Commands::Config(args) => cmd_config(args, path).await,
    }
}

/// Build the client from the environment key and file settings.
fn create_client(config: &HiggsConfig) -> Result<Boson> {
    let api_key = std::env::var(BosonConfig::API_KEY_ENV)
        .map_err(|_| CliError::MissingApiKey(BosonConfig::API_KEY_ENV))?;
    let client = Boson::new(config.boson_config(api_key))?;
    tracing::debug!(base_url = client.base_url(), model = client.model(), "created client");
    Ok(client)
}

/// Voice cloning.
async fn cmd_clone(args: CloneArgs, config_path: &std::path::Path) -> Result<()> {
    let mut config = load_config_from(config_path).await?;
    if let Some(model) = args.model {
        config.api.model = model;
    }

    let client = create_client(&config)?;
    let request = config.apply_sampling(
        VoiceCloneRequest::new(args.reference_audio, args.reference_transcript, args.text)
            .with_speaker(args.speaker),
    );

    let audio = clone_voice(&client, &request, &args.output).await?;
    println!("Saved {} bytes of audio to {}", audio.len(), args.output.display());

    Ok(())
}

/// Streaming synthesis.
async fn cmd_stream(args: StreamArgs, config_path: &std::path::Path) -> Result<()> {
    let mut config = load_config_from(config_path).await?;
    if let Some(model) = args.model {
        config.api.model = model;
    }
    if let Some(tokens) = args.max_tokens {
        config.stream.max_completion_tokens = tokens;
    }

    let client = create_client(&config)?;
    let request = config.apply_stream(StreamingSpeechRequest::new(args.text));

    let summary = stream_speech_to_wav(&client, &request, &args.output).await?;
    println!(
        "Saved streamed audio to {} ({:.2}s, {} audio chunks)",
        args.output.display(),
        summary.duration(&request.pcm).as_secs_f64(),
        summary.audio_chunks
    );
    if let Some(reason) = summary.stop_reason.filter(|r| r.is_truncated()) {
        println!("Generation stopped early: {reason}");
    }

    Ok(())
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_file: PathBuf) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            let config = load_config_from(&config_file).await?;
            let rendered = toml::to_string_pretty(&config).map_err(crate::config::ConfigError::from)?;
            println!("{rendered}");
            println!(
                "# {}: {}",
                BosonConfig::API_KEY_ENV,
                if std::env::var(BosonConfig::API_KEY_ENV).is_ok() {
                    "set"
                } else {
                    "-"
                }
            );
        }
        ConfigCommands::Init { force } => {
            if config_file.exists() && !force {
                println!("Configuration already exists at: {}", config_file.display());
                println!("Use --force to overwrite.");
                return Ok(());
            }
            save_config_to(&HiggsConfig::default(), &config_file).await?;
            println!("Configuration created: {}", config_file.display());
            println!();
            println!("Next steps:");
            println!("  1. export {}=<key>", BosonConfig::API_KEY_ENV);
            println!("  2. higgs stream");
        }
        ConfigCommands::Validate => match load_config_from(&config_file).await {
            Ok(config) => {
                for issue in config.validate() {
                    println!("{issue}");
                }
                if config.is_valid() {
                    println!("Configuration is valid");
                }
            }
            Err(e) => println!("error: {e}"),
        },
    }

    Ok(())
}
