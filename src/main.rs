//! Sahayak CLI: a terminal driver for the conversation session engine.
//!
//! The engine itself is effect-free; this binary performs its output
//! events — printing replies, prompting for a delivery address when the
//! shopping helper asks, collecting a replacement API key, and optionally
//! speaking replies through the remote TTS fallback. A terminal has no
//! microphone integration, so speech capture runs as the unsupported
//! variant and input is typed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use sahayak::config::Config;
use sahayak::generation::GeminiClient;
use sahayak::modes::ModeConfig;
use sahayak::prefs::{MemoryPreferences, PreferencesStore, TomlPreferences};
use sahayak::session::{SessionEngine, SessionEvent};
use sahayak::speech::fallback::{RemoteTtsClient, Speaker};
use sahayak::speech::{NoCapture, NoSynthesizer, NullSink};
use sahayak::translate::LibreTranslateClient;
use sahayak::LanguageCode;

#[derive(Parser)]
#[command(name = "sahayak", version, about = "AI companion for senior citizens")]
struct Cli {
    /// Persona to talk to: religious, wellness, information, shopping
    #[arg(long, default_value = "information")]
    mode: String,

    /// Conversation language code (e.g. hi); overrides the saved preference
    #[arg(long)]
    lang: Option<String>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Speak replies through the remote TTS service
    #[arg(long)]
    speak: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sahayak=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let prefs: Arc<dyn PreferencesStore> = match Config::default_prefs_path() {
        Some(path) => match TomlPreferences::open(&path) {
            Ok(store) => Arc::new(store),
            Err(error) => {
                tracing::warn!(error = %error, "preferences unavailable; using in-memory store");
                Arc::new(MemoryPreferences::new())
            }
        },
        None => Arc::new(MemoryPreferences::new()),
    };

    let mut engine = SessionEngine::new(
        ModeConfig::from_slug(&cli.mode),
        prefs,
        Arc::new(GeminiClient::new(&config)?),
        Arc::new(LibreTranslateClient::new(&config)?),
        Arc::new(NoCapture),
    );

    if let Some(code) = &cli.lang {
        match LanguageCode::from_code(code) {
            Some(language) => engine.change_language(language),
            None => anyhow::bail!("unknown language code '{code}'"),
        }
    }

    let speaker = if cli.speak {
        Some(Speaker::new(
            Arc::new(NoSynthesizer),
            RemoteTtsClient::new(&config)?,
            Arc::new(NullSink),
        ))
    } else {
        None
    };

    println!(
        "Sahayak — {} ({})",
        engine.mode().name,
        engine.state().language.display_name()
    );
    println!("Commands: /mode <slug>  /lang <code>  /key <value>  /quit");
    if let Some(welcome) = engine.state().messages.last() {
        println!("{}> {}", engine.mode().name, welcome.text);
    }

    let mut editor = DefaultEditor::new()?;
    let mut location: Option<String> = None;

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(&line)?;

        if let Some(command) = line.strip_prefix('/') {
            if !run_command(command, &mut engine) {
                break;
            }
            continue;
        }

        let events = engine.submit_turn(&line).await;

        if let Some(reply) = engine.state().messages.last() {
            println!("{}> {}", engine.mode().name, reply.text);
        }

        for event in events {
            match event {
                SessionEvent::Speak { text, language } => {
                    if let Some(speaker) = &speaker {
                        speaker.speak(&text, language).await;
                    }
                }
                SessionEvent::LocationRequested => {
                    if let Ok(address) = editor.readline("delivery address> ") {
                        let address = address.trim().to_string();
                        if !address.is_empty() {
                            println!("Delivering to: {address}");
                            location = Some(address);
                        }
                    }
                }
                SessionEvent::KeyRecoveryRequested { reason } => {
                    println!("The API key was rejected: {reason}");
                    if let Ok(key) = editor.readline("new API key (blank to keep)> ") {
                        let key = key.trim().to_string();
                        let answer = (!key.is_empty()).then_some(key);
                        for followup in engine.supply_api_key(answer) {
                            if followup == SessionEvent::KeyUpdated {
                                println!("API key updated.");
                            }
                        }
                    }
                }
                SessionEvent::KeyUpdated => println!("API key updated."),
            }
        }
    }

    if let Some(address) = location {
        tracing::debug!(address = %address, "session ended with a confirmed location");
    }
    println!("Goodbye!");
    Ok(())
}

/// Handle a slash command. Returns false when the session should end.
fn run_command(command: &str, engine: &mut SessionEngine) -> bool {
    let mut parts = command.splitn(2, ' ');
    let name = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("").trim();

    match name {
        "quit" | "exit" => return false,
        "mode" => {
            engine.activate_mode(ModeConfig::from_slug(arg));
            println!("Switched to {}.", engine.mode().name);
            if let Some(welcome) = engine.state().messages.last() {
                println!("{}> {}", engine.mode().name, welcome.text);
            }
        }
        "lang" => match LanguageCode::from_code(arg) {
            Some(language) => {
                engine.change_language(language);
                println!("Language set to {}.", language.display_name());
            }
            None => {
                let known: Vec<&str> = LanguageCode::all().iter().map(|l| l.code()).collect();
                println!("Unknown language '{arg}'. Known: {}", known.join(", "));
            }
        },
        "key" => {
            let answer = (!arg.is_empty()).then(|| arg.to_string());
            for event in engine.supply_api_key(answer) {
                if event == SessionEvent::KeyUpdated {
                    println!("API key updated.");
                }
            }
        }
        "help" => println!("Commands: /mode <slug>  /lang <code>  /key <value>  /quit"),
        other => println!("Unknown command '/{other}'. Try /help."),
    }
    true
}
