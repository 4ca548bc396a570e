//! Consultation console
//!
//! Mounts a conversation session against the chat service and runs it as a
//! line-oriented chat on the terminal.

use consult_client::console::TranscriptPrinter;
use consult_client::state_machine::{ConversationState, TransitionError};
use consult_client::{
    ClientConfig, ConversationSession, HttpChatService, Language, LoggingChatService,
    SessionError,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
Type a message and press Enter to send it.
  /lang <name>  restart the consultation in Slovak, English, German or Spanish
  /help         show this help
  /quit         leave";

/// One line typed by the user
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Message(String),
    Language(String),
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    /// Commands are recognised on the trimmed line; messages keep the raw text
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Input::Message(line.to_string());
        };

        let (name, argument) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, argument)| (name, argument.trim()));
        match name {
            "lang" => Input::Language(argument.to_string()),
            "help" => Input::Help,
            "quit" | "exit" => Input::Quit,
            _ => Input::Unknown(trimmed.to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consult_client=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        language = %config.language,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting consultation client"
    );

    let http = HttpChatService::from_config(&config)?;
    let service = LoggingChatService::new(Arc::new(http));
    let session = ConversationSession::spawn(service, config.language);

    let renderer = tokio::spawn(render(session.subscribe()));

    println!("Consultation in {}. Type /help for commands.", config.language);
    session.initialize(config.language).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Message(text) if text.trim().is_empty() => {}
            Input::Message(text) => {
                if session.state().is_loading() {
                    println!("Still waiting for the assistant, please wait.");
                    continue;
                }
                session.set_input(text.as_str()).await?;
                match session.submit(text).await {
                    Ok(()) => {}
                    Err(SessionError::Rejected(TransitionError::Busy)) => {
                        println!("Still waiting for the assistant, please wait.");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Input::Language(name) => match name.parse::<Language>() {
                Ok(language) => {
                    println!("Switching to {language}.");
                    session.initialize(language).await?;
                }
                Err(e) => println!("{e}"),
            },
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Unknown(command) => println!("Unknown command {command}. Type /help."),
        }
    }

    // Dropping the last handle stops the runtime, which ends the renderer
    drop(session);
    renderer.await?;

    Ok(())
}

/// Print transcript changes and the waiting indicator as the state moves
async fn render(mut state_rx: watch::Receiver<ConversationState>) {
    let mut printer = TranscriptPrinter::new();
    let mut was_loading = false;

    loop {
        let (lines, loading) = {
            let state = state_rx.borrow_and_update();
            (printer.render(&state.displayed()), state.is_loading())
        };

        for line in lines {
            println!("{line}");
        }
        if loading && !was_loading {
            println!("...");
        }
        was_loading = loading;

        if state_rx.changed().await.is_err() {
            break;
        }
    }
}
