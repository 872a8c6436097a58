//! Chat command handler.
//!
//! Interactive session over stdin. Plain lines are questions; lines
//! starting with `/` are session commands.

use clap::Args;
use docuchat_core::{config::AppConfig, AppResult};
use docuchat_docs::ingest_files;
use docuchat_llm::ChatRole;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{connect, report_failures};
use crate::session::ChatSession;

const HELP: &str = "\
Commands:
  /load <paths>...  replace the loaded documents
  /docs             list loaded documents
  /unload           unload every document
  /history          show the conversation
  /clear            clear the conversation
  /help             show this help
  /quit             leave the chat
Anything else is sent as a question.";

/// Chat interactively about one or more documents
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// PDF/CSV files or directories to load at start
    pub files: Vec<PathBuf>,

    /// Wait for full answers instead of streaming them
    #[arg(long)]
    pub no_stream: bool,
}

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatInput {
    Question(String),
    Load(Vec<PathBuf>),
    Docs,
    Unload,
    History,
    Clear,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }

    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Question(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "load" => ChatInput::Load(parts.map(PathBuf::from).collect()),
        "docs" => ChatInput::Docs,
        "unload" => ChatInput::Unload,
        "history" => ChatInput::History,
        "clear" => ChatInput::Clear,
        "help" => ChatInput::Help,
        "quit" | "exit" => ChatInput::Quit,
        other => ChatInput::Unknown(other.to_string()),
    }
}

fn prompt() {
    print!("> ");
    std::io::stdout().flush().ok();
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let (client, settings) = connect(config)?;
        let mut session = ChatSession::new();

        if !self.files.is_empty() {
            self.load(&mut session, &self.files);
        }
        println!("DocuChat - type a question, or /help for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        prompt();

        while let Some(line) = lines.next_line().await? {
            match parse_input(&line) {
                ChatInput::Empty => {}
                ChatInput::Quit => break,
                ChatInput::Help => println!("{}", HELP),
                ChatInput::Unknown(command) => {
                    eprintln!("Unknown command: /{} (try /help)", command)
                }
                ChatInput::Load(paths) if paths.is_empty() => {
                    eprintln!("Usage: /load <paths>...")
                }
                ChatInput::Load(paths) => self.load(&mut session, &paths),
                ChatInput::Docs => {
                    if !session.has_documents() {
                        println!("No documents loaded.");
                    }
                    for doc in session.documents() {
                        println!(
                            "{} ({}, {} chars)",
                            doc.name,
                            doc.kind.as_str(),
                            doc.text.chars().count()
                        );
                    }
                }
                ChatInput::Unload => {
                    session.clear_documents();
                    println!("Documents unloaded.");
                }
                ChatInput::History => {
                    for entry in session.history() {
                        let label = match (entry.role, entry.error) {
                            (ChatRole::User, _) => "you",
                            (_, true) => "assistant (error)",
                            _ => "assistant",
                        };
                        println!("[{}] {}", label, entry.content);
                    }
                }
                ChatInput::Clear => {
                    session.clear_history();
                    println!("History cleared.");
                }
                ChatInput::Question(question) => {
                    let streaming = !self.no_stream;
                    let result = session
                        .ask(client.as_ref(), &settings, &question, streaming, |token| {
                            print!("{}", token);
                            std::io::stdout().flush().ok();
                        })
                        .await;

                    match result {
                        Ok(_) => println!(),
                        Err(e) if e.is_api() => eprintln!("{}", e.transcript_text()),
                        Err(e) => eprintln!("{}", e),
                    }
                }
            }

            prompt();
        }

        Ok(())
    }

    fn load(&self, session: &mut ChatSession, paths: &[PathBuf]) {
        let report = ingest_files(paths);
        report_failures(&report);

        if report.has_documents() {
            let count = session.load(report);
            println!("Ready to chat: {} document(s) loaded.", count);
        } else {
            eprintln!("No text found.");
        }
    }
}
