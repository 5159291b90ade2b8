//! constitution-qa: terminal front end for the document Q&A client.
//! Asks one question given on the command line, or reads questions and
//! `:`-commands from stdin, and prints answers with their sources to stdout.

use clap::Parser;
use constitution_qa_client::config::{self, API_URL_ENV, CONFIG_PATH_ENV};
use constitution_qa_client::{
    AddOutcome, ChatSession, Client, DocumentRegistry, Message, QueryOutcome,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "constitution-qa", version, about = "Ask questions about a set of documents")]
struct Cli {
    /// Config file (default: ~/.constitution-qa/config.yaml)
    #[arg(long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Base URL of the Q&A API
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Document URL to query; repeat to register several. Replaces the configured list.
    #[arg(long = "document", value_name = "URL")]
    documents: Vec<String>,

    /// Question to ask. Without it, questions are read line by line from stdin.
    question: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let cfg = match config::load_resolved(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: failed to load config: {}", e);
            process::exit(1);
        }
    };

    let documents = if cli.documents.is_empty() {
        DocumentRegistry::from_urls(&cfg.documents)
    } else {
        DocumentRegistry::from_urls(&cli.documents)
    };

    let api_base = config::resolve_api_base(cli.api_url.as_deref(), &cfg);
    let client = match Client::new(&api_base) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    tracing::debug!(endpoint = %client.endpoint(), "client ready");

    let session = ChatSession::new(client, documents);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    let ok = rt.block_on(async {
        match cli.question.as_deref() {
            Some(question) => ask_once(&session, question).await,
            None => match run_interactive(&session).await {
                Ok(ok) => ok,
                Err(e) => {
                    eprintln!("Error: failed to read stdin: {}", e);
                    false
                }
            },
        }
    });

    if !ok {
        process::exit(1);
    }
}

/// One question from the command line. Returns false on a failed query.
async fn ask_once(session: &ChatSession, question: &str) -> bool {
    match session.ask(question).await {
        Some(outcome) => report(&outcome),
        None => {
            eprintln!("Error: no question provided");
            false
        }
    }
}

/// Line mode. Returns false if the last question asked failed.
async fn run_interactive(session: &ChatSession) -> io::Result<bool> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ok = true;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match command {
            ":quit" | ":q" => break,
            ":docs" => print_documents(&session.documents()),
            ":history" => print_history(&session.messages()),
            ":add" => match session.add_document(arg) {
                Ok(AddOutcome::Added) => println!("Added {}", arg),
                Ok(AddOutcome::AlreadyPresent) => println!("Already registered: {}", arg),
                Ok(AddOutcome::Empty) => {}
                Err(e) => eprintln!("{}", e),
            },
            ":remove" => match session.remove_document(arg) {
                Ok(true) => println!("Removed {}", arg),
                Ok(false) => eprintln!("Not registered: {}", arg),
                Err(e) => eprintln!("Error: {}", e),
            },
            _ => {
                if let Some(outcome) = session.ask(line).await {
                    ok = report(&outcome);
                }
            }
        }
    }
    Ok(ok)
}

/// Print an outcome; answers to stdout, failures to stderr.
fn report(outcome: &QueryOutcome) -> bool {
    match outcome {
        QueryOutcome::Answered(message) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let _ = print_answer(&mut out, message);
            true
        }
        QueryOutcome::Failed(message) => {
            eprintln!("{}", message.content);
            false
        }
        QueryOutcome::Cancelled => {
            eprintln!("Query cancelled");
            false
        }
    }
}

fn print_answer(out: &mut impl Write, message: &Message) -> io::Result<()> {
    writeln!(out, "{}", message.content)?;
    if let Some(sources) = message.sources.as_deref().filter(|s| !s.is_empty()) {
        writeln!(out, "\nSources:")?;
        for src in sources {
            writeln!(out, "  {}", src)?;
        }
    }
    out.flush()
}

fn print_documents(documents: &[String]) {
    println!("Documents ({}):", documents.len());
    for (i, doc) in documents.iter().enumerate() {
        println!("  {}. {}", i + 1, doc);
    }
}

fn print_history(messages: &[Message]) {
    for m in messages {
        let who = if m.is_user() { "You" } else { "AI" };
        println!("[{}] {}: {}", m.timestamp.format("%H:%M:%S"), who, m.content);
    }
}
