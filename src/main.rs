//! Command-line entry points: offline index build and interactive chat.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use docchat::{
    AppConfig, IngestOutcome, OpenAiChatModel, OpenAiEmbeddings, RecursiveChunker, Session,
    UploadedFile, build_index, load_documents_from_dir,
};

#[derive(Parser)]
#[command(name = "docchat", version, about = "Chat with your documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build or extend the persisted index from a folder of documents.
    Index {
        /// Folder containing .txt and .pdf files to index.
        #[arg(long, default_value = "data")]
        data: PathBuf,
        /// Directory holding the persisted vector store.
        #[arg(long, default_value = docchat::config::DEFAULT_STORE_DIR)]
        store: PathBuf,
        /// Collection name within the store directory.
        #[arg(long, default_value = "documents")]
        collection: String,
    },
    /// Start an interactive chat session over the indexed documents.
    Chat {
        /// Directory holding the persisted vector store.
        #[arg(long, default_value = docchat::config::DEFAULT_STORE_DIR)]
        store: PathBuf,
        /// Collection name within the store directory.
        #[arg(long, default_value = "documents")]
        collection: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; ignore a missing file.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Index { data, store, collection } => run_index(data, store, collection).await,
        Command::Chat { store, collection } => run_chat(store, collection).await,
    }
}

fn app_config(store: PathBuf, collection: String) -> anyhow::Result<AppConfig> {
    Ok(AppConfig::builder().store_dir(store).collection(collection).build()?)
}

/// Offline index build. Missing credentials and an empty data folder
/// are fatal here, unlike in the interactive loop.
async fn run_index(data: PathBuf, store: PathBuf, collection: String) -> anyhow::Result<()> {
    let config = app_config(store, collection)?;
    let embedder =
        Arc::new(OpenAiEmbeddings::from_env().context("an embedding API credential is required")?);

    let documents = load_documents_from_dir(&data)?;
    if documents.is_empty() {
        bail!("no documents could be loaded from {} — check the folder contents", data.display());
    }
    println!("Loaded {} document(s) from {}", documents.len(), data.display());

    let chunker = RecursiveChunker::new(config.chunk_size, config.chunk_overlap);
    let report = build_index(&documents, &chunker, embedder, &config).await?;
    println!(
        "Indexed {} chunk(s); the store at {} now holds {} entries.",
        report.chunks_added,
        config.store_dir.display(),
        report.total_entries
    );
    Ok(())
}

/// Interactive chat loop.
///
/// Missing credentials degrade the session rather than aborting: with
/// only the chat credential missing the store still loads and `:add`
/// still indexes, and questions get a hint instead of an answer.
async fn run_chat(store: PathBuf, collection: String) -> anyhow::Result<()> {
    let config = app_config(store, collection)?;

    let mut session = match (OpenAiEmbeddings::from_env(), OpenAiChatModel::from_env()) {
        (Ok(embedder), Ok(model)) => {
            Some(Session::open(config, Arc::new(embedder), Arc::new(model)).await?)
        }
        (Ok(embedder), Err(err)) => {
            eprintln!("Warning: {err}");
            eprintln!("Answers are disabled until GROQ_API_KEY is set; indexing still works.");
            Some(Session::open_without_chat(config, Arc::new(embedder)).await?)
        }
        (Err(embedder_err), model) => {
            eprintln!("Warning: {embedder_err}");
            if let Err(err) = model {
                eprintln!("Warning: {err}");
            }
            eprintln!("The session is disabled until the credentials above are configured.");
            None
        }
    };

    match &session {
        Some(s) if s.ready() => println!("Knowledge base: loaded and ready."),
        _ => println!("Knowledge base: empty. Run `docchat index` or use :add <file>..."),
    }
    println!("Ask a question, :add <file>... to index documents, :quit to exit.");

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input)?;

        if input == ":quit" || input == ":q" {
            break;
        }

        let Some(session) = session.as_mut() else {
            println!("No embedding credential configured; set OPENAI_API_KEY and GROQ_API_KEY.");
            continue;
        };

        if input == ":add" || input.starts_with(":add ") {
            add_files(session, input.trim_start_matches(":add")).await;
            continue;
        }

        match session.ask(input).await {
            Ok(reply) => {
                println!("{}", reply.answer);
                if !reply.sources.is_empty() {
                    println!("\nSources:");
                    for source in &reply.sources {
                        println!("- {source}");
                    }
                }
            }
            // Surface the failure and keep the session; prior state is untouched.
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    println!("Bye.");
    Ok(())
}

/// Handle `:add <file>...`: read each path, then ingest synchronously
/// before the next prompt.
async fn add_files(session: &mut Session, paths: &str) {
    let mut files = Vec::new();
    for path in paths.split_whitespace() {
        match UploadedFile::read(std::path::Path::new(path)) {
            Ok(file) => files.push(file),
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    if files.is_empty() {
        println!("Nothing to add. Usage: :add <file> [<file>...]");
        return;
    }

    match session.add_files(&files).await {
        Ok(IngestOutcome::Indexed { documents, chunks }) => {
            println!("Added {documents} document(s) as {chunks} chunk(s). Ready to chat.");
        }
        Ok(IngestOutcome::NothingToIndex) => {
            println!("Could not load any content from those files.");
        }
        Err(e) => eprintln!("Error: {e}"),
    }
}
