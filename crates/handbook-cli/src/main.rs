//! Handbook CLI - plan and write long-form handbooks, or chat with documents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use handbook_core::{word_count, GenerationPolicy};
use handbook_pipeline::{
    gather_context, is_handbook_request, DocumentChat, HandbookGenerator, InMemoryStore,
    Retriever, SharedOracle,
};

mod config;

use config::{check_output, ConfigError, DocArgs, LlmArgs, PolicyArgs};

/// Log filter used when RUST_LOG is unset.
const DEFAULT_LOG_FILTER: &str = "handbook=info";

/// Handbook CLI - long-form document generator
#[derive(Parser)]
#[command(name = "handbook")]
#[command(about = "Plan-then-write generator for long handbooks", long_about = None)]
struct Cli {
    #[command(flatten)]
    llm: LlmArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan and write a handbook
    Generate {
        /// Writing instruction
        instruction: String,

        #[command(flatten)]
        docs: DocArgs,

        /// Write the document here instead of stdout (a directory gets a timestamped file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Print the plan without writing any sections
    Plan {
        /// Writing instruction
        instruction: String,

        #[command(flatten)]
        docs: DocArgs,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Answer a question from the indexed documents
    Chat {
        /// Question to answer
        question: String,

        #[command(flatten)]
        docs: DocArgs,

        /// Sampling temperature for the answer
        #[arg(long)]
        temperature: Option<f32>,
    },

    /// Generate a handbook or answer a question, depending on the message
    Ask {
        /// Free-form message
        message: String,

        #[command(flatten)]
        docs: DocArgs,

        /// Where to write a generated handbook
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let client = cli.llm.client()?;
    info!(base_url = %client.base_url(), model = %client.model(), "Using completion provider");
    let oracle: SharedOracle = Arc::new(client);

    let mut stdout = tokio::io::stdout();
    match cli.command {
        Commands::Generate {
            instruction,
            docs,
            output,
            policy,
        } => {
            let policy = policy.policy()?;
            generate(oracle, &instruction, &docs, output.as_deref(), policy, &mut stdout).await?;
        }
        Commands::Plan {
            instruction,
            docs,
            policy,
        } => {
            let policy = policy.policy()?;
            plan(oracle, &instruction, &docs, policy).await?;
        }
        Commands::Chat {
            question,
            docs,
            temperature,
        } => {
            chat(oracle, &question, &docs, temperature).await?;
        }
        Commands::Ask {
            message,
            docs,
            output,
            policy,
        } => {
            let policy = policy.policy()?;
            if is_handbook_request(&message) {
                generate(oracle, &message, &docs, output.as_deref(), policy, &mut stdout).await?;
            } else {
                chat(oracle, &message, &docs, Some(policy.temperature)).await?;
            }
        }
    }

    Ok(())
}

async fn index_documents(docs: &DocArgs) -> Result<Arc<InMemoryStore>, Box<dyn std::error::Error>> {
    let store = Arc::new(InMemoryStore::new());
    for path in &docs.docs {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        store.insert(&text).await?;
        info!(path = %path.display(), words = word_count(&text), "Indexed document");
    }
    Ok(store)
}

async fn planning_context(
    docs: &DocArgs,
    instruction: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    if docs.docs.is_empty() {
        return Ok(String::new());
    }
    let store = index_documents(docs).await?;
    Ok(gather_context(store.as_ref(), instruction).await)
}

/// Plan and write a handbook. The document goes to `output`, or to `out`
/// when no output is given or the file cannot be written.
async fn generate<W>(
    oracle: SharedOracle,
    instruction: &str,
    docs: &DocArgs,
    output: Option<&Path>,
    policy: GenerationPolicy,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>>
where
    W: AsyncWrite + Unpin,
{
    check_output(output)?;
    let context = planning_context(docs, instruction).await?;
    let generator = HandbookGenerator::new(oracle, policy);

    eprintln!("Planning handbook structure...");
    let mut run = generator.generate(instruction, &context).await?;
    eprintln!(
        "Plan created: {} sections, ~{} words planned",
        run.tasks().len(),
        run.tasks().estimated_words()
    );

    let mut failure = None;
    while let Some(step) = run.next_snapshot().await {
        match step {
            Ok(snapshot) => eprintln!("{}", snapshot.header()),
            Err(e) => failure = Some(e),
        }
    }

    let document = run.document().trim();
    match failure {
        None => {
            write_document(output, document, out).await?;
            Ok(())
        }
        Some(e) => {
            let stage = if e.is_oracle_failure() {
                "Provider call failed"
            } else {
                "Generation failed"
            };
            eprintln!(
                "{stage} after {} of {} sections ({} words): {e}",
                run.completed(),
                run.tasks().len(),
                word_count(document)
            );
            if output.is_some() && !document.is_empty() {
                if let Err(write_err) = write_document(output, document, out).await {
                    warn!(error = %write_err, "Could not save partial document");
                }
            }
            Err(e.into())
        }
    }
}

async fn plan(
    oracle: SharedOracle,
    instruction: &str,
    docs: &DocArgs,
    policy: GenerationPolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = planning_context(docs, instruction).await?;
    let generator = HandbookGenerator::new(oracle, policy);
    let tasks = generator.plan(instruction, &context).await?;

    if tasks.is_empty() {
        warn!("Planner returned no tasks");
    }
    println!("{}", tasks.render());
    println!();
    println!(
        "{} sections, ~{} words planned",
        tasks.len(),
        tasks.estimated_words()
    );
    Ok(())
}

async fn chat(
    oracle: SharedOracle,
    question: &str,
    docs: &DocArgs,
    temperature: Option<f32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = index_documents(docs).await?;
    let mut chat = DocumentChat::new(oracle, store).with_mode(docs.mode);
    if let Some(temperature) = temperature {
        chat = chat.with_temperature(temperature);
    }

    let mut fragments = chat.answer_streaming(question).await?;
    let mut stdout = tokio::io::stdout();
    while let Some(fragment) = fragments.next().await {
        stdout.write_all(fragment?.as_bytes()).await?;
        stdout.flush().await?;
    }
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

/// Write to `out`, to `output`, or into `output` when it is a directory.
///
/// A failed file write still prints the document to `out` before the
/// error is returned.
async fn write_document<W>(
    output: Option<&Path>,
    document: &str,
    out: &mut W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let Some(output) = output else {
        return print_document(document, out).await;
    };

    let path = if output.is_dir() {
        output.join(timestamped_name(chrono::Local::now()))
    } else {
        output.to_path_buf()
    };
    if let Err(e) = tokio::fs::write(&path, document).await {
        warn!(path = %path.display(), error = %e, "Could not write document, printing it instead");
        print_document(document, out).await?;
        return Err(e);
    }
    eprintln!("Saved {} words to {}", word_count(document), path.display());
    Ok(())
}

async fn print_document<W>(document: &str, out: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(document.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

fn timestamped_name<Tz: chrono::TimeZone>(now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("handbook-{}.md", now.format("%Y%m%d-%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use clap::CommandFactory;
    use handbook_core::CompletionOptions;
    use handbook_pipeline::{CompletionOracle, FragmentStream, OracleError, PipelineError};

    /// Replays canned completions in order.
    struct ScriptOracle {
        script: Mutex<VecDeque<Result<String, OracleError>>>,
        calls: Mutex<usize>,
    }

    impl ScriptOracle {
        fn new(script: Vec<Result<String, OracleError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }

        fn next(&self) -> Result<String, OracleError> {
            *self.calls.lock().unwrap() += 1;
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(OracleError::Transport("script exhausted".to_string())))
        }
    }

    #[async_trait]
    impl CompletionOracle for ScriptOracle {
        async fn complete_blocking(
            &self,
            _prompt: &str,
            _options: &CompletionOptions,
        ) -> Result<String, OracleError> {
            self.next()
        }

        async fn complete_streaming(
            &self,
            _prompt: &str,
            _options: &CompletionOptions,
        ) -> Result<FragmentStream, OracleError> {
            let text = self.next()?;
            Ok(futures_util::stream::iter(vec![Ok(text)]).boxed())
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_with_flags() {
        let cli = Cli::try_parse_from([
            "handbook",
            "generate",
            "Create a handbook on backups",
            "--doc",
            "notes.md",
            "--doc",
            "runbook.md",
            "--min-tasks",
            "12",
            "--output",
            "out.md",
            "--model",
            "other-model",
        ])
        .unwrap();

        assert_eq!(cli.llm.model, "other-model");
        match cli.command {
            Commands::Generate {
                instruction,
                docs,
                output,
                policy,
            } => {
                assert_eq!(instruction, "Create a handbook on backups");
                assert_eq!(docs.docs.len(), 2);
                assert_eq!(output, Some(PathBuf::from("out.md")));
                assert_eq!(policy.min_tasks, Some(12));
            }
            _ => panic!("Expected generate"),
        }
    }

    #[test]
    fn test_parse_chat_mode() {
        let cli = Cli::try_parse_from(["handbook", "chat", "What is RAG?", "--mode", "MIX"]).unwrap();
        match cli.command {
            Commands::Chat { docs, .. } => {
                assert_eq!(docs.mode, handbook_pipeline::RetrievalMode::Mix);
            }
            _ => panic!("Expected chat"),
        }
    }

    #[test]
    fn test_parse_chat_temperature() {
        let cli = Cli::try_parse_from(["handbook", "chat", "What is RAG?", "--temperature", "0.2"])
            .unwrap();
        match cli.command {
            Commands::Chat { temperature, .. } => assert_eq!(temperature, Some(0.2)),
            _ => panic!("Expected chat"),
        }
    }

    #[test]
    fn test_timestamped_name() {
        use chrono::TimeZone;
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(timestamped_name(at), "handbook-20260304-050607.md");
    }

    #[tokio::test]
    async fn test_write_document_into_directory() {
        let dir = std::env::temp_dir().join(format!("handbook-out-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let mut out = Vec::new();
        write_document(Some(&dir), "one two three", &mut out).await.unwrap();

        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        let entry = entries.next_entry().await.unwrap().unwrap();
        let name = entry.file_name().to_string_lossy().to_string();
        let text = tokio::fs::read_to_string(entry.path()).await.unwrap();
        tokio::fs::remove_dir_all(&dir).await.ok();

        assert!(name.starts_with("handbook-") && name.ends_with(".md"));
        assert_eq!(text, "one two three");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_prints_document_instead() {
        let blocker = std::env::temp_dir().join(format!("handbook-blocker-{}", std::process::id()));
        tokio::fs::write(&blocker, "not a directory").await.unwrap();

        let mut out = Vec::new();
        let result = write_document(Some(&blocker.join("out.md")), "one two three", &mut out).await;
        tokio::fs::remove_file(&blocker).await.ok();

        assert!(result.is_err());
        assert_eq!(String::from_utf8(out).unwrap(), "one two three\n");
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_output_dir_before_planning() {
        let oracle = Arc::new(ScriptOracle::new(vec![]));
        let missing = std::env::temp_dir()
            .join(format!("handbook-no-such-dir-{}", std::process::id()))
            .join("out.md");

        let mut out = Vec::new();
        let err = generate(
            oracle.clone(),
            "Create a handbook",
            &DocArgs::default(),
            Some(&missing),
            GenerationPolicy::default(),
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::OutputDir { .. })
        ));
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_reports_oracle_failure_and_keeps_partial_document() {
        let oracle = Arc::new(ScriptOracle::new(vec![
            Ok("Paragraph 1 - Main Point: Tapes\nParagraph 2 - Main Point: Cloud".to_string()),
            Ok("Rotate tapes weekly.".to_string()),
            Err(OracleError::Transport("connection reset".to_string())),
        ]));
        let path = std::env::temp_dir().join(format!("handbook-partial-{}.md", std::process::id()));

        let mut out = Vec::new();
        let err = generate(
            oracle.clone(),
            "Create a handbook on backups",
            &DocArgs::default(),
            Some(&path),
            GenerationPolicy::default(),
            &mut out,
        )
        .await
        .unwrap_err();
        let saved = tokio::fs::read_to_string(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Oracle(OracleError::Transport(m))) if m == "connection reset"
        ));
        assert_eq!(saved, "Rotate tapes weekly.");
        assert_eq!(oracle.calls(), 3);
        assert!(out.is_empty());
    }
}
