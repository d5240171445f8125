//! QuestionCrafter CLI
//!
//! The `questioncrafter` command selects expert personas for a question, runs
//! the refinement dialogue, and manages the shared question library.
//!
//! ## Commands
//!
//! - `personas`: List the persona catalog
//! - `select`: Choose three personas for a question
//! - `refine`: Refine a question (selecting personas first unless given)
//! - `library`: Browse, submit, comment on and upvote library entries

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, Level};

use questioncrafter_core::{
    metrics::METRICS, telemetry, ChatModel, OpenAiChatModel, PersonaCatalog, QuestionCrafter,
    SelectedPersona,
};
use questioncrafter_library::{JsonFileLibrary, LibraryStore, NewComment, NewLibraryEntry};

/// Environment file read before arguments are parsed.
const ENV_FILE_VAR: &str = "QUESTIONCRAFTER_ENV_FILE";
const DEFAULT_ENV_FILE: &str = "keys.env";

#[derive(Parser)]
#[command(name = "questioncrafter")]
#[command(version = questioncrafter_core::VERSION)]
#[command(about = "Refine questions through a dialogue of expert personas", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Persona catalog (YAML with a top-level `personas:` mapping)
    #[arg(
        long,
        global = true,
        env = "QUESTIONCRAFTER_PERSONAS",
        default_value = "personas.yaml"
    )]
    catalog: PathBuf,

    /// Library file
    #[arg(
        long,
        global = true,
        env = "QUESTIONCRAFTER_LIBRARY",
        default_value = "library_entries.json"
    )]
    library: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available personas
    Personas,

    /// Choose three expert personas for a question
    Select {
        /// The question to analyse
        question: String,
    },

    /// Refine a question through the eleven-stage dialogue
    Refine {
        /// The question to refine
        question: String,

        /// JSON file with selected personas (output of `select`); personas are
        /// selected first when omitted
        #[arg(short, long)]
        personas: Option<PathBuf>,
    },

    /// Shared library of refined questions
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
}

#[derive(Subcommand)]
enum LibraryAction {
    /// List all entries
    List,

    /// Show one entry (counts as a view)
    Show {
        /// Entry ID
        id: u64,
    },

    /// Submit an entry from a JSON file ("-" reads stdin)
    Submit {
        /// Path to the entry JSON
        file: PathBuf,
    },

    /// Comment on an entry
    Comment {
        /// Entry ID
        id: u64,

        /// Comment text
        text: String,

        /// Comment author
        #[arg(short, long, default_value = questioncrafter_library::DEFAULT_AUTHOR)]
        author: String,
    },

    /// Upvote an entry
    Upvote {
        /// Entry ID
        id: u64,
    },
}

/// Persona file contents: either the `select` output or a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum PersonasFile {
    Wrapped {
        #[serde(rename = "selectedPersonas", alias = "personas")]
        personas: Vec<SelectedPersona>,
    },
    List(Vec<SelectedPersona>),
}

impl PersonasFile {
    fn into_personas(self) -> Vec<SelectedPersona> {
        match self {
            PersonasFile::Wrapped { personas } | PersonasFile::List(personas) => personas,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file =
        std::env::var(ENV_FILE_VAR).unwrap_or_else(|_| DEFAULT_ENV_FILE.to_string());
    let env_loaded = dotenvy::from_filename(&env_file).is_ok();

    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    telemetry::init_tracing(cli.json, level);
    debug!(env_file = %env_file, loaded = env_loaded, "environment file");

    let output = match cli.command {
        Commands::Personas => {
            let catalog = load_catalog(&cli.catalog)?;
            cmd_personas(&catalog)
        }
        Commands::Select { question } => {
            let crafter = build_crafter(&cli.catalog)?;
            cmd_select(&crafter, &question).await?
        }
        Commands::Refine { question, personas } => {
            let crafter = build_crafter(&cli.catalog)?;
            cmd_refine(&crafter, &question, personas.as_deref()).await?
        }
        Commands::Library { action } => {
            let store = JsonFileLibrary::new(&cli.library);
            cmd_library(&store, action).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    METRICS.flush();
    Ok(())
}

fn load_catalog(path: &Path) -> Result<PersonaCatalog> {
    PersonaCatalog::load(path)
        .with_context(|| format!("Failed to load persona catalog from {}", path.display()))
}

fn build_crafter(catalog_path: &Path) -> Result<QuestionCrafter> {
    let catalog = load_catalog(catalog_path)?;
    let model = OpenAiChatModel::from_env().context("Failed to configure language model")?;
    info!(model = %model.model(), personas = catalog.len(), "question crafter ready");
    let model: Arc<dyn ChatModel> = Arc::new(model);
    Ok(QuestionCrafter::new(model, Arc::new(catalog)))
}

/// List persona names in catalog order
fn cmd_personas(catalog: &PersonaCatalog) -> Value {
    json!({ "personas": catalog.names() })
}

/// Choose personas for a question
async fn cmd_select(crafter: &QuestionCrafter, question: &str) -> Result<Value> {
    let selection = crafter
        .select_personas(question)
        .await
        .context("Persona selection failed")?;
    Ok(json!({ "selectedPersonas": selection.to_records() }))
}

/// Refine a question, selecting personas first when no file is given
async fn cmd_refine(
    crafter: &QuestionCrafter,
    question: &str,
    personas_file: Option<&Path>,
) -> Result<Value> {
    let personas = match personas_file {
        Some(path) => read_personas(path)?,
        None => crafter
            .select_personas(question)
            .await
            .context("Persona selection failed")?
            .to_records(),
    };

    let outcome = crafter
        .refine_question(question, &personas)
        .await
        .context("Question refinement failed")?;
    Ok(serde_json::to_value(outcome)?)
}

fn read_personas(path: &Path) -> Result<Vec<SelectedPersona>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read personas from {}", path.display()))?;
    let file: PersonasFile = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid personas file {}", path.display()))?;
    Ok(file.into_personas())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Library sub-commands
async fn cmd_library(store: &dyn LibraryStore, action: LibraryAction) -> Result<Value> {
    match action {
        LibraryAction::List => {
            let entries = store.list().await?;
            Ok(json!({ "entries": entries }))
        }
        LibraryAction::Show { id } => {
            let entry = store
                .get(id)
                .await
                .with_context(|| format!("Failed to retrieve library entry {}", id))?;
            Ok(serde_json::to_value(entry)?)
        }
        LibraryAction::Submit { file } => {
            let entry: NewLibraryEntry = serde_json::from_str(&read_input(&file)?)
                .context("Invalid library entry")?;
            let id = store
                .submit(entry)
                .await
                .context("Failed to submit to library")?;
            Ok(json!({ "success": true, "id": id }))
        }
        LibraryAction::Comment { id, text, author } => {
            let mut comment = NewComment::new(id, text);
            comment.author = author;
            let comment_id = store
                .comment(comment)
                .await
                .context("Failed to add comment")?;
            Ok(json!({ "success": true, "id": comment_id, "entryId": id }))
        }
        LibraryAction::Upvote { id } => {
            store.upvote(id).await.context("Failed to upvote entry")?;
            Ok(json!({ "success": true, "entryId": id }))
        }
    }
}
