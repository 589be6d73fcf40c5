//! # EduGenius — Education Assistant CLI
//!
//! Question bank with semantic similar-question search.
//!
//! Usage:
//!   edugenius add --subject math --question "What is 6 x 7?" --answer "42"
//!   edugenius search "solve 2x + 3 = 7" --subject math
//!   edugenius answer "How do I factor x^2 - 4?"
//!   edugenius list math
//!   edugenius init-config

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use edugenius_bank::{QuestionBank, QuestionStore};
use edugenius_core::config::EduGeniusConfig;
use edugenius_core::traits::Tool;
use edugenius_tools::registry;

#[derive(Parser)]
#[command(
    name = "edugenius",
    version,
    about = "🎓 EduGenius — question bank with similar-question search"
)]
struct Cli {
    /// Path to config file (default: ~/.edugenius/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a question to the bank
    Add {
        /// Subject, e.g. math
        #[arg(long)]
        subject: String,

        /// The question text
        #[arg(long)]
        question: String,

        /// Question format: single_choice, multiple_choice, true_false,
        /// fill_blank, short_answer, essay
        #[arg(long = "type", default_value = "short_answer")]
        question_type: String,

        /// The correct answer
        #[arg(long)]
        answer: String,

        /// Difficulty 1-5
        #[arg(long, default_value = "3")]
        difficulty: i32,

        /// Grade level, e.g. grade-7
        #[arg(long)]
        grade: Option<String>,

        /// Knowledge point, e.g. "quadratic equations"
        #[arg(long)]
        topic: Option<String>,

        /// Worked solution shown after answering
        #[arg(long)]
        explanation: Option<String>,

        /// Choice options as JSON, e.g. '{"A": "2", "B": "4"}'
        #[arg(long)]
        options: Option<String>,

        /// Freeform tags as JSON
        #[arg(long)]
        tags: Option<String>,
    },

    /// Find stored questions similar to a query
    Search {
        /// Text to match against the bank
        query: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        grade: Option<String>,

        #[arg(long)]
        difficulty: Option<i32>,

        #[arg(long)]
        topic: Option<String>,

        /// Question id to leave out of the results
        #[arg(long)]
        exclude: Option<i64>,

        /// Maximum number of results
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Answer a question, then recommend practice from the bank
    Answer {
        /// The learner's question
        question: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        grade: Option<String>,

        #[arg(long)]
        difficulty: Option<i32>,
    },

    /// Show one question in full
    Get {
        /// Question id
        id: i64,
    },

    /// List stored questions for a subject
    List {
        /// Subject to list
        subject: String,

        #[arg(long)]
        grade: Option<String>,

        #[arg(long)]
        difficulty: Option<i32>,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Retire a question from search and listing
    Remove {
        /// Question id
        id: i64,
    },

    /// Print tool definitions as JSON (for agent integration)
    Tools,

    /// Write a default config file and exit
    InitConfig,
}

fn expand_path(p: &str) -> String {
    shellexpand::tilde(p).to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // init-config needs no bank or providers
    if let Commands::InitConfig = cli.command {
        let path = EduGeniusConfig::default_path();
        if path.exists() {
            println!("⚠️ Config already exists at {}", path.display());
            return Ok(());
        }
        EduGeniusConfig::default().save()?;
        println!("✅ Config written to {}", path.display());
        println!("   Edit it to pick embedding and chat providers.");
        return Ok(());
    }

    // Load config
    let config = match &cli.config {
        Some(path) => EduGeniusConfig::load_from(Path::new(&expand_path(path)))?,
        None => EduGeniusConfig::load()?,
    };

    // Open the bank and wire up tools
    let db_path = expand_path(&config.database.path);
    let store = Arc::new(QuestionStore::open(Path::new(&db_path))?);
    let embedder = edugenius_providers::create_embedder(&config)?;
    let chat = edugenius_providers::create_chat_model(&config)?;
    tracing::debug!(
        "🗄️ Bank at {db_path}, embeddings via {}, chat via {}",
        embedder.name(),
        chat.name()
    );

    let bank = Arc::new(QuestionBank::new(store, embedder));
    let tools = edugenius_tools::default_tools(bank, chat);

    match cli.command {
        Commands::Add {
            subject,
            question,
            question_type,
            answer,
            difficulty,
            grade,
            topic,
            explanation,
            options,
            tags,
        } => {
            let mut args = serde_json::json!({
                "operation": "add",
                "subject": subject,
                "question_text": question,
                "question_type": question_type,
                "correct_answer": answer,
                "difficulty": difficulty,
            });
            if let Some(grade) = grade {
                args["grade_level"] = grade.into();
            }
            if let Some(topic) = topic {
                args["topic"] = topic.into();
            }
            if let Some(explanation) = explanation {
                args["explanation"] = explanation.into();
            }
            if let Some(options) = options {
                args["options"] = serde_json::from_str(&options)
                    .map_err(|e| anyhow::anyhow!("Invalid --options JSON: {e}"))?;
            }
            if let Some(tags) = tags {
                args["tags"] = serde_json::from_str(&tags)
                    .map_err(|e| anyhow::anyhow!("Invalid --tags JSON: {e}"))?;
            }
            run_tool(&tools, "question_bank", args).await
        }

        Commands::Search {
            query,
            subject,
            grade,
            difficulty,
            topic,
            exclude,
            limit,
        } => {
            let mut args = serde_json::json!({
                "operation": "search",
                "query": query,
                "limit": limit,
            });
            if let Some(subject) = subject {
                args["subject"] = subject.into();
            }
            if let Some(grade) = grade {
                args["grade_level"] = grade.into();
            }
            if let Some(difficulty) = difficulty {
                args["difficulty"] = difficulty.into();
            }
            if let Some(topic) = topic {
                args["topic"] = topic.into();
            }
            if let Some(exclude) = exclude {
                args["exclude_id"] = exclude.into();
            }
            run_tool(&tools, "question_bank", args).await
        }

        Commands::Answer {
            question,
            subject,
            grade,
            difficulty,
        } => {
            let mut args = serde_json::json!({ "question": question });
            if let Some(subject) = subject {
                args["subject"] = subject.into();
            }
            if let Some(grade) = grade {
                args["grade_level"] = grade.into();
            }
            if let Some(difficulty) = difficulty {
                args["difficulty"] = difficulty.into();
            }
            run_tool(&tools, "answer_with_practice", args).await
        }

        Commands::Get { id } => {
            run_tool(
                &tools,
                "question_bank",
                serde_json::json!({"operation": "get", "id": id}),
            )
            .await
        }

        Commands::List {
            subject,
            grade,
            difficulty,
            limit,
        } => {
            let mut args = serde_json::json!({
                "operation": "list",
                "subject": subject,
                "limit": limit,
            });
            if let Some(grade) = grade {
                args["grade_level"] = grade.into();
            }
            if let Some(difficulty) = difficulty {
                args["difficulty"] = difficulty.into();
            }
            run_tool(&tools, "question_bank", args).await
        }

        Commands::Remove { id } => {
            run_tool(
                &tools,
                "question_bank",
                serde_json::json!({"operation": "remove", "id": id}),
            )
            .await
        }

        Commands::Tools => {
            let definitions = registry::list_definitions(&tools);
            println!("{}", serde_json::to_string_pretty(&definitions)?);
            Ok(())
        }

        Commands::InitConfig => unreachable!("handled above"),
    }
}

/// Execute one tool call and print its output.
async fn run_tool(tools: &[Box<dyn Tool>], name: &str, args: serde_json::Value) -> Result<()> {
    let tool = registry::find_tool(tools, name)
        .ok_or_else(|| anyhow::anyhow!("Tool '{name}' is not registered"))?;
    let result = tool.execute(&args.to_string()).await?;
    println!("{}", result.output.trim_end());
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
