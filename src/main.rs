//! ayurgraph CLI: knowledge-graph retrieval for an Ayurvedic assistant.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use ayurgraph::chat::Chatbot;
use ayurgraph::config::Config;
use ayurgraph::engine::Engine;
use ayurgraph::error::AyurResult;
use ayurgraph::graph::EntityCategory;
use ayurgraph::llm::GroqClient;

#[derive(Parser)]
#[command(name = "ayurgraph", version, about = "Ayurvedic knowledge-graph retrieval engine")]
struct Cli {
    /// Turtle file with the knowledge graph (overrides the config file).
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a comprehensive search and print the result as JSON.
    Search {
        /// Free-text query.
        query: String,
    },

    /// Print the visualization of the whole graph as JSON.
    Graph,

    /// Print the grounding context assembled for a query.
    Context {
        /// Free-text query.
        query: String,
    },

    /// Answer a question grounded in the graph.
    Chat {
        /// The question. Blank or placeholder input asks for an overview.
        #[arg(default_value = "")]
        query: String,
    },

    /// List cached entities.
    Entities {
        /// Only this category (e.g. "herb" or "herbs").
        #[arg(long)]
        category: Option<EntityCategory>,
    },

    /// Show engine info and statistics.
    Info,
}

/// Resolve the configuration from the CLI flags and load the engine.
fn open_engine(cli: &Cli) -> AyurResult<(Config, Engine)> {
    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(ref data) = cli.data {
        config.data_path = data.clone();
    }
    let engine = Engine::new(&config)?;
    Ok((config, engine))
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (config, engine) = open_engine(&cli)?;

    match cli.command {
        Commands::Search { query } => {
            let result = engine.search(&query);
            let json = serde_json::to_string_pretty(&result).into_diagnostic()?;
            println!("{json}");
        }

        Commands::Graph => {
            let graph = engine.full_graph();
            let json = serde_json::to_string_pretty(&graph).into_diagnostic()?;
            println!("{json}");
        }

        Commands::Context { query } => {
            let context = engine.grounding_context(&query);
            if context.is_empty() {
                println!("No knowledge graph context for \"{query}\".");
            } else {
                println!("{context}");
            }
        }

        Commands::Chat { query } => {
            let client = GroqClient::from_env(config.llm.clone());
            let bot = Chatbot::new(&engine, client);
            let reply = bot.process_query(&query);
            let json = serde_json::to_string_pretty(&reply).into_diagnostic()?;
            println!("{json}");
        }

        Commands::Entities { category } => {
            let cache = engine.entity_cache();
            let mut shown = 0usize;
            for (c, entry) in cache.iter() {
                if category.is_some_and(|wanted| wanted != c) {
                    continue;
                }
                println!("  {} [{}] {}", entry.label, c.role(), entry.uri);
                shown += 1;
            }
            if shown == 0 {
                println!("No entities cached.");
            }
        }

        Commands::Info => {
            println!("{}", engine.info());
        }
    }

    Ok(())
}
