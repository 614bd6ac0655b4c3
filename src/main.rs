//! knowgen CLI: browse a knowledge graph and grow it from completions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use knowgen::config::{AppPaths, KnowgenConfig};
use knowgen::error::{GraphError, KnowgenError};
use knowgen::export::{export_predicate_generations, export_triple_generations};
use knowgen::graph::traverse::{OutlineConfig, write_subtopic_tree};
use knowgen::llm::{CompletionGateway, OpenAiClient, OpenAiConfig, ScriptedCompletion};
use knowgen::navigator::terminal::StdTerminal;
use knowgen::navigator::{NavigationContext, Navigator};
use knowgen::store::KnowledgeStore;

#[derive(Parser)]
#[command(
    name = "knowgen",
    version,
    about = "Interactive knowledge-graph navigator backed by language-model completions"
)]
struct Cli {
    /// Data directory for the database.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/knowgen/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the graph and generate new triples (the default).
    Navigate {
        /// Concept to start on.
        #[arg(long)]
        concept: Option<String>,

        /// Seed sent with every completion request.
        #[arg(long)]
        seed: Option<u64>,

        /// Model to request completions from.
        #[arg(long)]
        model: Option<String>,

        /// Do not contact the completion service.
        #[arg(long)]
        offline: bool,

        /// Replay completions from a JSON array of reply strings (implies --offline).
        #[arg(long)]
        replies: Option<PathBuf>,
    },

    /// Write the subtopic outline of a concept to a text file.
    Tree {
        /// Concept to start the outline from.
        #[arg(long)]
        root: Option<String>,

        /// Predicate to follow.
        #[arg(long)]
        predicate: Option<String>,

        /// Output file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export a generation ledger as JSON.
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },

    /// Show row counts for every table.
    Info,
}

#[derive(Subcommand)]
enum LedgerAction {
    /// Triple generation episodes with their triples.
    Triples,
    /// Predicate pair registrations.
    Predicates,
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
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = AppPaths::resolve().map_err(KnowgenError::from)?;
    let config_file = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let config = KnowgenConfig::load(&config_file).map_err(KnowgenError::from)?;
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir_or(&paths));

    let store = KnowledgeStore::open(&data_dir).map_err(KnowgenError::from)?;

    let command = cli.command.unwrap_or(Commands::Navigate {
        concept: None,
        seed: None,
        model: None,
        offline: false,
        replies: None,
    });

    match command {
        Commands::Navigate {
            concept,
            seed,
            model,
            offline,
            replies,
        } => {
            let mut settings = config.session_settings();
            if let Some(concept) = concept {
                settings.start_concept = concept;
            }
            if let Some(seed) = seed {
                settings.seed = seed;
            }

            let mut gateway: Box<dyn CompletionGateway> = match replies {
                Some(file) => {
                    let text = std::fs::read_to_string(&file).into_diagnostic()?;
                    let replies: Vec<String> = serde_json::from_str(&text).into_diagnostic()?;
                    Box::new(ScriptedCompletion::new(replies))
                }
                None if offline => Box::new(ScriptedCompletion::default().with_model("offline")),
                None => {
                    let mut llm = OpenAiConfig::from(&config.llm);
                    if let Some(model) = model {
                        llm.model = model;
                    }
                    Box::new(OpenAiClient::new(llm))
                }
            };

            let mut terminal = StdTerminal::new();
            let ctx = NavigationContext::new(&store, gateway.as_mut(), &mut terminal, &settings);
            Navigator::new(ctx).run().map_err(KnowgenError::from)?;
        }

        Commands::Tree {
            root,
            predicate,
            output,
        } => {
            let outline = OutlineConfig {
                root: root.unwrap_or(config.export.root),
                predicate: predicate.unwrap_or(config.export.predicate),
                ..Default::default()
            };
            let output = output.unwrap_or(config.export.output);
            let file = std::fs::File::create(&output)
                .map_err(|e| KnowgenError::from(GraphError::Output { source: e }))?;
            let mut writer = std::io::BufWriter::new(file);
            let lines = write_subtopic_tree(&store, &outline, &mut writer).map_err(KnowgenError::from)?;
            println!("Wrote {lines} lines to {}", output.display());
        }

        Commands::Ledger { action } => {
            let json = match action {
                LedgerAction::Triples => {
                    let exports = export_triple_generations(&store).map_err(KnowgenError::from)?;
                    serde_json::to_string_pretty(&exports).into_diagnostic()?
                }
                LedgerAction::Predicates => {
                    let exports = export_predicate_generations(&store).map_err(KnowgenError::from)?;
                    serde_json::to_string_pretty(&exports).into_diagnostic()?
                }
            };
            println!("{json}");
        }

        Commands::Info => {
            let stats = store.stats().map_err(KnowgenError::from)?;
            println!("data dir: {}", data_dir.display());
            print!("{stats}");
        }
    }

    Ok(())
}
