use clap::{Parser, Subcommand};
use promptgraph::api::{NodeStore, WorkflowContext, WorkflowRunner};
use promptgraph::api::http::{HttpNodeStore, HttpWorkflowRunner};
use promptgraph::api::memory::{EchoRunner, InMemoryNodeStore};
use promptgraph::config::{EditorConfig, load_config};
use promptgraph::graph::NodeKind;
use promptgraph::graph::edit::{self, NewNode};
use promptgraph::graph::records::from_records;
use promptgraph::layout::{self, jitter::RandomJitter};
use promptgraph::loader::{load_elements, load_records, save_elements};
use promptgraph::prompt;
use promptgraph::session::EditorSession;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Editor config (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overrides the config file
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out an element list top to bottom
    Layout {
        #[arg(long, short)]
        file: PathBuf,

        /// Where to write the result (defaults to stdout)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Print the prompt list in execution order
    Prompts {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Build an element list from persisted node rows
    Import {
        #[arg(long, short)]
        records: PathBuf,

        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Insert a node after a parent
    Insert {
        #[arg(long, short)]
        file: PathBuf,

        #[arg(long)]
        parent: String,

        /// source | action | placeholder
        #[arg(long, default_value = "action", value_parser = parse_kind)]
        kind: NodeKind,

        #[arg(long, default_value_t = 0)]
        company: i64,

        #[arg(long, default_value_t = 0)]
        workflow: i64,

        #[arg(long, default_value_t = 0)]
        user: i64,

        /// Use the in-memory node store instead of the API
        #[arg(long)]
        offline: bool,

        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Delete a node and relink its neighbours
    Delete {
        #[arg(long, short)]
        file: PathBuf,

        #[arg(long)]
        node: String,

        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Submit the workflow for execution
    Run {
        #[arg(long, short)]
        file: PathBuf,

        /// Input for the root prompt (defaults to the root node's input)
        #[arg(long, short)]
        input: Option<String>,

        /// Echo the chain locally instead of calling the API
        #[arg(long)]
        offline: bool,
    },
}

fn parse_kind(s: &str) -> Result<NodeKind, String> {
    match s {
        "source" => Ok(NodeKind::Source),
        "action" => Ok(NodeKind::Action),
        "placeholder" => Ok(NodeKind::Placeholder),
        other => Err(format!("unknown node kind `{}`", other)),
    }
}

fn emit(out: Option<PathBuf>, elements: &promptgraph::graph::Elements) -> Result<()> {
    match out {
        Some(path) => {
            save_elements(&path, elements)?;
            info!("Written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(elements)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EditorConfig::default(),
    };
    if let Some(api) = cli.api {
        config.api_base_url = api;
    }

    match cli.command {
        Commands::Layout { file, out } => {
            let elements = load_elements(&file)?;
            let mut jitter = RandomJitter::new(config.max_jitter);
            let outcome = layout::layout(&elements, &config, &mut jitter);
            for err in &outcome.skipped {
                warn!("{}", err);
            }
            emit(out, &outcome.elements)?;
        }

        Commands::Prompts { file } => {
            let elements = load_elements(&file)?;
            let records = prompt::project(&elements);
            let ordered = prompt::ordered(&records)?;
            println!("{}", serde_json::to_string_pretty(&ordered)?);
        }

        Commands::Import { records, out } => {
            let rows = load_records(&records)?;
            let elements = from_records(&rows);
            let mut jitter = RandomJitter::new(config.max_jitter);
            let outcome = layout::layout(&elements, &config, &mut jitter);
            emit(out, &outcome.elements)?;
        }

        Commands::Insert { file, parent, kind, company, workflow, user, offline, out } => {
            let elements = load_elements(&file)?;
            let store: Arc<dyn NodeStore> = if offline {
                Arc::new(InMemoryNodeStore::new())
            } else {
                Arc::new(HttpNodeStore::new(&config.api_base_url))
            };
            let ctx = WorkflowContext { company_id: company, workflow_id: workflow, user_id: user };
            let session = EditorSession::new(ctx, config, store).with_elements(elements);

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let updated = session.insert_after(NewNode::new(&parent, kind), &cancel).await?;
            emit(out, &updated)?;
        }

        Commands::Delete { file, node, out } => {
            let elements = load_elements(&file)?;
            let updated = edit::delete_node(&elements, &node)?;
            let mut jitter = RandomJitter::new(config.max_jitter);
            let outcome = layout::layout(&updated, &config, &mut jitter);
            emit(out, &outcome.elements)?;
        }

        Commands::Run { file, input, offline } => {
            let elements = load_elements(&file)?;
            let request = prompt::prepare_run(&elements, input.as_deref())?;
            let runner: Box<dyn WorkflowRunner> = if offline {
                Box::new(EchoRunner)
            } else {
                Box::new(HttpWorkflowRunner::new(&config.api_base_url))
            };
            let response = runner.run(request).await?;
            println!("{}", response.output);
        }
    }

    Ok(())
}
