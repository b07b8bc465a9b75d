mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use flowforge_editor::{EditorCommand, WorkflowEditor};
use flowforge_graph::Graph;
use flowforge_io::{
  DEFAULT_FILE_PREFIX, WorkflowDocument, read_document, write_document, write_document_to,
};
use flowforge_layout::Direction;
use flowforge_simulation::{AutomationCatalog, HttpService, SimulationOutcome, Simulator};
use flowforge_template::{builtin_templates, find_template};
use flowforge_validation::ValidationReport;

use crate::config::{AppConfig, default_data_dir};

/// Flowforge - build, check, lay out and simulate approval workflows
#[derive(Parser)]
#[command(name = "flowforge")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.flowforge)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Base URL of the simulation service (overrides the config file)
  #[arg(long, global = true)]
  service_url: Option<String>,

  /// Log filter, e.g. `debug` or `flowforge_simulation=trace` (overrides RUST_LOG)
  #[arg(long, global = true)]
  log_level: Option<String>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a workflow file
  Validate {
    file: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
  },

  /// Auto-layout a workflow file
  Layout {
    file: PathBuf,

    /// Direction of the layout: TB, BT, LR or RL
    #[arg(long)]
    direction: Option<Direction>,

    /// Where to write the result (default: stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,
  },

  /// Apply a JSON list of editor commands to a workflow file
  Apply {
    file: PathBuf,

    /// Path to the commands file
    #[arg(long)]
    commands: PathBuf,

    /// Where to write the result (default: stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,
  },

  /// Run a workflow against the simulation service
  Simulate { file: PathBuf },

  /// Work with the built-in templates
  Template {
    #[command(subcommand)]
    action: TemplateAction,
  },

  /// List the actions offered by the automation service
  Automations,
}

#[derive(Subcommand)]
enum TemplateAction {
  /// List the built-in templates
  List,

  /// Create a new workflow file from a template
  New {
    /// Template id, e.g. `basic-approval`
    id: String,

    /// Directory to write the workflow into
    #[arg(long, default_value = ".")]
    dir: PathBuf,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.log_level.as_deref())?;

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => default_data_dir()?,
  };

  let Some(command) = cli.command else {
    println!("flowforge - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let mut config = AppConfig::load(&data_dir).await?;
    if let Some(url) = cli.service_url {
      config.service_url = url;
    }
    run(command, config).await
  })
}

fn init_tracing(level: Option<&str>) -> Result<()> {
  let filter = match level {
    Some(level) => EnvFilter::try_new(level),
    None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")),
  }
  .context("invalid log filter")?;

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
    .with(filter)
    .try_init()
    .context("failed to initialize tracing")?;
  Ok(())
}

async fn run(command: Commands, config: AppConfig) -> Result<()> {
  match command {
    Commands::Validate { file, json } => validate(&file, json).await,
    Commands::Layout {
      file,
      direction,
      output,
    } => layout(&file, direction, output.as_deref(), &config).await,
    Commands::Apply {
      file,
      commands,
      output,
    } => apply(&file, &commands, output.as_deref(), &config).await,
    Commands::Simulate { file } => simulate(&file, &config).await,
    Commands::Template { action } => match action {
      TemplateAction::List => {
        list_templates();
        Ok(())
      }
      TemplateAction::New { id, dir } => new_from_template(&id, &dir).await,
    },
    Commands::Automations => automations(&config).await,
  }
}

async fn load_graph(file: &Path) -> Result<Graph> {
  let document = read_document(file)
    .await
    .with_context(|| format!("failed to load workflow file: {}", file.display()))?;
  document
    .into_graph()
    .with_context(|| format!("inconsistent workflow file: {}", file.display()))
}

async fn emit(document: &WorkflowDocument, output: Option<&Path>) -> Result<()> {
  match output {
    Some(path) => {
      write_document_to(path, document)
        .await
        .with_context(|| format!("failed to write workflow file: {}", path.display()))?;
      eprintln!("Wrote {}", path.display());
    }
    None => println!("{}", document.to_json()?),
  }
  Ok(())
}

async fn validate(file: &Path, json: bool) -> Result<()> {
  let graph = load_graph(file).await?;
  let report = flowforge_validation::validate(&graph);

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_report(&graph, &report);
  }

  if !report.is_valid() {
    bail!("workflow is not valid");
  }
  Ok(())
}

fn print_report(graph: &Graph, report: &ValidationReport) {
  for issue in &report.issues {
    println!("error: {}", issue);
  }
  for node in graph.nodes() {
    if let Some(result) = report.node(&node.id) {
      let title = node.data.title().unwrap_or_default();
      println!(
        "{}: {} [{} \"{}\"]: {}",
        result.severity,
        node.id,
        node.kind(),
        title,
        result.message
      );
    }
  }
  if report.is_valid() {
    println!("ok: {} nodes, {} edges", graph.nodes().len(), graph.edges().len());
  }
}

async fn layout(
  file: &Path,
  direction: Option<Direction>,
  output: Option<&Path>,
  config: &AppConfig,
) -> Result<()> {
  let graph = load_graph(file).await?;
  let mut editor = WorkflowEditor::with_graph(graph, config.editor());
  editor.auto_layout(direction);
  emit(&editor.export(chrono::Utc::now()), output).await
}

async fn apply(
  file: &Path,
  commands_file: &Path,
  output: Option<&Path>,
  config: &AppConfig,
) -> Result<()> {
  let graph = load_graph(file).await?;
  let raw = tokio::fs::read_to_string(commands_file)
    .await
    .with_context(|| format!("failed to read commands file: {}", commands_file.display()))?;
  let commands: Vec<EditorCommand> = serde_json::from_str(&raw)
    .with_context(|| format!("failed to parse commands file: {}", commands_file.display()))?;

  let mut editor = WorkflowEditor::with_graph(graph, config.editor());
  let outcomes = editor
    .apply_all(commands)
    .context("failed to apply commands")?;
  let changed = outcomes.iter().filter(|o| o.changed).count();
  info!(commands = outcomes.len(), changed, "applied commands");

  emit(&editor.export(chrono::Utc::now()), output).await
}

async fn simulate(file: &Path, config: &AppConfig) -> Result<()> {
  let graph = load_graph(file).await?;
  let service = HttpService::new(&config.service()).context("failed to create service client")?;
  let simulator = Simulator::new(service);

  match simulator.run(&graph).await {
    SimulationOutcome::Rejected(issues) => {
      for issue in &issues {
        println!("error: {}", issue);
      }
      bail!("workflow failed pre-flight checks");
    }
    SimulationOutcome::AlreadyRunning => bail!("a simulation is already running"),
    outcome @ SimulationOutcome::Completed(_) => {
      for entry in outcome.log() {
        println!("{}", entry);
      }
      if !outcome.succeeded() {
        bail!("simulation reported failures");
      }
      Ok(())
    }
  }
}

fn list_templates() {
  for template in builtin_templates() {
    println!(
      "{:<20} {:<24} {} ({} nodes)",
      template.id,
      template.name,
      template.description,
      template.nodes.len()
    );
  }
}

async fn new_from_template(id: &str, dir: &Path) -> Result<()> {
  let template = find_template(id).with_context(|| format!("unknown template: {}", id))?;
  let (nodes, edges) = template
    .instantiate()
    .with_context(|| format!("failed to instantiate template: {}", id))?
    .into_parts();
  let graph = Graph::from_parts(nodes, edges)?;

  let document = WorkflowDocument::export_now(&graph);
  let path = write_document(dir, DEFAULT_FILE_PREFIX, &document)
    .await
    .with_context(|| format!("failed to write workflow into {}", dir.display()))?;
  println!("{}", path.display());
  Ok(())
}

async fn automations(config: &AppConfig) -> Result<()> {
  let service = HttpService::new(&config.service()).context("failed to create service client")?;
  let catalog = AutomationCatalog::new(Arc::new(service));

  let actions = catalog
    .actions()
    .await
    .context("failed to fetch automations")?;
  for action in actions.iter() {
    println!("{:<16} {:<24} {}", action.id, action.label, action.params.join(", "));
  }
  Ok(())
}
