use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use conductor::channel::{completion_channel, DispatchChannel, InMemoryDispatchChannel};
use conductor::config::Config;
use conductor::core::{ExecutionMode, Workflow, WorkflowId, WorkflowSpec, WorkflowStatus};
use conductor::executor::SimulatedExecutor;
use conductor::orchestration::Engine;
use conductor::store::{InMemoryTaskStore, TaskStore};
use conductor::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Conductor - workflow orchestration engine
#[derive(Parser, Debug)]
#[command(name = "conductor")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Override the log filter (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Workflow commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a workflow from a spec file (TOML, or JSON with .json)
    Run {
        /// Path to the workflow spec file
        file: PathBuf,

        /// Print the result as JSON instead of a summary table
        #[arg(long)]
        json: bool,

        /// Force tasks of this type to fail (repeatable)
        #[arg(long)]
        fail: Vec<String>,
    },

    /// Run a built-in demo workflow
    Example {
        /// Use a parallel workflow instead of a sequential one
        #[arg(long)]
        parallel: bool,

        /// Print the result as JSON instead of a summary table
        #[arg(long)]
        json: bool,

        /// Force tasks of this type to fail (repeatable)
        #[arg(long)]
        fail: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Command::Run { file, json, fail } => {
            let spec = load_spec(&file)?;
            run_workflow(spec, json, fail)
        }
        Command::Example {
            parallel,
            json,
            fail,
        } => run_workflow(example_spec(parallel), json, fail),
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the debug flag picks the level.
fn init_tracing(debug: bool) {
    let default = if debug { "conductor=debug" } else { "conductor=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Load a workflow spec from a file, picking the format by extension.
fn load_spec(path: &Path) -> Result<WorkflowSpec> {
    let raw = fs::read_to_string(path)?;
    let spec = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&raw)?,
        _ => toml::from_str(&raw)?,
    };
    Ok(spec)
}

/// The built-in demo workflow.
fn example_spec(parallel: bool) -> WorkflowSpec {
    if parallel {
        WorkflowSpec::new("demo-fanout", ExecutionMode::Parallel)
            .with_task("resize")
            .with_task("watermark")
            .with_task("thumbnail")
    } else {
        WorkflowSpec::new("demo-pipeline", ExecutionMode::Sequential)
            .with_task("extract")
            .with_task("transform")
            .with_task("load")
    }
}

/// Run one workflow to settlement and print the result.
///
/// Wires up the engine, a simulated executor, and the channels between
/// them, submits the workflow, then polls until no further progress is
/// possible.
fn run_workflow(spec: WorkflowSpec, json: bool, fail: Vec<String>) -> Result<()> {
    let config = Config::load()?;
    let rt = tokio::runtime::Runtime::new()?;

    let workflow = rt.block_on(async {
        let store = Arc::new(InMemoryTaskStore::new());
        let (channel, deliveries) =
            InMemoryDispatchChannel::with_delivery(&config.dispatch_queue, config.channel_capacity);
        let channel = Arc::new(channel);
        let (completion_tx, completion_rx) = completion_channel(config.channel_capacity);

        let engine = Arc::new(Engine::new(
            Arc::clone(&store) as Arc<dyn TaskStore>,
            Arc::clone(&channel) as Arc<dyn DispatchChannel>,
            config.max_version_retries,
        ));

        let mut executor = SimulatedExecutor::new(completion_tx, config.work_duration());
        for task_type in &fail {
            executor = executor.fail_task_type(task_type);
        }
        let worker = tokio::spawn(executor.run(deliveries));
        let consumer = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.run(completion_rx).await })
        };

        let accepted = engine.submit(spec).await?;
        let settled = wait_for_settlement(&engine, &accepted.id).await;

        worker.abort();
        consumer.abort();
        settled
    })?;

    if json {
        print_json(&workflow)?;
    } else {
        print_summary(&workflow);
    }

    Ok(())
}

/// Poll a workflow until it settles or the timeout passes.
async fn wait_for_settlement(engine: &Engine, id: &WorkflowId) -> Result<Workflow> {
    let deadline = tokio::time::Instant::now() + SETTLE_TIMEOUT;
    loop {
        let workflow = engine.workflow(id).await?;
        if workflow.is_settled() {
            return Ok(workflow);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(Error::Validation(format!(
                "workflow {} did not settle within {:?}",
                id.short(),
                SETTLE_TIMEOUT
            )));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn print_json(workflow: &Workflow) -> Result<()> {
    let tasks: Vec<_> = workflow
        .tasks
        .iter()
        .map(|task| {
            serde_json::json!({
                "id": task.id.to_string(),
                "type": task.task_type,
                "status": task.status.to_string(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "workflow_id": workflow.id.to_string(),
        "name": workflow.name,
        "mode": workflow.mode.to_string(),
        "status": workflow.status().to_string(),
        "tasks": tasks,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_summary(workflow: &Workflow) {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║                    Workflow Result                         ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
    println!("  ID:      {}", workflow.id.short());
    println!("  Name:    {}", workflow.name);
    println!("  Mode:    {}", workflow.mode);
    println!("  Status:  {}", format_status(workflow.status()));
    println!();

    if !workflow.tasks.is_empty() {
        println!("  Tasks:");
        for (index, task) in workflow.tasks.iter().enumerate() {
            println!(
                "    {}. {:<16} {}",
                index + 1,
                task.task_type,
                format_task_status(&task.status.to_string())
            );
        }
        println!();
    }
}

/// Format workflow status with color codes for terminal.
fn format_status(status: WorkflowStatus) -> String {
    match status {
        WorkflowStatus::Completed => format!("\x1b[32m{}\x1b[0m", status), // Green
        WorkflowStatus::Failed => format!("\x1b[31m{}\x1b[0m", status),    // Red
        WorkflowStatus::Running => format!("\x1b[33m{}\x1b[0m", status),   // Yellow
        WorkflowStatus::Pending => format!("\x1b[90m{}\x1b[0m", status),   // Gray
    }
}

/// Format a task status string with color codes for terminal.
fn format_task_status(status: &str) -> String {
    match status {
        "completed" => format!("\x1b[32m{}\x1b[0m", status),
        "failed" => format!("\x1b[31m{}\x1b[0m", status),
        "in_progress" => format!("\x1b[33m{}\x1b[0m", status),
        _ => format!("\x1b[90m{}\x1b[0m", status),
    }
}
