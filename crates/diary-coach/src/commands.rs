//! Command handlers for CLI subcommands.

use std::sync::Arc;

use coach_agent::{
    ChatBackend, InputSource, OpenAiCompatClient, ScriptedInput, StdinInput, TerminationCondition,
};
use coach_models::Batch;
use coach_orchestrator::{BatchOrchestrator, OrchestratorError, TeamFactory};
use coach_persistence::read_batches;
use tracing::{info, warn};

use crate::cli::{Commands, DiaryArgs, RunArgs};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(cmd_run(&args))
        }
        Commands::Inspect(args) => cmd_inspect(&args),
    }
}

async fn cmd_run(args: &RunArgs) -> Result<()> {
    let settings = args.settings();
    settings.validate()?;

    // Fails on a missing API key before any batch starts.
    let client = OpenAiCompatClient::from_env(args.model_config())?;
    let backend: Arc<dyn ChatBackend> = Arc::new(client);

    let input: Arc<dyn InputSource> = match &args.auto_reply {
        Some(reply) => Arc::new(ScriptedInput::constant(reply.clone())),
        None => Arc::new(StdinInput::new()),
    };

    info!(
        input = %settings.input.display(),
        output = %settings.output.display(),
        model = %backend.model(),
        chunk_size = settings.chunk_size,
        "Starting coaching run"
    );

    let factory = TeamFactory::new(
        backend,
        input,
        TerminationCondition::text_mention(&settings.termination_text),
    )
    .with_max_turns(settings.max_turns);
    let orchestrator = BatchOrchestrator::new(factory)
        .with_concurrency(settings.concurrency)
        .with_echo(!args.quiet);

    let report = orchestrator.run_file(&settings).await?;
    println!("Transcript written to {}", settings.output.display());

    if !args.quiet {
        println!(
            "Tokens used: {} prompt, {} completion",
            report.usage.prompt_tokens, report.usage.completion_tokens
        );
    }

    if !report.is_success() {
        for failure in &report.failures {
            warn!(
                batch_start = failure.batch_start,
                batch_end = failure.batch_end,
                error = %failure.error,
                "Batch missing from transcript"
            );
            eprintln!(
                "Batch {}-{} failed: {}",
                failure.batch_start, failure.batch_end, failure.error
            );
        }
        return Err(OrchestratorError::BatchesFailed {
            failed: report.failures.len(),
            total: report.failures.len() + report.outcomes.len(),
        }
        .into());
    }

    Ok(())
}

fn cmd_inspect(args: &DiaryArgs) -> Result<()> {
    let batches = read_batches(&args.input, args.chunk_size)?;
    for line in plan_lines(&batches) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per batch, then a summary line.
fn plan_lines(batches: &[Batch]) -> Vec<String> {
    let total = batches.first().map_or(0, |b| b.total_records);
    let mut lines: Vec<String> = batches
        .iter()
        .map(|batch| format!("batch {}: rows {}", batch.index, batch.label()))
        .collect();
    lines.push(format!("{} records in {} batches", total, batches.len()));
    lines
}
