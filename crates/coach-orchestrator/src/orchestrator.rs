//! Runs one team per batch and collects the transcript.

use coach_agent::TeamEvent;
use coach_core::Settings;
use coach_models::{Batch, BatchOutcome, TokenUsage, TranscriptEntry};
use coach_persistence::{read_batches, write_transcript};
use futures::future::join_all;
use futures::StreamExt;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::factory::TeamFactory;
use crate::prompt::build_prompt;

/// A batch whose conversation could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// First row number of the batch.
    pub batch_start: usize,
    /// Last row number of the batch (inclusive).
    pub batch_end: usize,
    /// What went wrong.
    pub error: String,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Transcript rows of every successful batch, in batch order.
    pub entries: Vec<TranscriptEntry>,
    /// Per-batch results of successful batches, in batch order.
    pub outcomes: Vec<BatchOutcome>,
    /// Batches that failed, in batch order.
    pub failures: Vec<BatchFailure>,
    /// Tokens spent across successful batches.
    pub usage: TokenUsage,
}

impl RunReport {
    /// True when no batch failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, batch: &Batch, result: Result<BatchOutcome>) {
        match result {
            Ok(outcome) => {
                self.usage += outcome.usage;
                self.entries.extend(outcome.entries.iter().cloned());
                self.outcomes.push(outcome);
            }
            Err(e) => self.failures.push(BatchFailure {
                batch_start: batch.start,
                batch_end: batch.end(),
                error: e.to_string(),
            }),
        }
    }
}

/// Console line for an event: text messages only, followed by a blank line.
fn echo_line(event: &TeamEvent) -> Option<String> {
    event.as_text().map(|_| format!("{}\n", event))
}

/// Run a fresh team on one batch.
///
/// Every text message, the task included, becomes a transcript row stamped
/// with the batch's row range. With `echo` set, each text message is also
/// printed to stdout as `[source] => content` followed by a blank line.
pub async fn process_batch(batch: &Batch, factory: &TeamFactory, echo: bool) -> Result<BatchOutcome> {
    let mut team = factory.build(batch)?;
    let task = build_prompt(batch)?;
    let mut outcome = BatchOutcome::for_batch(batch);

    let mut events = team.run_stream(task);
    while let Some(event) = events.next().await {
        let event = event?;
        if echo {
            if let Some(line) = echo_line(&event) {
                println!("{}", line);
            }
        }

        match event {
            TeamEvent::Message(message) => {
                if let Some(usage) = message.models_usage {
                    outcome.usage += usage;
                }
                let kind = message.kind();
                outcome.entries.push(TranscriptEntry::for_batch(
                    batch,
                    message.source,
                    message.content,
                    kind,
                ));
            }
            TeamEvent::Stop(stop) => outcome.stop_reason = Some(stop.content),
        }
    }

    debug!(
        rows = %batch.label(),
        messages = outcome.entries.len(),
        tokens = outcome.usage.total(),
        "Batch conversation finished"
    );
    Ok(outcome)
}

/// Runs every batch of a diary through its own team.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    factory: TeamFactory,
    concurrency: Option<usize>,
    echo: bool,
}

impl BatchOrchestrator {
    /// Create an orchestrator with unbounded concurrency and echo enabled.
    pub fn new(factory: TeamFactory) -> Self {
        Self {
            factory,
            concurrency: None,
            echo: true,
        }
    }

    /// Limit how many batches are in flight. `None` runs all at once.
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Print conversation events to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Run all batches concurrently.
    ///
    /// Results are reported in batch order whatever order the conversations
    /// finish in. A failed batch is logged and reported without affecting
    /// the others.
    pub async fn run(&self, batches: &[Batch]) -> RunReport {
        info!(
            batches = batches.len(),
            concurrency = ?self.concurrency,
            "Starting batch run"
        );

        let semaphore = self.concurrency.map(Semaphore::new);
        let runs = batches.iter().map(|batch| {
            let semaphore = semaphore.as_ref();
            async move {
                let _permit = match semaphore {
                    Some(s) => s.acquire().await.ok(),
                    None => None,
                };
                info!(batch = batch.index, rows = %batch.label(), "Processing batch");
                process_batch(batch, &self.factory, self.echo).await
            }
        });
        let results = join_all(runs).await;

        let mut report = RunReport::default();
        for (batch, result) in batches.iter().zip(results) {
            if let Err(e) = &result {
                error!(batch = batch.index, rows = %batch.label(), error = %e, "Batch failed");
            }
            report.record(batch, result);
        }

        info!(
            succeeded = report.outcomes.len(),
            failed = report.failures.len(),
            rows = report.entries.len(),
            prompt_tokens = report.usage.prompt_tokens,
            completion_tokens = report.usage.completion_tokens,
            "Batch run finished"
        );
        report
    }

    /// Read the diary, run every batch, and write the transcript.
    ///
    /// The transcript is written even when some batches failed; it then
    /// holds the rows of the successful ones.
    pub async fn run_file(&self, settings: &Settings) -> Result<RunReport> {
        settings.validate()?;
        let batches = read_batches(&settings.input, settings.chunk_size)?;
        let report = self.run(&batches).await;
        write_transcript(&settings.output, &report.entries)?;
        Ok(report)
    }
}
