//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coach_agent::{ModelConfig, Provider};
use coach_core::{
    Settings, BASE_URL_ENV, CHUNK_SIZE_ENV, CONCURRENCY_ENV, DEFAULT_CHUNK_SIZE,
    DEFAULT_INPUT_FILE, DEFAULT_MODEL, DEFAULT_OUTPUT_FILE, DEFAULT_TERMINATION_TEXT,
    INPUT_PATH_ENV, MODEL_ENV, OUTPUT_PATH_ENV,
};

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    // Format: "0.1.0 (abc1234, 2026-01-29)"
    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Diary Coach - positive-thinking feedback on a diary, one agent team per batch
#[derive(Parser, Debug)]
#[command(name = "diary-coach")]
#[command(author, version = version_string(), about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for `run` when no subcommand is given
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Coach every batch of the diary and write the transcript (default)
    Run(RunArgs),

    /// Show how the diary would be split into batches, without calling a model
    Inspect(DiaryArgs),
}

/// Where the diary comes from and how it is split.
#[derive(Args, Debug, Clone)]
pub struct DiaryArgs {
    /// Diary CSV to read
    #[arg(short, long, env = INPUT_PATH_ENV, default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// Diary rows per batch
    #[arg(long, env = CHUNK_SIZE_ENV, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

/// Options for a coaching run.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub diary: DiaryArgs,

    /// Transcript CSV to write
    #[arg(short, long, env = OUTPUT_PATH_ENV, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Maximum batches in flight (default: all at once)
    #[arg(long, env = CONCURRENCY_ENV)]
    pub concurrency: Option<usize>,

    /// Model identifier
    #[arg(short, long, env = MODEL_ENV, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Model provider (gemini, openai, openrouter)
    #[arg(long, default_value = "gemini")]
    pub provider: Provider,

    /// Override the provider's chat-completions base URL
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    /// Sampling temperature (0.0 to 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Retries for rate-limited or failed model requests
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Keyword that ends a batch conversation
    #[arg(long, default_value = DEFAULT_TERMINATION_TEXT)]
    pub terminate_on: String,

    /// Stop a batch after this many agent replies
    #[arg(long)]
    pub max_turns: Option<usize>,

    /// Answer every user prompt with this text instead of reading stdin
    #[arg(long, value_name = "TEXT")]
    pub auto_reply: Option<String>,

    /// Do not echo conversations to stdout
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// The command to execute; top-level options mean `run`.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Run(self.run))
    }
}

impl RunArgs {
    /// Batch-run settings from the parsed options.
    pub fn settings(&self) -> Settings {
        Settings {
            input: self.diary.input.clone(),
            output: self.output.clone(),
            chunk_size: self.diary.chunk_size,
            concurrency: self.concurrency,
            termination_text: self.terminate_on.clone(),
            max_turns: self.max_turns,
        }
    }

    /// Model configuration from the parsed options.
    pub fn model_config(&self) -> ModelConfig {
        let mut config = ModelConfig::new(&self.model)
            .with_provider(self.provider)
            .with_retries(self.max_retries, ModelConfig::default().retry_backoff_ms);
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args_runs_with_defaults() {
        let cli = Cli::parse_from(["diary-coach"]);
        assert!(cli.command.is_none());

        match cli.into_command() {
            Commands::Run(args) => {
                assert_eq!(args.terminate_on, "terminate");
                assert_eq!(args.provider, Provider::Gemini);
                assert!(args.auto_reply.is_none());
                assert!(!args.quiet);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_top_level_run_options() {
        let cli = Cli::parse_from([
            "diary-coach",
            "-i",
            "diary.csv",
            "-o",
            "out.csv",
            "--chunk-size",
            "50",
            "--concurrency",
            "2",
            "--auto-reply",
            "terminate",
            "--quiet",
        ]);

        match cli.into_command() {
            Commands::Run(args) => {
                let settings = args.settings();
                assert_eq!(settings.input, PathBuf::from("diary.csv"));
                assert_eq!(settings.output, PathBuf::from("out.csv"));
                assert_eq!(settings.chunk_size, 50);
                assert_eq!(settings.concurrency, Some(2));
                assert_eq!(args.auto_reply.as_deref(), Some("terminate"));
                assert!(args.quiet);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_subcommand() {
        let cli = Cli::parse_from([
            "diary-coach",
            "run",
            "--provider",
            "openrouter",
            "--model",
            "google/gemini-2.0-flash-001",
            "--max-turns",
            "8",
            "--terminate-on",
            "bye",
        ]);

        match cli.into_command() {
            Commands::Run(args) => {
                let config = args.model_config();
                assert_eq!(config.provider, Provider::OpenRouter);
                assert_eq!(config.model, "google/gemini-2.0-flash-001");

                let settings = args.settings();
                assert_eq!(settings.max_turns, Some(8));
                assert_eq!(settings.termination_text, "bye");
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_inspect() {
        let cli = Cli::parse_from(["diary-coach", "inspect", "--chunk-size", "10"]);
        match cli.command {
            Some(Commands::Inspect(args)) => assert_eq!(args.chunk_size, 10),
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_provider() {
        let result = Cli::try_parse_from(["diary-coach", "--provider", "acme"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_override() {
        let cli = Cli::parse_from(["diary-coach", "--base-url", "http://127.0.0.1:9000/v1"]);
        let config = cli.run.model_config();
        assert_eq!(
            config.completions_url(),
            "http://127.0.0.1:9000/v1/chat/completions"
        );
    }

    #[test]
    fn test_cli_verbose() {
        let cli = Cli::parse_from(["diary-coach", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}
