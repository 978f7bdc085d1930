//! Coach Core - shared configuration for all Diary Coach crates.
//!
//! - **config**: Environment variable names, defaults, `.env` loading and
//!   run [`Settings`] validation

pub mod config;

pub use config::{
    load_env_files, load_env_files_from, ConfigError, Result, Settings,
    BASE_URL_ENV, CHUNK_SIZE_ENV, CONCURRENCY_ENV, DEFAULT_CHUNK_SIZE, DEFAULT_INPUT_FILE,
    DEFAULT_MODEL, DEFAULT_OUTPUT_FILE, DEFAULT_TERMINATION_TEXT, INPUT_PATH_ENV, MODEL_ENV,
    OUTPUT_PATH_ENV,
};
